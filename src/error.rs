use std::fmt;

use serde::Serialize;
use serde_json::Value as JsonValue;

/// Failure categories used for retry and presentation decisions.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorKind {
    /// The host refused the connection or could not be resolved.
    ConnectionFailed,
    /// The attempt exceeded its timeout.
    Timeout,
    /// The connection broke mid-flight.
    NetworkError,
    Unauthorized,
    Forbidden,
    NotFound,
    /// The API rejected the request payload (HTTP 422).
    ValidationError,
    ActivationFailed,
    WebhookError,
    /// HTTP 500, 502 or 503.
    ServerError,
    /// Any other non-success status, or an undecodable success body.
    ApiError,
    Unknown,
}

impl ErrorKind {
    /// Stable machine-readable code, matching the serialized form.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::ConnectionFailed => "CONNECTION_FAILED",
            Self::Timeout => "TIMEOUT",
            Self::NetworkError => "NETWORK_ERROR",
            Self::Unauthorized => "UNAUTHORIZED",
            Self::Forbidden => "FORBIDDEN",
            Self::NotFound => "NOT_FOUND",
            Self::ValidationError => "VALIDATION_ERROR",
            Self::ActivationFailed => "ACTIVATION_FAILED",
            Self::WebhookError => "WEBHOOK_ERROR",
            Self::ServerError => "SERVER_ERROR",
            Self::ApiError => "API_ERROR",
            Self::Unknown => "UNKNOWN",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error type returned by this crate.
///
/// Every failure below the retry loop is normalized into this shape before a
/// retry decision is made, so callers only ever branch on [`ErrorKind`].
#[derive(Clone, Debug, PartialEq, Serialize, thiserror::Error)]
#[error("{kind}: {message}")]
pub struct N8nError {
    pub kind: ErrorKind,
    pub message: String,
    /// HTTP status code, when the failure came from a response.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
    /// Suggested remediation for the caller.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
    /// Opaque payload, e.g. the decoded body of a validation failure.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<JsonValue>,
}

impl N8nError {
    /// Creates an error with only a kind and a message.
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            status: None,
            hint: None,
            details: None,
        }
    }

    /// Attaches the HTTP status code.
    pub fn with_status(mut self, status: u16) -> Self {
        self.status = Some(status);
        self
    }

    /// Attaches a remediation hint.
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }

    /// Attaches an opaque detail payload.
    pub fn with_details(mut self, details: JsonValue) -> Self {
        self.details = Some(details);
        self
    }

    /// Re-labels a terminal error while keeping its message, status and details.
    pub(crate) fn rekind(mut self, kind: ErrorKind, hint: impl Into<String>) -> Self {
        self.kind = kind;
        self.hint = Some(hint.into());
        self
    }

    /// Renders the error as the JSON object handed to agent transports.
    pub fn to_json(&self) -> JsonValue {
        serde_json::to_value(self).unwrap_or_else(|_| {
            serde_json::json!({ "kind": self.kind.as_str(), "message": self.message })
        })
    }
}

/// Error returned when a client cannot be constructed.
#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("base URL must not be empty")]
    MissingBaseUrl,
    #[error("API key must not be empty")]
    MissingApiKey,
    #[error("API key contains characters not allowed in an HTTP header")]
    InvalidApiKey,
    /// A required environment variable is absent or blank.
    #[error("missing {0} environment variable")]
    MissingEnv(&'static str),
    #[error("invalid value for {name}: {value}")]
    InvalidEnv { name: &'static str, value: String },
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::{ErrorKind, N8nError};

    #[test]
    fn display_includes_kind_code() {
        let err = N8nError::new(ErrorKind::NotFound, "Workflow not found");
        assert_eq!(err.to_string(), "NOT_FOUND: Workflow not found");
    }

    #[test]
    fn to_json_omits_absent_fields() {
        let err = N8nError::new(ErrorKind::Timeout, "request timed out");
        assert_eq!(
            err.to_json(),
            json!({ "kind": "TIMEOUT", "message": "request timed out" })
        );
    }

    #[test]
    fn to_json_carries_status_hint_and_details() {
        let err = N8nError::new(ErrorKind::ValidationError, "bad")
            .with_status(422)
            .with_hint("fix it")
            .with_details(json!({ "field": "name" }));
        let value = err.to_json();
        assert_eq!(value["status"], 422);
        assert_eq!(value["hint"], "fix it");
        assert_eq!(value["details"]["field"], "name");
    }
}
