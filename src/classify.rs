//! Maps failure signals to [`N8nError`] values.
//!
//! Classification is pure: the same status and body always produce the same
//! kind, message and hint.

use std::error::Error as StdError;

use serde_json::{Map, Value as JsonValue};

use crate::{ErrorKind, N8nError};

const HINT_UNAUTHORIZED: &str = "check API key: it must be valid and sent as X-N8N-API-KEY";
const HINT_FORBIDDEN: &str = "insufficient permission: the API key lacks access to this resource";
const HINT_SERVER: &str = "server encountered an error; retry later or check the n8n logs";
const HINT_CONNECTION: &str = "check that the n8n instance is running and the base URL is correct";
const HINT_TIMEOUT: &str = "the n8n instance did not answer within the configured timeout";

const CONNECTION_MARKERS: &[&str] = &[
    "econnrefused",
    "connection refused",
    "enotfound",
    "dns error",
    "failed to lookup address",
    "name or service not known",
    "no such host",
    "getaddrinfo",
];
const TIMEOUT_MARKERS: &[&str] = &["etimedout", "timed out", "timeout"];
const NETWORK_MARKERS: &[&str] = &[
    "econnreset",
    "connection reset",
    "broken pipe",
    "socket hang up",
    "connection closed",
];

/// A failure observed while performing one attempt.
#[derive(Debug)]
pub enum Failure {
    /// The server answered with a non-success status.
    Status { status: u16, body: JsonValue },
    /// No response was received.
    Transport(reqwest::Error),
    /// A transport fault known only by its description.
    Fault(String),
    /// Already classified; passes through unchanged.
    Classified(N8nError),
}

/// Normalizes any failure signal into a structured error.
pub fn classify(failure: Failure) -> N8nError {
    match failure {
        Failure::Status { status, body } => classify_status(status, &body),
        Failure::Transport(err) => classify_transport(&err),
        Failure::Fault(description) => classify_fault(&description),
        Failure::Classified(err) => err,
    }
}

/// Classifies a non-success HTTP response.
pub fn classify_status(status: u16, body: &JsonValue) -> N8nError {
    let message = body_field(body, "message");
    let hint = body_field(body, "hint");

    match status {
        401 => N8nError::new(
            ErrorKind::Unauthorized,
            message.unwrap_or("authentication failed"),
        )
        .with_status(status)
        .with_hint(hint.unwrap_or(HINT_UNAUTHORIZED)),
        403 => N8nError::new(ErrorKind::Forbidden, message.unwrap_or("access forbidden"))
            .with_status(status)
            .with_hint(hint.unwrap_or(HINT_FORBIDDEN)),
        404 => N8nError::new(ErrorKind::NotFound, message.unwrap_or("resource not found"))
            .with_status(status),
        422 => N8nError::new(
            ErrorKind::ValidationError,
            message.unwrap_or("request validation failed"),
        )
        .with_status(status)
        .with_details(body.clone()),
        500 | 502 | 503 => {
            let message = match message {
                Some(message) => message.to_owned(),
                None => format!("server error (HTTP {status})"),
            };
            N8nError::new(ErrorKind::ServerError, message)
                .with_status(status)
                .with_hint(HINT_SERVER)
        }
        _ => {
            let message = match message {
                Some(message) => message.to_owned(),
                None => format!("HTTP Error {status}"),
            };
            let err = N8nError::new(ErrorKind::ApiError, message).with_status(status);
            match hint {
                Some(hint) => err.with_hint(hint),
                None => err,
            }
        }
    }
}

/// Classifies a `reqwest` error that carries no HTTP response.
///
/// The typed `is_timeout`/`is_connect` flags win; otherwise the full source
/// chain is inspected like any other fault description.
pub fn classify_transport(err: &reqwest::Error) -> N8nError {
    let description = describe_chain(err);
    if err.is_timeout() {
        return N8nError::new(ErrorKind::Timeout, format!("request timed out: {description}"))
            .with_hint(HINT_TIMEOUT);
    }
    if err.is_connect() {
        let classified = classify_fault(&description);
        if classified.kind == ErrorKind::Timeout {
            return classified;
        }
        return N8nError::new(
            ErrorKind::ConnectionFailed,
            format!("cannot connect to n8n: {description}"),
        )
        .with_hint(HINT_CONNECTION);
    }
    classify_fault(&description)
}

/// Classifies a transport fault by its description.
pub fn classify_fault(description: &str) -> N8nError {
    let lowered = description.to_ascii_lowercase();
    let contains_any = |markers: &[&str]| markers.iter().any(|marker| lowered.contains(marker));

    if contains_any(CONNECTION_MARKERS) {
        N8nError::new(
            ErrorKind::ConnectionFailed,
            format!("cannot connect to n8n: {description}"),
        )
        .with_hint(HINT_CONNECTION)
    } else if contains_any(TIMEOUT_MARKERS) {
        N8nError::new(ErrorKind::Timeout, format!("request timed out: {description}"))
            .with_hint(HINT_TIMEOUT)
    } else if contains_any(NETWORK_MARKERS) {
        N8nError::new(ErrorKind::NetworkError, format!("network error: {description}"))
    } else {
        N8nError::new(ErrorKind::Unknown, description)
    }
}

/// Best-effort decode of an error response body.
///
/// Empty or non-JSON bodies become an empty object so that a parse failure
/// never replaces the status-derived classification.
pub fn parse_error_body(text: &str) -> JsonValue {
    if text.trim().is_empty() {
        return JsonValue::Object(Map::new());
    }
    serde_json::from_str(text).unwrap_or_else(|_| JsonValue::Object(Map::new()))
}

fn body_field<'a>(body: &'a JsonValue, key: &str) -> Option<&'a str> {
    body.get(key)
        .and_then(JsonValue::as_str)
        .filter(|value| !value.trim().is_empty())
}

fn describe_chain(err: &(dyn StdError + 'static)) -> String {
    let mut text = err.to_string();
    let mut source = err.source();
    while let Some(inner) = source {
        let part = inner.to_string();
        if !text.contains(&part) {
            text.push_str(": ");
            text.push_str(&part);
        }
        source = inner.source();
    }
    text
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::{classify, classify_fault, classify_status, parse_error_body, Failure};
    use crate::{ErrorKind, N8nError};

    #[test]
    fn not_found_uses_body_message() {
        let err = classify_status(404, &json!({ "message": "Workflow not found" }));
        assert_eq!(err.kind, ErrorKind::NotFound);
        assert_eq!(err.message, "Workflow not found");
        assert_eq!(err.status, Some(404));
    }

    #[test]
    fn not_found_falls_back_to_generic_message() {
        let err = classify_status(404, &json!({}));
        assert_eq!(err.message, "resource not found");
        assert!(err.hint.is_none());
    }

    #[test]
    fn unauthorized_prefers_body_hint() {
        let err = classify_status(401, &json!({ "message": "nope", "hint": "rotate key" }));
        assert_eq!(err.kind, ErrorKind::Unauthorized);
        assert_eq!(err.hint.as_deref(), Some("rotate key"));

        let fallback = classify_status(401, &json!({}));
        assert!(fallback.hint.unwrap_or_default().starts_with("check API key"));
    }

    #[test]
    fn forbidden_default_hint() {
        let err = classify_status(403, &json!({ "message": "Forbidden" }));
        assert_eq!(err.kind, ErrorKind::Forbidden);
        assert!(err
            .hint
            .unwrap_or_default()
            .starts_with("insufficient permission"));
    }

    #[test]
    fn validation_attaches_full_body() {
        let body = json!({ "message": "name is required", "issues": [{ "path": "name" }] });
        let err = classify_status(422, &body);
        assert_eq!(err.kind, ErrorKind::ValidationError);
        assert_eq!(err.details, Some(body));
    }

    #[test]
    fn server_errors_share_fixed_hint() {
        for status in [500, 502, 503] {
            let err = classify_status(status, &json!({}));
            assert_eq!(err.kind, ErrorKind::ServerError);
            assert_eq!(err.message, format!("server error (HTTP {status})"));
            assert!(err
                .hint
                .unwrap_or_default()
                .starts_with("server encountered an error"));
        }
    }

    #[test]
    fn other_status_is_api_error() {
        let err = classify_status(400, &json!({}));
        assert_eq!(err.kind, ErrorKind::ApiError);
        assert_eq!(err.message, "HTTP Error 400");

        let err = classify_status(409, &json!({ "message": "conflict" }));
        assert_eq!(err.message, "conflict");
    }

    #[test]
    fn classification_is_deterministic() {
        let body = json!({ "message": "boom", "hint": "later" });
        for status in [400, 401, 403, 404, 422, 429, 500, 502, 503, 504] {
            assert_eq!(classify_status(status, &body), classify_status(status, &body));
        }
    }

    #[test]
    fn faults_are_classified_by_description() {
        assert_eq!(
            classify_fault("connect ECONNREFUSED 127.0.0.1:5678").kind,
            ErrorKind::ConnectionFailed
        );
        assert_eq!(
            classify_fault("dns error: failed to lookup address information").kind,
            ErrorKind::ConnectionFailed
        );
        assert_eq!(classify_fault("operation timed out").kind, ErrorKind::Timeout);
        assert_eq!(
            classify_fault("connection reset by peer").kind,
            ErrorKind::NetworkError
        );
        assert_eq!(classify_fault("something odd").kind, ErrorKind::Unknown);
    }

    #[test]
    fn classified_errors_pass_through() {
        let original = N8nError::new(ErrorKind::ActivationFailed, "no trigger").with_status(400);
        let again = classify(Failure::Classified(original.clone()));
        assert_eq!(again, original);
    }

    #[test]
    fn error_body_parse_is_best_effort() {
        assert_eq!(parse_error_body(""), json!({}));
        assert_eq!(parse_error_body("<html>502</html>"), json!({}));
        assert_eq!(parse_error_body(r#"{"message":"x"}"#), json!({ "message": "x" }));

        let err = classify(Failure::Status {
            status: 502,
            body: parse_error_body("<html>bad gateway</html>"),
        });
        assert_eq!(err.kind, ErrorKind::ServerError);
    }
}
