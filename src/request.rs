use std::time::Duration;

use reqwest::Method;
use serde::Serialize;
use serde_json::Value as JsonValue;

use crate::{ErrorKind, N8nError, Result};

/// Which URL prefix a request path is joined with.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum Scope {
    /// Versioned public API: `{base}/api/v1{path}`.
    #[default]
    Api,
    /// Production webhooks: `{base}/webhook{path}`.
    Webhook,
}

impl Scope {
    pub(crate) fn prefix(self) -> &'static str {
        match self {
            Self::Api => "/api/v1",
            Self::Webhook => "/webhook",
        }
    }
}

/// Parameters of one outbound call.
#[derive(Clone, Debug, PartialEq)]
pub struct Request {
    pub method: Method,
    /// Path below the scope prefix, always starting with `/`.
    pub path: String,
    pub scope: Scope,
    pub query: Vec<(String, String)>,
    /// Extra headers; may override `Content-Type` but never the API key.
    pub headers: Vec<(String, String)>,
    pub body: Option<JsonValue>,
    /// Overrides the client's per-attempt timeout.
    pub timeout: Option<Duration>,
}

impl Request {
    /// Creates a request; a missing leading `/` is added to `path`.
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        let path = path.into();
        let path = if path.starts_with('/') {
            path
        } else {
            format!("/{path}")
        };
        Self {
            method,
            path,
            scope: Scope::Api,
            query: Vec::new(),
            headers: Vec::new(),
            body: None,
            timeout: None,
        }
    }

    /// Creates a `GET` request.
    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    /// Creates a `POST` request.
    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    /// Creates a `PUT` request.
    pub fn put(path: impl Into<String>) -> Self {
        Self::new(Method::PUT, path)
    }

    /// Creates a `PATCH` request.
    pub fn patch(path: impl Into<String>) -> Self {
        Self::new(Method::PATCH, path)
    }

    /// Creates a `DELETE` request.
    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::DELETE, path)
    }

    /// Selects the URL prefix the path is joined with.
    pub fn scope(mut self, scope: Scope) -> Self {
        self.scope = scope;
        self
    }

    /// Appends a query-string pair.
    pub fn query(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.query.push((key.into(), value.to_string()));
        self
    }

    /// Appends the query pair only when `value` is present.
    pub fn query_opt<V: ToString>(self, key: impl Into<String>, value: Option<V>) -> Self {
        match value {
            Some(value) => self.query(key, value),
            None => self,
        }
    }

    /// Adds a header, replacing any earlier value with the same name.
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Sets the JSON payload.
    pub fn body(mut self, body: JsonValue) -> Self {
        self.body = Some(body);
        self
    }

    /// Serializes `body` as the JSON payload.
    pub fn json<B: Serialize + ?Sized>(self, body: &B) -> Result<Self> {
        let value = serde_json::to_value(body).map_err(|err| {
            N8nError::new(
                ErrorKind::Unknown,
                format!("request body could not be serialized: {err}"),
            )
        })?;
        Ok(self.body(value))
    }

    /// Sets a per-attempt timeout for this request only.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}
