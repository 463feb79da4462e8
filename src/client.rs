use std::fmt;
use std::sync::Arc;

use reqwest::header::{self, HeaderMap, HeaderName, HeaderValue};
use serde::de::DeserializeOwned;

use crate::{
    classify::{classify, classify_transport, parse_error_body, Failure},
    decode::decode_success,
    logger::default_logger,
    ClientOptions, ConfigError, ErrorKind, Logger, N8nError, Request, Result, RetryExecutor,
};

/// Header carrying the API key on every request.
pub const API_KEY_HEADER: &str = "X-N8N-API-KEY";

#[derive(Clone)]
/// HTTP client for the n8n public REST API.
///
/// Cloning is cheap; clones share the connection pool and hold the same
/// immutable configuration, so concurrent calls need no coordination.
pub struct N8nClient {
    http: reqwest::Client,
    base_url: String,
    api_key: HeaderValue,
    options: ClientOptions,
    logger: Arc<dyn Logger>,
}

impl fmt::Debug for N8nClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("N8nClient")
            .field("base_url", &self.base_url)
            .field("api_key", &"<redacted>")
            .field("options", &self.options)
            .finish()
    }
}

impl N8nClient {
    /// Creates a client for `base_url` (e.g. `https://n8n.example.com`).
    ///
    /// Trailing slashes are stripped. Fails when either argument is blank.
    pub fn new(
        base_url: impl AsRef<str>,
        api_key: impl AsRef<str>,
    ) -> std::result::Result<Self, ConfigError> {
        let base_url = normalize_base_url(base_url.as_ref());
        if base_url.is_empty() {
            return Err(ConfigError::MissingBaseUrl);
        }
        let api_key = api_key.as_ref().trim();
        if api_key.is_empty() {
            return Err(ConfigError::MissingApiKey);
        }
        let mut api_key =
            HeaderValue::from_str(api_key).map_err(|_| ConfigError::InvalidApiKey)?;
        api_key.set_sensitive(true);

        Ok(Self {
            http: reqwest::Client::new(),
            base_url,
            api_key,
            options: ClientOptions::default(),
            logger: default_logger(),
        })
    }

    /// Creates a client from environment variables.
    ///
    /// Reads:
    /// - `N8N_API_URL` — base URL of the n8n instance
    /// - `N8N_API_KEY` — API key
    /// - `N8N_TIMEOUT_MS` (optional) — per-attempt timeout
    /// - `N8N_MAX_RETRIES` (optional) — retries after the first attempt
    ///
    /// # Example
    ///
    /// ```no_run
    /// use n8n_http::N8nClient;
    ///
    /// let client = N8nClient::from_env().expect("missing N8N_* env vars");
    /// ```
    pub fn from_env() -> std::result::Result<Self, ConfigError> {
        let url = required_env("N8N_API_URL")?;
        let key = required_env("N8N_API_KEY")?;

        let mut options = ClientOptions::default();
        if let Some(timeout_ms) = optional_env("N8N_TIMEOUT_MS")? {
            options.timeout_ms = timeout_ms;
        }
        if let Some(max_retries) = optional_env("N8N_MAX_RETRIES")? {
            options.max_retries = max_retries;
        }

        Ok(Self::new(url, key)?.with_options(options))
    }

    /// Applies client options such as timeout and retry behavior.
    pub fn with_options(mut self, opts: ClientOptions) -> Self {
        self.options = opts;
        self
    }

    /// Replaces the logger used by this client and its retry loop.
    pub fn with_logger(mut self, logger: Arc<dyn Logger>) -> Self {
        self.logger = logger;
        self
    }

    /// Base URL without trailing slash.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn options(&self) -> &ClientOptions {
        &self.options
    }

    /// Full URL for `request`, without the query string.
    pub fn endpoint(&self, request: &Request) -> String {
        format!("{}{}{}", self.base_url, request.scope.prefix(), request.path)
    }

    /// Performs `request` under the client's retry policy and decodes the
    /// response as `T`.
    ///
    /// Empty success bodies decode as JSON `null`, so `()`, `Option<_>` and
    /// `serde_json::Value` are valid targets for no-content operations.
    pub async fn execute<T: DeserializeOwned>(&self, request: Request) -> Result<T> {
        let headers = self.headers_for(&request)?;
        let retry = RetryExecutor::new(self.options.retry_policy(), Arc::clone(&self.logger));
        retry.run(|| self.attempt(&request, headers.clone())).await
    }

    /// Performs exactly one network attempt for `request`.
    pub async fn execute_once<T: DeserializeOwned>(&self, request: &Request) -> Result<T> {
        let headers = self.headers_for(request)?;
        self.attempt(request, headers).await
    }

    async fn attempt<T: DeserializeOwned>(
        &self,
        request: &Request,
        headers: HeaderMap,
    ) -> Result<T> {
        let url = self.endpoint(request);
        let timeout = request.timeout.unwrap_or_else(|| self.options.timeout());
        self.logger.debug(&format!("{} {}", request.method, url));

        // The timeout belongs to this builder only; a fresh one is made per attempt.
        let mut builder = self
            .http
            .request(request.method.clone(), &url)
            .headers(headers)
            .timeout(timeout);
        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder
            .send()
            .await
            .map_err(|err| classify(Failure::Transport(err)))?;
        let status = response.status();

        if !status.is_success() {
            // A body that cannot be read is treated like one that cannot be parsed.
            let body = response.text().await.unwrap_or_default();
            return Err(classify(Failure::Status {
                status: status.as_u16(),
                body: parse_error_body(&body),
            }));
        }

        let body = response
            .text()
            .await
            .map_err(|err| classify_transport(&err))?;
        decode_success(status.as_u16(), &body)
    }

    fn headers_for(&self, request: &Request) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();
        headers.insert(header::CONTENT_TYPE, HeaderValue::from_static("application/json"));

        for (name, value) in &request.headers {
            if name.eq_ignore_ascii_case(API_KEY_HEADER) {
                continue;
            }
            let name = HeaderName::from_bytes(name.as_bytes()).map_err(|err| {
                N8nError::new(ErrorKind::Unknown, format!("invalid header name '{name}': {err}"))
            })?;
            let value = HeaderValue::from_str(value).map_err(|err| {
                N8nError::new(
                    ErrorKind::Unknown,
                    format!("invalid value for header '{name}': {err}"),
                )
            })?;
            headers.insert(name, value);
        }

        headers.insert(HeaderName::from_static("x-n8n-api-key"), self.api_key.clone());
        Ok(headers)
    }
}

fn normalize_base_url(url: &str) -> String {
    url.trim().trim_end_matches('/').to_owned()
}

fn required_env(name: &'static str) -> std::result::Result<String, ConfigError> {
    match std::env::var(name) {
        Ok(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(ConfigError::MissingEnv(name)),
    }
}

fn optional_env<V: std::str::FromStr>(
    name: &'static str,
) -> std::result::Result<Option<V>, ConfigError> {
    match std::env::var(name) {
        Ok(value) if !value.trim().is_empty() => value
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::InvalidEnv { name, value }),
        _ => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use reqwest::header;

    use super::{normalize_base_url, N8nClient, API_KEY_HEADER};
    use crate::{ConfigError, Request, Scope};

    fn client() -> N8nClient {
        N8nClient::new("https://n8n.example.com/", "secret-key").expect("must build client")
    }

    #[test]
    fn base_url_trailing_slashes_are_stripped() {
        assert_eq!(normalize_base_url(" https://n8n.local// "), "https://n8n.local");
        assert_eq!(client().base_url(), "https://n8n.example.com");
    }

    #[test]
    fn construction_fails_fast_on_blank_inputs() {
        assert_eq!(
            N8nClient::new("  ", "key").unwrap_err(),
            ConfigError::MissingBaseUrl
        );
        assert_eq!(
            N8nClient::new("https://n8n.local", "").unwrap_err(),
            ConfigError::MissingApiKey
        );
        assert_eq!(
            N8nClient::new("https://n8n.local", "bad\nkey").unwrap_err(),
            ConfigError::InvalidApiKey
        );
    }

    #[test]
    fn endpoint_joins_scope_prefix() {
        let client = client();
        assert_eq!(
            client.endpoint(&Request::get("/workflows/7")),
            "https://n8n.example.com/api/v1/workflows/7"
        );
        assert_eq!(
            client.endpoint(&Request::post("/orders").scope(Scope::Webhook)),
            "https://n8n.example.com/webhook/orders"
        );
    }

    #[test]
    fn caller_headers_cannot_replace_api_key() {
        let request = Request::get("/workflows")
            .header(API_KEY_HEADER, "stolen")
            .header("x-n8n-api-key", "stolen")
            .header("Content-Type", "application/merge-patch+json")
            .header("X-Trace", "abc");
        let headers = client().headers_for(&request).expect("must build headers");

        assert_eq!(headers.get_all("x-n8n-api-key").iter().count(), 1);
        assert_eq!(headers["x-n8n-api-key"], "secret-key");
        assert_eq!(
            headers[header::CONTENT_TYPE],
            "application/merge-patch+json"
        );
        assert_eq!(headers["x-trace"], "abc");
    }

    #[test]
    fn invalid_header_is_rejected_before_sending() {
        let request = Request::get("/workflows").header("bad header", "x");
        assert!(client().headers_for(&request).is_err());
    }

    #[test]
    fn debug_redacts_api_key() {
        let debug = format!("{:?}", client());
        assert!(debug.contains("<redacted>"));
        assert!(!debug.contains("secret-key"));
    }
}
