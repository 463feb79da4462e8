//! `n8n-http` is an async HTTP client for the n8n public REST API.
//!
//! Every call goes through one executor that adds the API key, enforces a
//! per-attempt timeout, classifies failures into [`N8nError`] and retries
//! transient ones with exponential backoff:
//! - [`N8nClient::execute`] for arbitrary endpoints
//! - typed wrappers such as [`N8nClient::list_workflows`] and
//!   [`N8nClient::activate_workflow`]

mod classify;
mod client;
mod decode;
mod error;
mod logger;
mod options;
mod request;
mod resources;
mod retry;
mod types;

pub use classify::{
    classify, classify_fault, classify_status, classify_transport, parse_error_body, Failure,
};
pub use client::{N8nClient, API_KEY_HEADER};
pub use error::{ConfigError, ErrorKind, N8nError};
#[cfg(feature = "tracing")]
pub use logger::TracingLogger;
pub use logger::{Logger, NoopLogger};
pub use options::ClientOptions;
pub use request::{Request, Scope};
pub use retry::{RetryExecutor, RetryPolicy};
pub use types::{ExecutionListParams, ExecutionStatus, Page, WorkflowListParams};

pub use reqwest::Method;

pub type Result<T> = std::result::Result<T, N8nError>;
