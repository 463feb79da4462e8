//! Logging capability handed to the client and the retry executor.

use std::fmt;
use std::sync::Arc;

/// Sink for diagnostic messages emitted by the call layer.
pub trait Logger: Send + Sync + fmt::Debug {
    fn debug(&self, message: &str);
    fn warn(&self, message: &str);
}

/// Forwards messages to `tracing` under the `n8n_http` target.
#[cfg(feature = "tracing")]
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingLogger;

#[cfg(feature = "tracing")]
impl Logger for TracingLogger {
    fn debug(&self, message: &str) {
        tracing::debug!(target: "n8n_http", "{message}");
    }

    fn warn(&self, message: &str) {
        tracing::warn!(target: "n8n_http", "{message}");
    }
}

/// Discards everything.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopLogger;

impl Logger for NoopLogger {
    fn debug(&self, _message: &str) {}

    fn warn(&self, _message: &str) {}
}

pub(crate) fn default_logger() -> Arc<dyn Logger> {
    #[cfg(feature = "tracing")]
    {
        Arc::new(TracingLogger)
    }
    #[cfg(not(feature = "tracing"))]
    {
        Arc::new(NoopLogger)
    }
}
