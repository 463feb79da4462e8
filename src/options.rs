use std::time::Duration;

use crate::RetryPolicy;

/// Configures HTTP timeout and retry behavior.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ClientOptions {
    /// Per-attempt timeout in milliseconds.
    pub timeout_ms: u64,
    /// Maximum number of retries after the initial attempt.
    pub max_retries: u32,
    /// Base retry backoff in milliseconds (exponential strategy).
    pub retry_backoff_ms: u64,
    /// Upper bound for a single backoff wait in milliseconds.
    pub max_backoff_ms: u64,
}

impl ClientOptions {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Retry policy derived from these options.
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_retries: self.max_retries,
            base_delay: Duration::from_millis(self.retry_backoff_ms),
            max_delay: Duration::from_millis(self.max_backoff_ms),
        }
    }
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            timeout_ms: 30_000,
            max_retries: 3,
            retry_backoff_ms: 1_000,
            max_backoff_ms: 10_000,
        }
    }
}
