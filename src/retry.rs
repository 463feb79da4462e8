//! Bounded retry with exponential backoff.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio::time::sleep;

use crate::{logger::default_logger, ErrorKind, Logger, Result};

/// Attempt count and backoff timing for one retried operation.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct RetryPolicy {
    /// Retries after the initial attempt.
    pub max_retries: u32,
    pub base_delay: Duration,
    /// Cap applied to every individual wait.
    pub max_delay: Duration,
}

impl RetryPolicy {
    /// Kinds that describe a deterministic request problem; retrying cannot fix them.
    pub const NON_RETRYABLE: [ErrorKind; 4] = [
        ErrorKind::Unauthorized,
        ErrorKind::Forbidden,
        ErrorKind::NotFound,
        ErrorKind::ValidationError,
    ];

    /// Whether a failure of this kind may be attempted again.
    pub fn is_retryable(kind: ErrorKind) -> bool {
        !Self::NON_RETRYABLE.contains(&kind)
    }

    /// Wait before the retry that follows attempt index `attempt` (0-based):
    /// `min(base_delay * 2^attempt, max_delay)`.
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let multiplier = 1u32 << attempt.min(31);
        self.base_delay.saturating_mul(multiplier).min(self.max_delay)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            base_delay: Duration::from_millis(1_000),
            max_delay: Duration::from_millis(10_000),
        }
    }
}

/// Runs an attempt closure under a [`RetryPolicy`].
#[derive(Clone, Debug)]
pub struct RetryExecutor {
    policy: RetryPolicy,
    logger: Arc<dyn Logger>,
}

impl RetryExecutor {
    /// Creates an executor that reports backoffs and failures to `logger`.
    pub fn new(policy: RetryPolicy, logger: Arc<dyn Logger>) -> Self {
        Self { policy, logger }
    }

    /// Creates an executor using the default logger.
    pub fn with_policy(policy: RetryPolicy) -> Self {
        Self::new(policy, default_logger())
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// Executes `operation` until it succeeds, fails with a non-retryable
    /// kind, or the retry budget is spent. Attempts run strictly one after
    /// another; the last error is returned unchanged.
    pub async fn run<T, F, Fut>(&self, mut operation: F) -> Result<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let mut attempt = 0u32;
        loop {
            let err = match operation().await {
                Ok(value) => return Ok(value),
                Err(err) => err,
            };

            if !RetryPolicy::is_retryable(err.kind) {
                self.logger.warn(&format!("request failed without retry: {err}"));
                return Err(err);
            }

            if attempt >= self.policy.max_retries {
                let attempts = attempt + 1;
                self.logger.warn(&format!("request failed after {attempts} attempts: {err}"));
                return Err(err);
            }

            let delay = self.policy.delay_for(attempt);
            self.logger.debug(&format!(
                "attempt {} failed ({}); retrying in {} ms",
                attempt + 1,
                err.kind,
                delay.as_millis()
            ));
            sleep(delay).await;
            attempt += 1;
        }
    }
}
