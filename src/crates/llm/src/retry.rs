//! Retry with exponential backoff for transient provider failures.

use crate::error::{LlmError, Result};
use std::future::Future;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, warn};

/// Backoff settings.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Retries after the first attempt
    pub max_retries: u32,

    /// Delay before the first retry
    pub initial_delay: Duration,

    /// Upper bound on any single delay
    pub max_delay: Duration,

    /// Growth factor between retries
    pub multiplier: f64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            initial_delay: Duration::from_millis(500),
            max_delay: Duration::from_secs(30),
            multiplier: 2.0,
        }
    }
}

impl RetryPolicy {
    /// Default backoff with the given retry count
    pub fn with_max_retries(max_retries: u32) -> Self {
        Self {
            max_retries,
            ..Default::default()
        }
    }

    /// No waiting between attempts
    pub fn immediate(max_retries: u32) -> Self {
        Self {
            max_retries,
            initial_delay: Duration::ZERO,
            max_delay: Duration::ZERO,
            multiplier: 1.0,
        }
    }

    /// Delay before retry number `attempt` (0-indexed)
    pub fn calculate_delay(&self, attempt: u32) -> Duration {
        let millis = self.initial_delay.as_millis() as f64 * self.multiplier.powi(attempt as i32);
        let capped = millis.min(self.max_delay.as_millis() as f64);
        Duration::from_millis(capped as u64)
    }
}

/// Run `operation`, retrying while it fails with a retryable error.
///
/// Non-retryable errors (authentication, bad request, malformed body) are
/// returned on first occurrence.
pub async fn with_retry<F, Fut, T>(policy: &RetryPolicy, operation_name: &str, mut operation: F) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let mut attempt = 0u32;
    loop {
        match operation().await {
            Ok(result) => {
                if attempt > 0 {
                    debug!(operation = %operation_name, attempt, "Retry succeeded");
                }
                return Ok(result);
            }
            Err(e) if e.is_retryable() && attempt < policy.max_retries => {
                let delay = policy.calculate_delay(attempt);
                warn!(
                    operation = %operation_name,
                    attempt = attempt + 1,
                    max_retries = policy.max_retries,
                    delay_ms = delay.as_millis() as u64,
                    error = %e,
                    "Request failed, will retry"
                );
                sleep(delay).await;
                attempt += 1;
            }
            Err(e) => {
                if e.is_retryable() {
                    warn!(operation = %operation_name, error = %e, "Max retries exhausted");
                }
                return Err(e);
            }
        }
    }
}
