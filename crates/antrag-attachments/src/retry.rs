//! Retry with exponential backoff
//!
//! One schedule drives both uploads and deletions: the delay before retry
//! `k` is `base_delay * 2^(k-1)`, and a config with `max_retries` allows
//! `max_retries + 1` attempts in total.

use std::future::Future;
use std::time::Duration;

use antrag_storage::{StorageError, StorageResult};

pub const DEFAULT_MAX_RETRIES: u32 = 3;
pub const DEFAULT_BASE_DELAY: Duration = Duration::from_millis(1000);

/// Retry configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryConfig {
    /// Retries allowed after the first attempt.
    pub max_retries: u32,
    /// Delay before the first retry; doubles for every further retry.
    pub base_delay: Duration,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: DEFAULT_MAX_RETRIES,
            base_delay: DEFAULT_BASE_DELAY,
        }
    }
}

impl RetryConfig {
    pub fn new(max_retries: u32, base_delay: Duration) -> Self {
        Self {
            max_retries,
            base_delay,
        }
    }

    /// Delay before retry `retry` (1-indexed).
    pub fn backoff_delay(&self, retry: u32) -> Duration {
        self.base_delay * 2u32.saturating_pow(retry.saturating_sub(1))
    }

    /// First attempt plus retries.
    pub fn total_attempts(&self) -> u32 {
        self.max_retries + 1
    }
}

/// Run `operation` until it succeeds or the attempt budget is exhausted,
/// sleeping the backoff delay between attempts.
pub(crate) async fn retry_with_backoff<T, F, Fut>(
    config: &RetryConfig,
    operation_name: &str,
    mut operation: F,
) -> StorageResult<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = StorageResult<T>>,
{
    let mut last_error = None;

    for attempt in 0..=config.max_retries {
        match operation().await {
            Ok(value) => return Ok(value),
            Err(e) => {
                if attempt < config.max_retries {
                    let delay = config.backoff_delay(attempt + 1);
                    tracing::warn!(
                        operation = operation_name,
                        attempt = attempt + 1,
                        max_attempts = config.total_attempts(),
                        delay_ms = delay.as_millis() as u64,
                        error = %e,
                        "Operation failed, retrying"
                    );
                    tokio::time::sleep(delay).await;
                }
                last_error = Some(e);
            }
        }
    }

    Err(last_error.unwrap_or_else(|| {
        StorageError::BackendError("operation failed without error detail".to_string())
    }))
}
