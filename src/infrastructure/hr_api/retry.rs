use std::future::Future;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, warn};

use crate::domain::errors::HrApiError;
use crate::domain::models::RetryConfig;

/// Retry policy configuration for handling transient HR API errors
///
/// Backoff doubles with each retry (1s, 2s with the defaults). Only errors
/// for which [`HrApiError::is_transient`] holds are retried: 5xx responses
/// and network/timeout failures.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Retries after the first attempt
    max_retries: u32,
    /// Initial backoff duration in milliseconds
    initial_backoff_ms: u64,
    /// Maximum backoff duration in milliseconds
    max_backoff_ms: u64,
}

impl RetryPolicy {
    /// Create a new retry policy
    ///
    /// # Arguments
    /// * `max_retries` - Retries after the first attempt (default: 2)
    /// * `initial_backoff_ms` - Starting backoff delay (default: 1000ms)
    /// * `max_backoff_ms` - Maximum backoff delay (default: 4000ms)
    pub fn new(max_retries: u32, initial_backoff_ms: u64, max_backoff_ms: u64) -> Self {
        Self {
            max_retries,
            initial_backoff_ms,
            max_backoff_ms: max_backoff_ms.max(initial_backoff_ms),
        }
    }

    pub fn from_config(config: &RetryConfig) -> Self {
        Self::new(
            config.max_retries,
            config.initial_backoff_ms,
            config.max_backoff_ms,
        )
    }

    pub fn max_retries(&self) -> u32 {
        self.max_retries
    }

    /// Execute an operation with exponential backoff retry logic
    ///
    /// The operation receives the zero-based attempt number, so callers can
    /// limit behaviour (such as re-authentication) to the first attempt.
    ///
    /// # Returns
    /// * `Ok(T)` - Operation succeeded
    /// * `Err(HrApiError)` - Permanent error, or the last transient error once
    ///   retries are exhausted
    pub async fn execute<F, Fut, T>(&self, mut operation: F) -> Result<T, HrApiError>
    where
        F: FnMut(u32) -> Fut,
        Fut: Future<Output = Result<T, HrApiError>>,
    {
        let mut attempt = 0;

        loop {
            match operation(attempt).await {
                Ok(result) => {
                    if attempt > 0 {
                        debug!("Operation succeeded after {} retries", attempt);
                    }
                    return Ok(result);
                }
                Err(err) => {
                    if self.should_retry(&err, attempt) {
                        let backoff = self.calculate_backoff(attempt);
                        warn!(
                            "Attempt {} failed with transient error: {}. Retrying in {:?}...",
                            attempt + 1,
                            err,
                            backoff
                        );

                        sleep(backoff).await;
                        attempt += 1;
                    } else {
                        if err.is_transient() {
                            warn!("Operation failed after {} attempts: {}", attempt + 1, err);
                        } else {
                            debug!("Permanent error, not retrying: {}", err);
                        }
                        return Err(err);
                    }
                }
            }
        }
    }

    /// Calculate backoff duration for a given attempt
    ///
    /// Uses exponential backoff: initial * 2^attempt, capped at max_backoff_ms
    fn calculate_backoff(&self, attempt: u32) -> Duration {
        let backoff_ms = self
            .initial_backoff_ms
            .saturating_mul(2_u64.saturating_pow(attempt))
            .min(self.max_backoff_ms);

        Duration::from_millis(backoff_ms)
    }

    fn should_retry(&self, error: &HrApiError, attempt: u32) -> bool {
        if attempt >= self.max_retries {
            return false;
        }

        error.is_transient()
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from_config(&RetryConfig::default())
    }
}
