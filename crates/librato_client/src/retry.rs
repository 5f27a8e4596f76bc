//! Retry with exponential backoff for transient API failures.

use librato_error::{ApiResult, ConfigError, ConfigErrorKind, RetryableError};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, instrument, warn};

/// Retry configuration for API requests.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    /// Maximum number of attempts, including the first.
    pub max_attempts: usize,
    /// Initial backoff in milliseconds.
    pub initial_backoff_ms: u64,
    /// Maximum backoff in milliseconds.
    pub max_backoff_ms: u64,
    /// Backoff multiplier.
    pub backoff_multiplier: f64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_backoff_ms: 500,
            max_backoff_ms: 10_000,
            backoff_multiplier: 2.0,
        }
    }
}

impl RetryConfig {
    /// A single attempt with no retries.
    pub fn disabled() -> Self {
        Self {
            max_attempts: 1,
            ..Self::default()
        }
    }

    /// Check that the backoff can only grow and stays finite.
    ///
    /// # Errors
    ///
    /// `InvalidRetry` for a multiplier below 1.0, NaN or infinity.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let multiplier = self.backoff_multiplier;
        if !multiplier.is_finite() || multiplier < 1.0 {
            return Err(ConfigError::new(ConfigErrorKind::InvalidRetry {
                field: "backoff_multiplier",
                value: multiplier.to_string(),
                reason: "must be a finite number of at least 1.0",
            }));
        }
        Ok(())
    }

    fn initial_backoff(&self) -> Duration {
        Duration::from_millis(self.initial_backoff_ms)
    }

    fn max_backoff(&self) -> Duration {
        Duration::from_millis(self.max_backoff_ms)
    }
}

/// Retries an operation with exponential backoff.
///
/// Only errors whose [`RetryableError::is_retryable`] is true are retried.
/// Rate limiting waits at least the error's own suggested backoff.
#[instrument(skip(operation))]
pub async fn retry_with_backoff<F, Fut, T>(config: &RetryConfig, mut operation: F) -> ApiResult<T>
where
    F: FnMut() -> Fut,
    Fut: std::future::Future<Output = ApiResult<T>>,
{
    let mut attempt = 0;
    let mut backoff = config.initial_backoff();

    loop {
        attempt += 1;
        debug!(attempt, "Executing request");

        match operation().await {
            Ok(result) => {
                if attempt > 1 {
                    debug!(attempt, "Request succeeded after retry");
                }
                return Ok(result);
            }
            Err(err) => {
                if !err.is_retryable() {
                    return Err(err);
                }

                if attempt >= config.max_attempts.max(1) {
                    warn!(attempt, error = %err.kind, "All retry attempts exhausted");
                    return Err(err);
                }

                let mut wait = backoff;
                if err.kind.should_backoff() {
                    let (suggested_ms, _, _) = err.retry_strategy_params();
                    wait = wait.max(Duration::from_millis(suggested_ms));
                    warn!(wait_ms = wait.as_millis(), "Rate limited, backing off");
                } else {
                    warn!(wait_ms = wait.as_millis(), error = %err.kind, "Retrying after failure");
                }
                wait = wait.min(config.max_backoff());

                sleep(wait).await;

                backoff = next_backoff(backoff, config.backoff_multiplier, config.max_backoff());
            }
        }
    }
}

/// `current * multiplier`, capped at `max`. Out-of-range products saturate to `max`.
pub(crate) fn next_backoff(current: Duration, multiplier: f64, max: Duration) -> Duration {
    Duration::try_from_secs_f64(current.as_secs_f64() * multiplier)
        .unwrap_or(max)
        .min(max)
}
