//! Waiting for the eventually consistent catalog to reflect a change.

use librato_error::{MetricError, MetricErrorKind, MetricResult, Operation};
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, instrument, warn};

/// How long to wait for a change to become visible before re-reading.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "strategy", rename_all = "snake_case")]
pub enum SettleStrategy {
    /// Check once, immediately
    #[default]
    Immediate,
    /// Sleep once, then check once
    FixedDelay {
        /// Delay before the check, in milliseconds
        delay_ms: u64,
    },
    /// Check repeatedly with exponential backoff
    Poll {
        /// Maximum number of checks
        max_attempts: usize,
        /// Wait after the first failed check, in milliseconds
        initial_backoff_ms: u64,
        /// Upper bound on any single wait, in milliseconds
        max_backoff_ms: u64,
        /// Growth factor between waits
        multiplier: f64,
    },
}

impl SettleStrategy {
    /// Fixed delay of `delay`.
    pub fn fixed(delay: Duration) -> Self {
        SettleStrategy::FixedDelay {
            delay_ms: millis(delay),
        }
    }

    /// Bounded polling starting at `initial`, doubling up to `max`.
    pub fn poll(max_attempts: usize, initial: Duration, max: Duration) -> Self {
        SettleStrategy::Poll {
            max_attempts,
            initial_backoff_ms: millis(initial),
            max_backoff_ms: millis(max),
            multiplier: 2.0,
        }
    }

    /// Run `check` until it yields `Some`, following this strategy.
    ///
    /// Check errors end the wait immediately.
    ///
    /// # Errors
    ///
    /// `NotSettled` if the check never yields a value, or the check's own error.
    #[instrument(skip(self, check), fields(strategy = ?self))]
    pub async fn settle<T, F, Fut>(
        &self,
        operation: Operation,
        name: &str,
        mut check: F,
    ) -> MetricResult<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = MetricResult<Option<T>>>,
    {
        match self {
            SettleStrategy::Immediate => check()
                .await?
                .ok_or_else(|| not_settled(operation, name, 1)),
            SettleStrategy::FixedDelay { delay_ms } => {
                sleep(Duration::from_millis(*delay_ms)).await;
                check()
                    .await?
                    .ok_or_else(|| not_settled(operation, name, 1))
            }
            SettleStrategy::Poll {
                max_attempts,
                initial_backoff_ms,
                max_backoff_ms,
                multiplier,
            } => {
                let max_attempts = (*max_attempts).max(1);
                let multiplier = multiplier.max(1.0);
                let max_backoff = Duration::from_millis(*max_backoff_ms);
                let mut backoff = Duration::from_millis(*initial_backoff_ms).min(max_backoff);

                for attempt in 1..=max_attempts {
                    if let Some(value) = check().await? {
                        debug!(attempt, "Remote state settled");
                        return Ok(value);
                    }
                    if attempt < max_attempts {
                        debug!(attempt, wait_ms = backoff.as_millis(), "Not settled yet");
                        sleep(backoff).await;
                        backoff = Duration::try_from_secs_f64(backoff.as_secs_f64() * multiplier)
                            .unwrap_or(max_backoff)
                            .min(max_backoff);
                    }
                }

                warn!(attempts = max_attempts, "Remote state did not settle");
                Err(not_settled(operation, name, max_attempts))
            }
        }
    }
}

fn millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

fn not_settled(operation: Operation, name: &str, attempts: usize) -> MetricError {
    MetricError::new(MetricErrorKind::NotSettled { attempts }, operation, name)
}
