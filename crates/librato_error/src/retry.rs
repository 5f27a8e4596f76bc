//! Retry classification shared by transport errors.

/// Trait for errors that support retry logic.
///
/// Transports consult this before re-sending a request. Only transient
/// failures qualify; rejections and authentication failures never do.
///
/// # Examples
///
/// ```
/// use librato_error::{ApiError, ApiErrorKind, RetryableError};
///
/// let err = ApiError::new(ApiErrorKind::RateLimited("slow down".to_string()));
/// assert!(err.is_retryable());
/// let (backoff, retries, _max_delay) = err.retry_strategy_params();
/// assert_eq!(backoff, 5000);
/// assert_eq!(retries, 3);
///
/// let err = ApiError::new(ApiErrorKind::from_status(400, "bad type"));
/// assert!(!err.is_retryable());
/// ```
pub trait RetryableError {
    /// Returns true if this error should trigger a retry.
    fn is_retryable(&self) -> bool;

    /// Get retry strategy parameters for this error.
    ///
    /// Returns `(initial_backoff_ms, max_retries, max_delay_secs)`.
    fn retry_strategy_params(&self) -> (u64, usize, u64) {
        (500, 3, 10)
    }
}
