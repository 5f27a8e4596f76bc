//! Transport-level errors from the metrics API.

use crate::RetryableError;

/// Failure conditions reported by a metrics API transport.
#[derive(Debug, Clone, PartialEq, Eq, Hash, derive_more::Display)]
pub enum ApiErrorKind {
    /// The catalog has no metric with this name (HTTP 404)
    #[display("Metric not found: {}", _0)]
    NotFound(String),
    /// The API refused the request as invalid (HTTP 400/422)
    #[display("Request rejected (status {}): {}", status, message)]
    Rejected {
        /// HTTP status code
        status: u16,
        /// Error message from the response body
        message: String,
    },
    /// Credentials missing or refused (HTTP 401/403)
    #[display("Authentication failed (status {}): {}", status, message)]
    Unauthorized {
        /// HTTP status code
        status: u16,
        /// Error message from the response body
        message: String,
    },
    /// Too many requests (HTTP 429)
    #[display("Rate limited: {}", _0)]
    RateLimited(String),
    /// The API failed internally (HTTP 5xx)
    #[display("Server error (status {}): {}", status, message)]
    Server {
        /// HTTP status code
        status: u16,
        /// Error message from the response body
        message: String,
    },
    /// Any other unexpected HTTP status
    #[display("Unexpected status {}: {}", status, message)]
    UnexpectedStatus {
        /// HTTP status code
        status: u16,
        /// Error message from the response body
        message: String,
    },
    /// Connection, timeout or other network failure
    #[display("HTTP error: {}", _0)]
    Http(String),
    /// The response body could not be decoded
    #[display("Response parsing failed: {}", _0)]
    ResponseParsing(String),
}

impl ApiErrorKind {
    /// Classify a non-success HTTP status.
    ///
    /// 404 is not handled here because only the caller knows which metric
    /// name was being addressed.
    pub fn from_status(status: u16, message: impl Into<String>) -> Self {
        let message = message.into();
        match status {
            400 | 422 => ApiErrorKind::Rejected { status, message },
            401 | 403 => ApiErrorKind::Unauthorized { status, message },
            429 => ApiErrorKind::RateLimited(message),
            500..=599 => ApiErrorKind::Server { status, message },
            _ => ApiErrorKind::UnexpectedStatus { status, message },
        }
    }

    /// True when the remote catalog reported the metric as absent.
    pub fn is_not_found(&self) -> bool {
        matches!(self, ApiErrorKind::NotFound(_))
    }

    /// True when the API rejected the request content.
    pub fn is_rejected(&self) -> bool {
        matches!(self, ApiErrorKind::Rejected { .. })
    }

    /// Check if this error type should be retried.
    pub fn is_retryable(&self) -> bool {
        match self {
            ApiErrorKind::RateLimited(_) | ApiErrorKind::Http(_) => true,
            ApiErrorKind::Server { status, .. } => {
                matches!(*status, 500 | 502 | 503 | 504)
            }
            _ => false,
        }
    }

    /// Rate limiting deserves a longer pause than the default backoff.
    pub fn should_backoff(&self) -> bool {
        matches!(self, ApiErrorKind::RateLimited(_))
    }
}

/// Metrics API error with source location tracking.
///
/// # Examples
///
/// ```
/// use librato_error::{ApiError, ApiErrorKind};
///
/// let err = ApiError::new(ApiErrorKind::from_status(503, "maintenance"));
/// assert!(err.kind.is_retryable());
/// assert!(format!("{}", err).contains("503"));
/// ```
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("API Error: {} at line {} in {}", kind, line, file)]
pub struct ApiError {
    /// The kind of error that occurred
    pub kind: ApiErrorKind,
    /// Line number where error was created
    pub line: u32,
    /// File where error was created
    pub file: &'static str,
}

impl ApiError {
    /// Create a new ApiError with automatic location tracking.
    #[track_caller]
    pub fn new(kind: ApiErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }

    /// Shorthand for a not-found error on `name`.
    #[track_caller]
    pub fn not_found(name: impl Into<String>) -> Self {
        Self::new(ApiErrorKind::NotFound(name.into()))
    }
}

impl From<ApiErrorKind> for ApiError {
    #[track_caller]
    fn from(kind: ApiErrorKind) -> Self {
        Self::new(kind)
    }
}

impl RetryableError for ApiError {
    fn is_retryable(&self) -> bool {
        self.kind.is_retryable()
    }

    fn retry_strategy_params(&self) -> (u64, usize, u64) {
        match &self.kind {
            ApiErrorKind::RateLimited(_) => (5000, 3, 40),
            ApiErrorKind::Server { status: 503, .. } => (2000, 5, 60),
            ApiErrorKind::Server { .. } => (1000, 3, 8),
            _ => (500, 3, 10),
        }
    }
}

/// Result type for metrics API calls.
pub type ApiResult<T> = Result<T, ApiError>;
