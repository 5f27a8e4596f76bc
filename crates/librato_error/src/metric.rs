//! Errors surfaced by metric lifecycle operations.

use crate::ApiErrorKind;

/// Lifecycle operation that was being attempted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, derive_more::Display)]
pub enum Operation {
    /// Creating a new metric
    #[display("create")]
    Create,
    /// Reading a metric by name
    #[display("read")]
    Read,
    /// Updating mutable fields in place
    #[display("update")]
    Update,
    /// Deleting a metric
    #[display("delete")]
    Delete,
    /// Checking for existence
    #[display("exists")]
    Exists,
    /// Post-apply verification against the declaration
    #[display("verify")]
    Verify,
}

/// Lifecycle error taxonomy.
///
/// Absence on read is not represented here: it is a normal outcome
/// (`ReadOutcome::NotFound` in `librato_core`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, derive_more::Display)]
pub enum MetricErrorKind {
    /// Declaration is malformed or asks for an impossible change
    #[display("Validation failed: {}", _0)]
    Validation(String),
    /// A metric with this name already exists
    #[display("Metric already exists")]
    Conflict,
    /// The metric must exist for this operation but does not
    #[display("Metric does not exist")]
    Missing,
    /// Network, authentication or rate limiting failure
    #[display("Transport failed: {}", _0)]
    Transport(ApiErrorKind),
    /// Remote identity does not match the declaration
    #[display("Integrity violated: expected name '{}', remote reported '{}'", expected, actual)]
    Integrity {
        /// Name the declaration correlates on
        expected: String,
        /// Name the catalog returned
        actual: String,
    },
    /// The catalog never reflected the change within the settling budget
    #[display("Remote state did not settle after {} attempts", attempts)]
    NotSettled {
        /// Number of checks made
        attempts: usize,
    },
}

impl MetricErrorKind {
    /// Integrity failures mean the correlation key is broken; callers must abort.
    pub fn is_fatal(&self) -> bool {
        matches!(self, MetricErrorKind::Integrity { .. })
    }
}

/// Metric lifecycle error carrying the metric name and attempted operation.
///
/// # Examples
///
/// ```
/// use librato_error::{MetricError, MetricErrorKind, Operation};
///
/// let err = MetricError::new(MetricErrorKind::Conflict, Operation::Create, "api.requests");
/// let text = format!("{}", err);
/// assert!(text.contains("create"));
/// assert!(text.contains("api.requests"));
/// ```
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display(
    "Metric Error: {} during {} of '{}' at line {} in {}",
    kind,
    operation,
    name,
    line,
    file
)]
pub struct MetricError {
    /// The kind of error that occurred
    pub kind: MetricErrorKind,
    /// Operation that failed
    pub operation: Operation,
    /// Metric the operation addressed
    pub name: String,
    /// Line number where error was created
    pub line: u32,
    /// File where error was created
    pub file: &'static str,
}

impl MetricError {
    /// Create a new MetricError with automatic location tracking.
    #[track_caller]
    pub fn new(kind: MetricErrorKind, operation: Operation, name: impl Into<String>) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            operation,
            name: name.into(),
            line: location.line(),
            file: location.file(),
        }
    }

    /// Wrap a transport failure.
    ///
    /// Rejections become `Validation`, since the API is the authority on
    /// type and composite syntax.
    #[track_caller]
    pub fn from_api(kind: ApiErrorKind, operation: Operation, name: impl Into<String>) -> Self {
        let kind = match kind {
            ApiErrorKind::Rejected { message, .. } => MetricErrorKind::Validation(message),
            other => MetricErrorKind::Transport(other),
        };
        Self::new(kind, operation, name)
    }
}

/// Result type for metric lifecycle operations.
pub type MetricResult<T> = Result<T, MetricError>;
