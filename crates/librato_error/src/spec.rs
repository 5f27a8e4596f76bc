//! Errors raised while building or parsing a metric declaration.

/// Ways a metric declaration can be malformed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, derive_more::Display)]
pub enum SpecErrorKind {
    /// Metric name is empty
    #[display("Metric name must not be empty")]
    EmptyName,
    /// Metric name exceeds the catalog limit
    #[display("Metric name is {} characters, limit is {}", length, limit)]
    NameTooLong {
        /// Actual length
        length: usize,
        /// Maximum accepted length
        limit: usize,
    },
    /// Metric name contains a character the catalog refuses
    #[display("Metric name '{}' contains invalid character '{}'", name, character)]
    InvalidNameCharacter {
        /// Offending name
        name: String,
        /// First offending character
        character: char,
    },
    /// `type` is not gauge, counter or composite
    #[display("Unknown metric type '{}' (expected gauge, counter or composite)", _0)]
    UnknownType(String),
    /// Composite metric without an expression
    #[display("Composite metric requires a non-empty composite expression")]
    MissingComposite,
    /// Composite expression on a gauge or counter
    #[display("Composite expression is only valid for composite metrics, not {}", _0)]
    UnexpectedComposite(String),
    /// Period must be a positive number of seconds
    #[display("Period must be greater than zero")]
    ZeroPeriod,
    /// Builder failed for another reason
    #[display("{}", _0)]
    Builder(String),
}

/// Declaration error with location tracking.
///
/// # Examples
///
/// ```
/// use librato_error::{SpecError, SpecErrorKind};
///
/// let err = SpecError::new(SpecErrorKind::MissingComposite);
/// assert!(format!("{}", err).contains("composite expression"));
/// ```
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Spec Error: {} at line {} in {}", kind, line, file)]
pub struct SpecError {
    /// The kind of error that occurred
    pub kind: SpecErrorKind,
    /// Line number where error was created
    pub line: u32,
    /// File where error was created
    pub file: &'static str,
}

impl SpecError {
    /// Create a new SpecError with automatic location tracking.
    #[track_caller]
    pub fn new(kind: SpecErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }
}

impl From<SpecErrorKind> for SpecError {
    #[track_caller]
    fn from(kind: SpecErrorKind) -> Self {
        Self::new(kind)
    }
}
