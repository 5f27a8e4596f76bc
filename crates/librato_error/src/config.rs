//! Configuration error types.

/// Kinds of configuration failure.
#[derive(Debug, Clone, PartialEq, Eq, Hash, derive_more::Display)]
pub enum ConfigErrorKind {
    /// Configuration sources could not be read or merged
    #[display("Failed to load configuration: {}", _0)]
    Load(String),
    /// A required credential is absent
    #[display("Missing credential: {} (set {} or add it to the config file)", field, env_var)]
    MissingCredential {
        /// Configuration key
        field: &'static str,
        /// Environment variable that supplies it
        env_var: &'static str,
    },
    /// The API base URL is malformed
    #[display("Invalid base URL '{}': {}", url, reason)]
    InvalidBaseUrl {
        /// URL as configured
        url: String,
        /// Parser message
        reason: String,
    },
    /// A retry setting is outside its usable range
    #[display("Invalid retry setting {} = {}: {}", field, value, reason)]
    InvalidRetry {
        /// Configuration key under `[retry]`
        field: &'static str,
        /// Value as configured
        value: String,
        /// Why it was refused
        reason: &'static str,
    },
    /// The HTTP client could not be constructed
    #[display("Failed to build HTTP client: {}", _0)]
    ClientBuild(String),
}

/// Configuration error with source location.
///
/// # Examples
///
/// ```
/// use librato_error::{ConfigError, ConfigErrorKind};
///
/// let err = ConfigError::new(ConfigErrorKind::MissingCredential {
///     field: "token",
///     env_var: "LIBRATO_TOKEN",
/// });
/// assert!(format!("{}", err).contains("LIBRATO_TOKEN"));
/// ```
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Configuration Error: {} at line {} in {}", kind, line, file)]
pub struct ConfigError {
    /// The kind of error that occurred
    pub kind: ConfigErrorKind,
    /// Line number where the error occurred
    pub line: u32,
    /// File where the error occurred
    pub file: &'static str,
}

impl ConfigError {
    /// Create a new ConfigError at the current location.
    #[track_caller]
    pub fn new(kind: ConfigErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }
}
