//! Error types for the Librato metric resource workspace.
//!
//! Every error records the file and line where it was constructed. The
//! `kind` enums are what callers match on.

#![warn(missing_docs)]

mod api;
mod config;
mod metric;
mod retry;
mod spec;

pub use api::{ApiError, ApiErrorKind, ApiResult};
pub use config::{ConfigError, ConfigErrorKind};
pub use metric::{MetricError, MetricErrorKind, MetricResult, Operation};
pub use retry::RetryableError;
pub use spec::{SpecError, SpecErrorKind};
