//! Core metric definition types for the Librato metric resource workspace.
//!
//! [`MetricSpec`] is the declared intent, [`RemoteMetric`] is what the
//! catalog reports, and [`ReadOutcome`] distinguishes absence from failure.

#![warn(missing_docs)]

mod attributes;
mod metric_type;
mod name;
mod observability;
mod remote;
mod spec;

pub use attributes::{KNOWN_ATTRIBUTES, MetricAttributes};
pub use metric_type::{MetricKind, MetricType};
pub use name::{MAX_NAME_LENGTH, validate_name};
pub use observability::{LogFormat, init_tracing};
pub use remote::{ReadOutcome, RemoteMetric, RemoteMetricBuilder, RemoteMetricBuilderError};
pub use spec::{MetricDeclaration, MetricSpec, MetricSpecBuilder, MetricSpecBuilderError};
