//! Declarative management of Librato metric definitions.
//!
//! This crate re-exports the workspace crates and hosts the `librato`
//! command-line tool.
//!
//! # Example
//!
//! ```no_run
//! use librato::{LibratoClient, MetricResourceManager, MetricSpec};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = LibratoClient::from_config(None)?;
//! let manager = MetricResourceManager::new(client);
//!
//! let spec = MetricSpec::counter("api.requests")?.with_description("Requests served");
//! manager.create(&spec).await?;
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

pub mod cli;

pub use librato_client::{ClientConfig, LibratoClient, RetryConfig};
pub use librato_core::{
    LogFormat, MetricAttributes, MetricDeclaration, MetricKind, MetricSpec, MetricType,
    ReadOutcome, RemoteMetric, init_tracing,
};
pub use librato_error::{
    ApiError, ApiErrorKind, ConfigError, ConfigErrorKind, MetricError, MetricErrorKind,
    Operation, SpecError, SpecErrorKind,
};
pub use librato_interface::MetricsApi;
pub use librato_resource::{
    ApplyOutcome, DriftReport, InMemoryMetricsApi, MetricResourceManager, Plan, PlannedAction,
    Reconciler, ResourceState, SettleStrategy, detect_drift,
};
