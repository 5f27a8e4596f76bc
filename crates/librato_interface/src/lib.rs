//! Trait definitions for the Librato metric resource workspace.

#![warn(missing_docs)]

mod metrics_api;

pub use metrics_api::MetricsApi;
