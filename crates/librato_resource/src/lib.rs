//! Lifecycle management for Librato metric resources.
//!
//! [`MetricResourceManager`] performs single create, read, update, delete
//! and exists calls. [`Reconciler`] layers planning, settling and drift
//! verification on top, the way a declarative orchestrator drives it.
//! [`InMemoryMetricsApi`] stands in for the remote catalog in tests.

#![warn(missing_docs)]

mod drift;
mod in_memory;
mod manager;
mod reconcile;
mod settle;

pub use drift::{DriftField, DriftReport, FieldDrift, detect_drift};
pub use in_memory::InMemoryMetricsApi;
pub use manager::MetricResourceManager;
pub use reconcile::{ApplyOutcome, Plan, PlannedAction, Reconciler, ResourceState};
pub use settle::SettleStrategy;
