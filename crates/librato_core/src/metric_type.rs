//! Metric type discriminant and the type-specific payload.

use serde::{Deserialize, Serialize};

/// The three kinds of metric the catalog knows.
///
/// # Examples
///
/// ```
/// use librato_core::MetricType;
/// use std::str::FromStr;
///
/// assert_eq!(MetricType::from_str("counter").unwrap(), MetricType::Counter);
/// assert_eq!(MetricType::Composite.to_string(), "composite");
/// assert!(MetricType::from_str("histogram").is_err());
/// ```
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
    strum::EnumIter,
    strum::AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum MetricType {
    /// Point-in-time measurement
    Gauge,
    /// Monotonically increasing count
    Counter,
    /// Expression computed over other metrics
    Composite,
}

/// Type-specific part of a metric definition.
///
/// Only the composite variant can hold an expression, so a gauge or counter
/// with a composite expression cannot be built.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum MetricKind {
    /// A gauge metric
    Gauge,
    /// A counter metric
    Counter,
    /// A composite metric and its expression, e.g.
    /// `s("librato.cpu.percent.user", {"environment": "prod"})`
    Composite {
        /// Composite expression, validated by the API
        expression: String,
    },
}

impl MetricKind {
    /// Composite kind with the given expression.
    pub fn composite(expression: impl Into<String>) -> Self {
        MetricKind::Composite {
            expression: expression.into(),
        }
    }

    /// The flat discriminant used on the wire.
    pub fn metric_type(&self) -> MetricType {
        match self {
            MetricKind::Gauge => MetricType::Gauge,
            MetricKind::Counter => MetricType::Counter,
            MetricKind::Composite { .. } => MetricType::Composite,
        }
    }

    /// The composite expression, if this is a composite metric.
    pub fn expression(&self) -> Option<&str> {
        match self {
            MetricKind::Composite { expression } => Some(expression),
            _ => None,
        }
    }
}

impl From<&MetricKind> for MetricType {
    fn from(kind: &MetricKind) -> Self {
        kind.metric_type()
    }
}
