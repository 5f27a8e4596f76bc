//! Metrics as the remote catalog reports them.

use crate::{MetricAttributes, MetricSpec, MetricType};
use derive_getters::Getters;
use serde::{Deserialize, Serialize};

/// A metric definition as stored in the remote catalog.
///
/// Also used as the full desired representation sent on create and update.
#[derive(
    Debug,
    Clone,
    PartialEq,
    Serialize,
    Deserialize,
    Getters,
    derive_setters::Setters,
    derive_builder::Builder,
)]
#[setters(prefix = "with_")]
#[builder(setter(into))]
pub struct RemoteMetric {
    /// Metric name
    name: String,
    /// Metric type
    #[serde(rename = "type")]
    metric_type: MetricType,
    /// Free-text description
    #[builder(default, setter(strip_option))]
    #[serde(default)]
    description: Option<String>,
    /// Human-friendly name
    #[builder(default, setter(strip_option))]
    #[serde(default)]
    display_name: Option<String>,
    /// Reporting interval in seconds
    #[builder(default, setter(strip_option))]
    #[serde(default)]
    period: Option<u32>,
    /// Composite expression
    #[builder(default, setter(strip_option))]
    #[serde(default)]
    composite: Option<String>,
    /// Display and behaviour hints
    #[builder(default)]
    #[serde(default)]
    attributes: MetricAttributes,
}

impl RemoteMetric {
    /// Returns a builder for constructing a RemoteMetric.
    pub fn builder() -> RemoteMetricBuilder {
        RemoteMetricBuilder::default()
    }

    /// Fold the fields set in `update` into this metric.
    ///
    /// Unset optional fields keep their current value and attribute keys
    /// are overlaid, which is how the catalog treats a PUT.
    pub fn merge(&mut self, update: &RemoteMetric) {
        self.metric_type = update.metric_type;
        if update.description.is_some() {
            self.description = update.description.clone();
        }
        if update.display_name.is_some() {
            self.display_name = update.display_name.clone();
        }
        if update.period.is_some() {
            self.period = update.period;
        }
        if update.composite.is_some() {
            self.composite = update.composite.clone();
        }
        self.attributes.merge(&update.attributes);
    }
}

impl From<&MetricSpec> for RemoteMetric {
    fn from(spec: &MetricSpec) -> Self {
        Self {
            name: spec.name().clone(),
            metric_type: spec.metric_type(),
            description: spec.description().clone(),
            display_name: spec.display_name().clone(),
            period: *spec.period(),
            composite: spec.kind().expression().map(str::to_string),
            attributes: spec.attributes().clone(),
        }
    }
}

/// Result of looking a metric up by name.
///
/// Absence is a normal outcome, distinct from a failed lookup.
#[derive(Debug, Clone, PartialEq)]
pub enum ReadOutcome {
    /// The catalog has the metric
    Found(RemoteMetric),
    /// The catalog has no metric with that name
    NotFound,
}

impl ReadOutcome {
    /// True if the metric exists.
    pub fn is_found(&self) -> bool {
        matches!(self, ReadOutcome::Found(_))
    }

    /// Borrow the metric, if found.
    pub fn as_metric(&self) -> Option<&RemoteMetric> {
        match self {
            ReadOutcome::Found(metric) => Some(metric),
            ReadOutcome::NotFound => None,
        }
    }

    /// Convert into an `Option`.
    pub fn into_option(self) -> Option<RemoteMetric> {
        match self {
            ReadOutcome::Found(metric) => Some(metric),
            ReadOutcome::NotFound => None,
        }
    }
}

impl From<Option<RemoteMetric>> for ReadOutcome {
    fn from(metric: Option<RemoteMetric>) -> Self {
        match metric {
            Some(metric) => ReadOutcome::Found(metric),
            None => ReadOutcome::NotFound,
        }
    }
}
