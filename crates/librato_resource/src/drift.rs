//! Drift detection between a declaration and the remote catalog.

use librato_core::{MetricSpec, RemoteMetric};
use librato_error::{MetricError, MetricErrorKind, MetricResult, Operation};
use serde_json::Value;

/// Field of a metric that can drift.
#[derive(Debug, Clone, PartialEq, Eq, Hash, derive_more::Display)]
pub enum DriftField {
    /// Metric type
    #[display("type")]
    Type,
    /// Description
    #[display("description")]
    Description,
    /// Display name
    #[display("display_name")]
    DisplayName,
    /// Reporting period
    #[display("period")]
    Period,
    /// Composite expression
    #[display("composite")]
    Composite,
    /// One attribute key
    #[display("attributes.{}", _0)]
    Attribute(String),
}

/// One declared value that the catalog does not reflect.
#[derive(Debug, Clone, PartialEq, derive_getters::Getters)]
pub struct FieldDrift {
    /// Which field differs
    field: DriftField,
    /// Declared value
    declared: Value,
    /// Value the catalog reported (`null` when absent)
    observed: Value,
}

/// Differences between a declaration and the catalog.
#[derive(Debug, Clone, PartialEq, Default, derive_getters::Getters)]
pub struct DriftReport {
    /// Drifted fields, in declaration order
    differences: Vec<FieldDrift>,
}

impl DriftReport {
    /// True when the catalog matches every declared field.
    pub fn is_clean(&self) -> bool {
        self.differences.is_empty()
    }

    /// True when the metric type differs, which needs a replacement.
    pub fn requires_replacement(&self) -> bool {
        self.differences
            .iter()
            .any(|drift| drift.field == DriftField::Type)
    }

    /// Drifted field names, e.g. `["description", "attributes.color"]`.
    pub fn fields(&self) -> Vec<String> {
        self.differences
            .iter()
            .map(|drift| drift.field.to_string())
            .collect()
    }

    fn record(&mut self, field: DriftField, declared: Value, observed: Value) {
        if declared != observed {
            self.differences.push(FieldDrift {
                field,
                declared,
                observed,
            });
        }
    }
}

/// Compare `remote` against `spec`.
///
/// Only fields the declaration sets are compared; values the server fills
/// in for unset fields are not drift. The type is always compared.
///
/// # Errors
///
/// `Integrity` when the catalog returned a metric with a different name.
/// The name is the only correlation key, so nothing else can be trusted.
pub fn detect_drift(spec: &MetricSpec, remote: &RemoteMetric) -> MetricResult<DriftReport> {
    if remote.name() != spec.name() {
        return Err(MetricError::new(
            MetricErrorKind::Integrity {
                expected: spec.name().clone(),
                actual: remote.name().clone(),
            },
            Operation::Verify,
            spec.name(),
        ));
    }

    let mut report = DriftReport::default();

    report.record(
        DriftField::Type,
        Value::from(spec.metric_type().to_string()),
        Value::from(remote.metric_type().to_string()),
    );

    if let Some(description) = spec.description() {
        report.record(
            DriftField::Description,
            Value::from(description.as_str()),
            optional(remote.description().as_deref()),
        );
    }

    if let Some(display_name) = spec.display_name() {
        report.record(
            DriftField::DisplayName,
            Value::from(display_name.as_str()),
            optional(remote.display_name().as_deref()),
        );
    }

    if let Some(period) = spec.period() {
        report.record(
            DriftField::Period,
            Value::from(*period),
            remote.period().map(Value::from).unwrap_or(Value::Null),
        );
    }

    if let Some(expression) = spec.kind().expression() {
        report.record(
            DriftField::Composite,
            Value::from(expression),
            optional(remote.composite().as_deref()),
        );
    }

    for (key, declared) in spec.attributes().iter() {
        let observed = remote.attributes().get(key).cloned().unwrap_or(Value::Null);
        report.record(DriftField::Attribute(key.clone()), declared.clone(), observed);
    }

    Ok(report)
}

fn optional(value: Option<&str>) -> Value {
    value.map(Value::from).unwrap_or(Value::Null)
}
