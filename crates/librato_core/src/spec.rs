//! Declarative metric definitions.

use crate::{MetricAttributes, MetricKind, MetricType, validate_name};
use derive_getters::Getters;
use librato_error::{SpecError, SpecErrorKind};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Desired state of one metric.
///
/// The name is the only key correlating a declaration with the remote
/// catalog. Every built `MetricSpec` has a valid name, and a composite
/// expression only when it is a composite metric.
///
/// # Examples
///
/// ```
/// use librato_core::{MetricKind, MetricSpec, MetricType};
///
/// let spec = MetricSpec::builder()
///     .name("tftest-metric-xyz")
///     .kind(MetricKind::composite(
///         r#"s("librato.cpu.percent.user", {"environment":"prod"})"#,
///     ))
///     .description("A test composite metric")
///     .build()
///     .unwrap();
///
/// assert_eq!(spec.metric_type(), MetricType::Composite);
/// assert!(spec.kind().expression().unwrap().contains("environment"));
/// ```
#[derive(
    Debug,
    Clone,
    PartialEq,
    Getters,
    derive_builder::Builder,
    Serialize,
    Deserialize,
)]
#[builder(setter(into), build_fn(validate = "Self::validate"))]
#[serde(try_from = "MetricDeclaration", into = "MetricDeclaration")]
pub struct MetricSpec {
    /// Unique metric name, also the remote key
    name: String,
    /// Type and type-specific payload
    kind: MetricKind,
    /// Free-text description
    #[builder(default, setter(strip_option))]
    description: Option<String>,
    /// Human-friendly name shown in the UI
    #[builder(default, setter(strip_option))]
    display_name: Option<String>,
    /// Expected reporting interval in seconds
    #[builder(default, setter(strip_option))]
    period: Option<u32>,
    /// Pass-through display and behaviour hints
    #[builder(default)]
    attributes: MetricAttributes,
}

impl MetricSpec {
    /// Returns a builder for constructing a MetricSpec.
    pub fn builder() -> MetricSpecBuilder {
        MetricSpecBuilder::default()
    }

    /// Gauge with no optional fields.
    pub fn gauge(name: impl Into<String>) -> Result<Self, SpecError> {
        Self::bare(name.into(), MetricKind::Gauge)
    }

    /// Counter with no optional fields.
    pub fn counter(name: impl Into<String>) -> Result<Self, SpecError> {
        Self::bare(name.into(), MetricKind::Counter)
    }

    /// Composite with no optional fields.
    pub fn composite(
        name: impl Into<String>,
        expression: impl Into<String>,
    ) -> Result<Self, SpecError> {
        Self::bare(name.into(), MetricKind::composite(expression))
    }

    fn bare(name: String, kind: MetricKind) -> Result<Self, SpecError> {
        validate_name(&name)?;
        check_kind(&kind)?;
        Ok(Self {
            name,
            kind,
            description: None,
            display_name: None,
            period: None,
            attributes: MetricAttributes::default(),
        })
    }

    /// The flat type discriminant.
    pub fn metric_type(&self) -> MetricType {
        self.kind.metric_type()
    }

    /// Copy of this spec with a different description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Copy of this spec with different attributes.
    pub fn with_attributes(mut self, attributes: MetricAttributes) -> Self {
        self.attributes = attributes;
        self
    }
}

impl MetricSpecBuilder {
    fn validate(&self) -> Result<(), String> {
        if let Some(name) = &self.name {
            validate_name(name).map_err(|e| e.kind.to_string())?;
        }
        if let Some(kind) = &self.kind {
            check_kind(kind).map_err(|e| e.kind.to_string())?;
        }
        if let Some(Some(0)) = self.period {
            return Err(SpecErrorKind::ZeroPeriod.to_string());
        }
        Ok(())
    }
}

fn check_kind(kind: &MetricKind) -> Result<(), SpecError> {
    match kind {
        MetricKind::Composite { expression } if expression.trim().is_empty() => {
            Err(SpecError::new(SpecErrorKind::MissingComposite))
        }
        _ => Ok(()),
    }
}

/// The flat declarative block, as written in configuration files.
///
/// ```toml
/// name = "tftest-metric-abc123"
/// type = "counter"
/// description = "A test counter metric"
///
/// [attributes]
/// display_stacked = true
/// created_by_ua = "go-librato/0.1"
/// ```
///
/// Convert to a [`MetricSpec`] with `TryFrom`; that is where the invariants
/// of the flat form get checked.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricDeclaration {
    /// Metric name
    pub name: String,
    /// One of `gauge`, `counter`, `composite`
    #[serde(rename = "type")]
    pub metric_type: String,
    /// Free-text description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Human-friendly name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    /// Reporting interval in seconds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub period: Option<u32>,
    /// Composite expression; composite metrics only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub composite: Option<String>,
    /// Display and behaviour hints
    #[serde(default, skip_serializing_if = "MetricAttributes::is_empty")]
    pub attributes: MetricAttributes,
}

impl TryFrom<MetricDeclaration> for MetricSpec {
    type Error = SpecError;

    fn try_from(declaration: MetricDeclaration) -> Result<Self, Self::Error> {
        validate_name(&declaration.name)?;

        let metric_type = MetricType::from_str(&declaration.metric_type).map_err(|_| {
            SpecError::new(SpecErrorKind::UnknownType(declaration.metric_type.clone()))
        })?;

        let kind = match (metric_type, declaration.composite) {
            (MetricType::Composite, Some(expression)) if !expression.trim().is_empty() => {
                MetricKind::Composite { expression }
            }
            (MetricType::Composite, _) => {
                return Err(SpecError::new(SpecErrorKind::MissingComposite));
            }
            (other, Some(_)) => {
                return Err(SpecError::new(SpecErrorKind::UnexpectedComposite(
                    other.to_string(),
                )));
            }
            (MetricType::Gauge, None) => MetricKind::Gauge,
            (MetricType::Counter, None) => MetricKind::Counter,
        };

        if declaration.period == Some(0) {
            return Err(SpecError::new(SpecErrorKind::ZeroPeriod));
        }

        Ok(MetricSpec {
            name: declaration.name,
            kind,
            description: declaration.description,
            display_name: declaration.display_name,
            period: declaration.period,
            attributes: declaration.attributes,
        })
    }
}

impl From<MetricSpec> for MetricDeclaration {
    fn from(spec: MetricSpec) -> Self {
        let metric_type = spec.metric_type().to_string();
        let composite = match spec.kind {
            MetricKind::Composite { expression } => Some(expression),
            _ => None,
        };
        Self {
            name: spec.name,
            metric_type,
            description: spec.description,
            display_name: spec.display_name,
            period: spec.period,
            composite,
            attributes: spec.attributes,
        }
    }
}
