//! Wire format of the Librato metrics API.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A metric as sent to and returned by `/v1/metrics/{name}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricBody {
    /// Metric name
    pub name: String,
    /// `gauge`, `counter` or `composite`
    #[serde(rename = "type")]
    pub metric_type: String,
    /// Human-friendly name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    /// Free-text description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Reporting interval in seconds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub period: Option<u32>,
    /// Composite expression
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub composite: Option<String>,
    /// Display and behaviour hints; the API may send `null`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attributes: Option<Map<String, Value>>,
}

/// Error envelope, e.g. `{"errors": {"params": {"type": ["is not included in the list"]}}}`.
#[derive(Debug, Clone, Deserialize)]
pub struct ErrorBody {
    /// Nested error messages
    pub errors: Value,
}
