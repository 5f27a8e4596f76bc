//! Display and behaviour hints attached to a metric.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Attribute keys the catalog documents.
pub const KNOWN_ATTRIBUTES: &[&str] = &[
    "color",
    "display_max",
    "display_min",
    "display_units_long",
    "display_units_short",
    "display_stacked",
    "created_by_ua",
    "gap_detection",
    "aggregate",
    "summarize_function",
];

/// Opaque key/value attributes of a metric.
///
/// Values are passed through to the API untouched. Typed accessors exist
/// for the documented keys; anything else is kept as-is.
///
/// # Examples
///
/// ```
/// use librato_core::MetricAttributes;
///
/// let attributes = MetricAttributes::new()
///     .with("display_stacked", true)
///     .with("created_by_ua", "go-librato/0.1");
///
/// assert_eq!(attributes.display_stacked(), Some(true));
/// assert_eq!(attributes.created_by_ua(), Some("go-librato/0.1"));
/// assert_eq!(attributes.len(), 2);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MetricAttributes(BTreeMap<String, Value>);

impl MetricAttributes {
    /// Empty attribute set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(key, value);
        self
    }

    /// Insert or replace an attribute, returning the previous value.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.0.insert(key.into(), value.into())
    }

    /// Look up an attribute.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Overlay `other` onto this set; keys in `other` win.
    pub fn merge(&mut self, other: &MetricAttributes) {
        for (key, value) in &other.0 {
            self.0.insert(key.clone(), value.clone());
        }
    }

    /// Iterate attributes in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }

    /// Number of attributes.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// True when no attributes are set.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Keys that are not in [`KNOWN_ATTRIBUTES`].
    pub fn unknown_keys(&self) -> Vec<&str> {
        self.0
            .keys()
            .map(String::as_str)
            .filter(|key| !KNOWN_ATTRIBUTES.contains(key))
            .collect()
    }

    /// Whether the series should be stacked when graphed.
    pub fn display_stacked(&self) -> Option<bool> {
        self.get("display_stacked").and_then(Value::as_bool)
    }

    /// User agent of the tool that created the metric.
    pub fn created_by_ua(&self) -> Option<&str> {
        self.get_str("created_by_ua")
    }

    /// Graph colour, e.g. `#ff0000`.
    pub fn color(&self) -> Option<&str> {
        self.get_str("color")
    }

    /// Short unit label.
    pub fn display_units_short(&self) -> Option<&str> {
        self.get_str("display_units_short")
    }

    /// Long unit label.
    pub fn display_units_long(&self) -> Option<&str> {
        self.get_str("display_units_long")
    }

    /// Whether gaps in reporting are highlighted.
    pub fn gap_detection(&self) -> Option<bool> {
        self.get("gap_detection").and_then(Value::as_bool)
    }

    /// Whether server-side aggregation is enabled.
    pub fn aggregate(&self) -> Option<bool> {
        self.get("aggregate").and_then(Value::as_bool)
    }

    /// Function used when summarizing across time, e.g. `sum` or `average`.
    pub fn summarize_function(&self) -> Option<&str> {
        self.get_str("summarize_function")
    }

    fn get_str(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(Value::as_str)
    }

    /// Consume into the underlying map.
    pub fn into_inner(self) -> BTreeMap<String, Value> {
        self.0
    }
}

impl From<BTreeMap<String, Value>> for MetricAttributes {
    fn from(map: BTreeMap<String, Value>) -> Self {
        Self(map)
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for MetricAttributes {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(key, value)| (key.into(), value.into()))
                .collect(),
        )
    }
}
