//! Conversions between catalog records and the wire format.

use crate::dto::{ErrorBody, MetricBody};
use librato_core::{MetricAttributes, MetricType, RemoteMetric};
use librato_error::{ApiError, ApiErrorKind, ApiResult};
use serde_json::Value;
use std::str::FromStr;

/// Converts a metric record into the request body.
pub fn to_metric_body(metric: &RemoteMetric) -> MetricBody {
    let attributes = if metric.attributes().is_empty() {
        None
    } else {
        Some(
            metric
                .attributes()
                .iter()
                .map(|(key, value)| (key.clone(), value.clone()))
                .collect(),
        )
    };

    MetricBody {
        name: metric.name().clone(),
        metric_type: metric.metric_type().to_string(),
        display_name: metric.display_name().clone(),
        description: metric.description().clone(),
        period: *metric.period(),
        composite: metric.composite().clone(),
        attributes,
    }
}

/// Converts a response body into a metric record.
pub fn from_metric_body(body: MetricBody) -> ApiResult<RemoteMetric> {
    let metric_type = MetricType::from_str(&body.metric_type).map_err(|_| {
        ApiError::new(ApiErrorKind::ResponseParsing(format!(
            "Unknown metric type '{}' for metric '{}'",
            body.metric_type, body.name
        )))
    })?;

    let attributes: MetricAttributes = body.attributes.unwrap_or_default().into_iter().collect();

    let mut builder = RemoteMetric::builder();
    builder
        .name(body.name)
        .metric_type(metric_type)
        .attributes(attributes);
    if let Some(description) = body.description {
        builder.description(description);
    }
    if let Some(display_name) = body.display_name {
        builder.display_name(display_name);
    }
    if let Some(period) = body.period {
        builder.period(period);
    }
    if let Some(composite) = body.composite {
        builder.composite(composite);
    }

    builder.build().map_err(|e| {
        ApiError::new(ApiErrorKind::ResponseParsing(format!(
            "Failed to build metric: {}",
            e
        )))
    })
}

/// Extracts a readable message from an error response body.
///
/// Falls back to the raw text when the body is not the API's error envelope.
pub fn error_message(body: &str) -> String {
    match serde_json::from_str::<ErrorBody>(body) {
        Ok(envelope) => {
            let mut messages = Vec::new();
            flatten_errors("", &envelope.errors, &mut messages);
            if messages.is_empty() {
                body.trim().to_string()
            } else {
                messages.join("; ")
            }
        }
        Err(_) => body.trim().to_string(),
    }
}

fn flatten_errors(path: &str, value: &Value, out: &mut Vec<String>) {
    match value {
        Value::Object(map) => {
            for (key, nested) in map {
                let nested_path = if path.is_empty() {
                    key.clone()
                } else {
                    format!("{}.{}", path, key)
                };
                flatten_errors(&nested_path, nested, out);
            }
        }
        Value::Array(items) => {
            for item in items {
                flatten_errors(path, item, out);
            }
        }
        Value::String(message) if path.is_empty() => out.push(message.clone()),
        Value::String(message) => out.push(format!("{}: {}", path, message)),
        Value::Null => {}
        other => out.push(format!("{}: {}", path, other)),
    }
}
