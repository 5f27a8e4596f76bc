//! HTTP client for the Librato metrics API.
//!
//! [`LibratoClient`] implements [`librato_interface::MetricsApi`] over
//! `GET`/`PUT`/`DELETE /v1/metrics/{name}`. Configuration is layered with
//! the `config` crate: defaults, an optional TOML file, then `LIBRATO_*`
//! environment variables.

#![warn(missing_docs)]

mod client;
mod conversions;
mod dto;
mod retry;
mod settings;

pub use client::LibratoClient;
pub use dto::{ErrorBody, MetricBody};
pub use retry::{RetryConfig, retry_with_backoff};
pub use settings::{
    ClientConfig, ClientConfigBuilder, ClientConfigBuilderError, DEFAULT_BASE_URL,
    DEFAULT_TIMEOUT_SECS, ENV_PREFIX, default_config_path,
};
