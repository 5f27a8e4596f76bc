//! Librato metrics API client.

use crate::{ClientConfig, MetricBody, RetryConfig, conversions, retry_with_backoff};
use async_trait::async_trait;
use librato_core::RemoteMetric;
use librato_error::{ApiError, ApiErrorKind, ApiResult, ConfigError, ConfigErrorKind};
use librato_interface::MetricsApi;
use reqwest::{Client, RequestBuilder, Response, StatusCode, Url};
use std::path::Path;
use std::time::Duration;
use tracing::{debug, error, instrument};

/// HTTP client for `/v1/metrics/{name}`.
///
/// Authenticates with the account email and API token via basic auth.
/// Transient failures are retried according to the configured [`RetryConfig`].
#[derive(Debug, Clone)]
pub struct LibratoClient {
    http: Client,
    base_url: Url,
    email: String,
    token: String,
    retry: RetryConfig,
}

impl LibratoClient {
    /// Creates a client from explicit configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the base URL or retry settings are invalid, or the
    /// HTTP client cannot be built.
    #[instrument(skip(config), fields(base_url = %config.base_url()))]
    pub fn new(config: &ClientConfig) -> Result<Self, ConfigError> {
        config.retry().validate()?;

        let base_url = Url::parse(config.base_url()).map_err(|e| {
            ConfigError::new(ConfigErrorKind::InvalidBaseUrl {
                url: config.base_url().clone(),
                reason: e.to_string(),
            })
        })?;
        if base_url.cannot_be_a_base() {
            return Err(ConfigError::new(ConfigErrorKind::InvalidBaseUrl {
                url: config.base_url().clone(),
                reason: "URL cannot be used as a base".to_string(),
            }));
        }

        let http = Client::builder()
            .timeout(Duration::from_secs(*config.timeout_secs()))
            .user_agent(config.user_agent().as_str())
            .build()
            .map_err(|e| ConfigError::new(ConfigErrorKind::ClientBuild(e.to_string())))?;

        debug!(url = %base_url, "Created Librato client");

        Ok(Self {
            http,
            base_url,
            email: config.email().clone(),
            token: config.token().clone(),
            retry: config.retry().clone(),
        })
    }

    /// Creates a client from the layered configuration (file, then environment).
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be loaded or is incomplete.
    pub fn from_config(path: Option<&Path>) -> Result<Self, ConfigError> {
        Self::new(&ClientConfig::load(path)?)
    }

    /// Returns the API base URL.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Returns the retry configuration.
    pub fn retry_config(&self) -> &RetryConfig {
        &self.retry
    }

    /// `{base}/metrics/{name}` with the name as a single path segment.
    pub fn metric_url(&self, name: &str) -> ApiResult<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| {
                ApiError::new(ApiErrorKind::Http(format!(
                    "Base URL {} cannot hold path segments",
                    self.base_url
                )))
            })?
            .pop_if_empty()
            .push("metrics")
            .push(name);
        Ok(url)
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        request.basic_auth(&self.email, Some(&self.token))
    }

    async fn fetch_once(&self, name: &str) -> ApiResult<RemoteMetric> {
        let url = self.metric_url(name)?;
        debug!(%url, "GET metric");

        let response = send(self.authorized(self.http.get(url))).await?;
        let response = check_status(response, name).await?;
        let body: MetricBody = response.json().await.map_err(|e| {
            error!(error = ?e, "Failed to parse metric response");
            ApiError::new(ApiErrorKind::ResponseParsing(format!(
                "Failed to parse JSON: {}",
                e
            )))
        })?;

        conversions::from_metric_body(body)
    }

    async fn put_once(&self, metric: &RemoteMetric) -> ApiResult<RemoteMetric> {
        let url = self.metric_url(metric.name())?;
        let body = conversions::to_metric_body(metric);
        debug!(%url, metric_type = %body.metric_type, "PUT metric");

        let response = send(self.authorized(self.http.put(url)).json(&body)).await?;
        let response = check_status(response, metric.name()).await?;
        let text = response.text().await.map_err(|e| {
            ApiError::new(ApiErrorKind::Http(format!("Failed to read body: {}", e)))
        })?;

        // 204 No Content on update: the stored metric is what we sent.
        if text.trim().is_empty() {
            return Ok(metric.clone());
        }

        let body: MetricBody = serde_json::from_str(&text).map_err(|e| {
            ApiError::new(ApiErrorKind::ResponseParsing(format!(
                "Failed to parse JSON: {}",
                e
            )))
        })?;
        conversions::from_metric_body(body)
    }

    async fn delete_once(&self, name: &str) -> ApiResult<()> {
        let url = self.metric_url(name)?;
        debug!(%url, "DELETE metric");

        let response = send(self.authorized(self.http.delete(url))).await?;
        check_status(response, name).await?;
        Ok(())
    }
}

async fn send(request: RequestBuilder) -> ApiResult<Response> {
    request.send().await.map_err(|e| {
        error!(error = ?e, "HTTP request failed");
        ApiError::new(ApiErrorKind::Http(format!("Request failed: {}", e)))
    })
}

/// Maps non-success statuses onto [`ApiErrorKind`].
async fn check_status(response: Response, name: &str) -> ApiResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    if status == StatusCode::NOT_FOUND {
        debug!(metric = name, "Metric not found");
        return Err(ApiError::not_found(name));
    }

    let error_text = response.text().await.unwrap_or_default();
    let message = conversions::error_message(&error_text);
    error!(metric = name, status = %status, error = %message, "API error");

    Err(ApiError::new(ApiErrorKind::from_status(
        status.as_u16(),
        message,
    )))
}

#[async_trait]
impl MetricsApi for LibratoClient {
    #[instrument(skip(self), fields(metric = name))]
    async fn get_metric(&self, name: &str) -> ApiResult<RemoteMetric> {
        let this = self;
        retry_with_backoff(&self.retry, move || this.fetch_once(name)).await
    }

    #[instrument(skip(self, metric), fields(metric = %metric.name()))]
    async fn put_metric(&self, metric: &RemoteMetric) -> ApiResult<RemoteMetric> {
        let this = self;
        retry_with_backoff(&self.retry, move || this.put_once(metric)).await
    }

    #[instrument(skip(self), fields(metric = name))]
    async fn delete_metric(&self, name: &str) -> ApiResult<()> {
        let this = self;
        retry_with_backoff(&self.retry, move || this.delete_once(name)).await
    }
}
