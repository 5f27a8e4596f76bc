//! Transport seam between the resource manager and the metric catalog.

use async_trait::async_trait;
use librato_core::RemoteMetric;
use librato_error::ApiResult;
use std::sync::Arc;

/// Remote metric catalog addressed by metric name.
///
/// Each method is a single logical request. Implementations own retry
/// policy and connection reuse; callers never retry on top of them.
/// Absence is reported as an error whose kind is `ApiErrorKind::NotFound`.
#[async_trait]
pub trait MetricsApi: Send + Sync {
    /// Fetch the metric called `name`.
    async fn get_metric(&self, name: &str) -> ApiResult<RemoteMetric>;

    /// Create or update `metric`, keyed by its name.
    ///
    /// Returns the stored representation, including server defaults when
    /// the API reports them.
    async fn put_metric(&self, metric: &RemoteMetric) -> ApiResult<RemoteMetric>;

    /// Delete the metric called `name`.
    async fn delete_metric(&self, name: &str) -> ApiResult<()>;
}

#[async_trait]
impl<T> MetricsApi for Arc<T>
where
    T: MetricsApi + ?Sized,
{
    async fn get_metric(&self, name: &str) -> ApiResult<RemoteMetric> {
        (**self).get_metric(name).await
    }

    async fn put_metric(&self, metric: &RemoteMetric) -> ApiResult<RemoteMetric> {
        (**self).put_metric(metric).await
    }

    async fn delete_metric(&self, name: &str) -> ApiResult<()> {
        (**self).delete_metric(name).await
    }
}
