//! In-memory metric catalog for tests and dry runs.
//!
//! Behaves like the remote catalog where the resource manager can observe
//! it: PUT creates or merges, the type of a stored metric is immutable,
//! absent names are 404s. It can also simulate replication lag and
//! transport failures.

use async_trait::async_trait;
use librato_core::{MetricType, RemoteMetric};
use librato_error::{ApiError, ApiErrorKind, ApiResult};
use librato_interface::MetricsApi;
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;

/// HashMap-backed [`MetricsApi`].
///
/// Clones share storage, so a test can keep a handle while the manager
/// owns another.
#[derive(Debug, Clone, Default)]
pub struct InMemoryMetricsApi {
    inner: Arc<RwLock<Catalog>>,
}

#[derive(Debug, Default)]
struct Catalog {
    entries: HashMap<String, Entry>,
    failures: VecDeque<ApiErrorKind>,
    visibility_lag: usize,
    requests: usize,
}

/// Stored metric plus what readers still see while a write propagates.
#[derive(Debug, Default)]
struct Entry {
    current: Option<RemoteMetric>,
    stale: Option<RemoteMetric>,
    stale_reads: usize,
}

impl Entry {
    fn visible(&mut self) -> Option<RemoteMetric> {
        if self.stale_reads > 0 {
            self.stale_reads -= 1;
            self.stale.clone()
        } else {
            self.current.clone()
        }
    }

    fn write(&mut self, next: Option<RemoteMetric>, lag: usize) {
        self.stale = self.current.take();
        self.current = next;
        self.stale_reads = lag;
    }
}

impl InMemoryMetricsApi {
    /// Create an empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// After every write, the next `reads` GETs of that name still see the
    /// previous state.
    pub async fn set_visibility_lag(&self, reads: usize) {
        self.inner.write().await.visibility_lag = reads;
    }

    /// Fail the next request with `kind`. Queued failures are consumed in order.
    pub async fn fail_next(&self, kind: ApiErrorKind) {
        self.inner.write().await.failures.push_back(kind);
    }

    /// Store `metric` directly, bypassing validation and lag.
    pub async fn insert(&self, metric: RemoteMetric) {
        let mut catalog = self.inner.write().await;
        let entry = catalog.entries.entry(metric.name().clone()).or_default();
        entry.current = Some(metric);
        entry.stale = None;
        entry.stale_reads = 0;
    }

    /// The stored metric, ignoring lag.
    pub async fn stored(&self, name: &str) -> Option<RemoteMetric> {
        self.inner
            .read()
            .await
            .entries
            .get(name)
            .and_then(|entry| entry.current.clone())
    }

    /// Number of stored metrics (for testing).
    pub async fn len(&self) -> usize {
        self.inner
            .read()
            .await
            .entries
            .values()
            .filter(|entry| entry.current.is_some())
            .count()
    }

    /// Check if the catalog is empty (for testing).
    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Total requests served, including failed ones.
    pub async fn request_count(&self) -> usize {
        self.inner.read().await.requests
    }
}

impl Catalog {
    fn begin(&mut self) -> ApiResult<()> {
        self.requests += 1;
        match self.failures.pop_front() {
            Some(kind) => Err(ApiError::new(kind)),
            None => Ok(()),
        }
    }
}

fn reject(message: impl Into<String>) -> ApiError {
    ApiError::new(ApiErrorKind::Rejected {
        status: 400,
        message: message.into(),
    })
}

/// Stand-in for server-side expression parsing: brackets and quotes must pair up.
fn balanced(expression: &str) -> bool {
    let mut open = Vec::new();
    let mut in_string = false;
    for c in expression.chars() {
        match c {
            '"' => in_string = !in_string,
            _ if in_string => {}
            '(' | '{' | '[' => open.push(c),
            ')' | '}' | ']' => {
                let expected = match c {
                    ')' => '(',
                    '}' => '{',
                    _ => '[',
                };
                if open.pop() != Some(expected) {
                    return false;
                }
            }
            _ => {}
        }
    }
    open.is_empty() && !in_string
}

#[async_trait]
impl MetricsApi for InMemoryMetricsApi {
    async fn get_metric(&self, name: &str) -> ApiResult<RemoteMetric> {
        let mut catalog = self.inner.write().await;
        catalog.begin()?;

        catalog
            .entries
            .get_mut(name)
            .and_then(Entry::visible)
            .ok_or_else(|| ApiError::not_found(name))
    }

    async fn put_metric(&self, metric: &RemoteMetric) -> ApiResult<RemoteMetric> {
        let mut catalog = self.inner.write().await;
        catalog.begin()?;

        match (metric.metric_type(), metric.composite()) {
            (MetricType::Composite, None) => {
                return Err(reject("params.composite: is required for composite metrics"));
            }
            (MetricType::Composite, Some(expression)) if expression.trim().is_empty() => {
                return Err(reject("params.composite: can't be blank"));
            }
            (MetricType::Composite, Some(expression)) if !balanced(expression) => {
                return Err(reject("params.composite: is invalid"));
            }
            (MetricType::Gauge | MetricType::Counter, Some(_)) => {
                return Err(reject("params.composite: only allowed for composite metrics"));
            }
            _ => {}
        }

        let lag = catalog.visibility_lag;
        let entry = catalog.entries.entry(metric.name().clone()).or_default();

        let stored = match &entry.current {
            Some(existing) if existing.metric_type() != metric.metric_type() => {
                return Err(reject(format!(
                    "params.type: cannot change from {} to {}",
                    existing.metric_type(),
                    metric.metric_type()
                )));
            }
            Some(existing) => {
                let mut merged = existing.clone();
                merged.merge(metric);
                merged
            }
            None => {
                let mut created = metric.clone();
                if created.period().is_none() {
                    created = created.with_period(Some(60));
                }
                created
            }
        };

        debug!(metric = %stored.name(), "Stored metric");
        entry.write(Some(stored.clone()), lag);
        Ok(stored)
    }

    async fn delete_metric(&self, name: &str) -> ApiResult<()> {
        let mut catalog = self.inner.write().await;
        catalog.begin()?;

        let lag = catalog.visibility_lag;
        match catalog.entries.get_mut(name) {
            Some(entry) if entry.current.is_some() => {
                entry.write(None, lag);
                Ok(())
            }
            _ => Err(ApiError::not_found(name)),
        }
    }
}
