//! Lifecycle operations for one metric resource.

use librato_core::{MetricSpec, ReadOutcome, RemoteMetric, validate_name};
use librato_error::{ApiError, MetricError, MetricErrorKind, MetricResult, Operation};
use librato_interface::MetricsApi;
use tracing::{debug, info, instrument, warn};

/// Translates metric specs into calls against a [`MetricsApi`].
///
/// Holds no state between calls. Each operation is one request cycle and
/// never retries; retry policy belongs to the transport.
#[derive(Debug, Clone)]
pub struct MetricResourceManager<A> {
    api: A,
}

impl<A> MetricResourceManager<A>
where
    A: MetricsApi,
{
    /// Creates a manager bound to `api`.
    pub fn new(api: A) -> Self {
        Self { api }
    }

    /// Returns the transport.
    pub fn api(&self) -> &A {
        &self.api
    }

    /// Create the metric described by `spec`.
    ///
    /// # Errors
    ///
    /// `Conflict` if the name is taken, `Validation` if the API rejects the
    /// type or composite expression, `Transport` on communication failure.
    #[instrument(
        skip(self, spec),
        fields(metric = %spec.name(), metric_type = %spec.metric_type())
    )]
    pub async fn create(&self, spec: &MetricSpec) -> MetricResult<RemoteMetric> {
        let name = spec.name();

        match self.api.get_metric(name).await {
            Ok(_) => {
                warn!("Metric already exists");
                return Err(MetricError::new(
                    MetricErrorKind::Conflict,
                    Operation::Create,
                    name,
                ));
            }
            Err(e) if e.kind.is_not_found() => {}
            Err(e) => return Err(api_failure(e, Operation::Create, name)),
        }

        let desired = RemoteMetric::from(spec);
        let created = self
            .api
            .put_metric(&desired)
            .await
            .map_err(|e| api_failure(e, Operation::Create, name))?;

        info!("Created metric");
        Ok(created)
    }

    /// Look the metric up by name.
    ///
    /// Absence is `Ok(ReadOutcome::NotFound)`. Communication failures are
    /// errors and are never reported as absence.
    #[instrument(skip(self), fields(metric = name))]
    pub async fn read(&self, name: &str) -> MetricResult<ReadOutcome> {
        check_name(name, Operation::Read)?;

        match self.api.get_metric(name).await {
            Ok(metric) => Ok(ReadOutcome::Found(metric)),
            Err(e) if e.kind.is_not_found() => {
                debug!("Metric not found");
                Ok(ReadOutcome::NotFound)
            }
            Err(e) => Err(api_failure(e, Operation::Read, name)),
        }
    }

    /// Apply the mutable fields of `spec` to the existing metric `name`.
    ///
    /// # Errors
    ///
    /// `Validation` if `spec` renames the metric or changes its type (both
    /// require replacement), `Missing` if the metric does not exist,
    /// `Transport` on communication failure.
    #[instrument(skip(self, spec), fields(metric = name))]
    pub async fn update(&self, name: &str, spec: &MetricSpec) -> MetricResult<RemoteMetric> {
        check_name(name, Operation::Update)?;

        if spec.name() != name {
            return Err(MetricError::new(
                MetricErrorKind::Validation(format!(
                    "cannot rename '{}' to '{}' in place; the name is the metric's identity",
                    name,
                    spec.name()
                )),
                Operation::Update,
                name,
            ));
        }

        let existing = match self.read(name).await {
            Ok(ReadOutcome::Found(metric)) => metric,
            Ok(ReadOutcome::NotFound) => {
                return Err(MetricError::new(
                    MetricErrorKind::Missing,
                    Operation::Update,
                    name,
                ));
            }
            Err(e) => return Err(MetricError::new(e.kind, Operation::Update, name)),
        };

        if *existing.metric_type() != spec.metric_type() {
            warn!(
                remote_type = %existing.metric_type(),
                declared_type = %spec.metric_type(),
                "Refusing in-place type change"
            );
            return Err(MetricError::new(
                MetricErrorKind::Validation(format!(
                    "type cannot change from {} to {} in place; delete and recreate instead",
                    existing.metric_type(),
                    spec.metric_type()
                )),
                Operation::Update,
                name,
            ));
        }

        let desired = RemoteMetric::from(spec);
        let updated = self
            .api
            .put_metric(&desired)
            .await
            .map_err(|e| api_failure(e, Operation::Update, name))?;

        info!("Updated metric");
        Ok(updated)
    }

    /// Delete the metric. Deleting an absent metric succeeds.
    #[instrument(skip(self), fields(metric = name))]
    pub async fn delete(&self, name: &str) -> MetricResult<()> {
        check_name(name, Operation::Delete)?;

        match self.api.delete_metric(name).await {
            Ok(()) => {
                info!("Deleted metric");
                Ok(())
            }
            Err(e) if e.kind.is_not_found() => {
                warn!("Metric already absent");
                Ok(())
            }
            Err(e) => Err(api_failure(e, Operation::Delete, name)),
        }
    }

    /// True if the metric exists.
    #[instrument(skip(self), fields(metric = name))]
    pub async fn exists(&self, name: &str) -> MetricResult<bool> {
        self.read(name)
            .await
            .map(|outcome| outcome.is_found())
            .map_err(|e| MetricError::new(e.kind, Operation::Exists, name))
    }
}

fn check_name(name: &str, operation: Operation) -> MetricResult<()> {
    validate_name(name).map_err(|e| {
        MetricError::new(
            MetricErrorKind::Validation(e.kind.to_string()),
            operation,
            name,
        )
    })
}

fn api_failure(err: ApiError, operation: Operation, name: &str) -> MetricError {
    MetricError::from_api(err.kind, operation, name)
}
