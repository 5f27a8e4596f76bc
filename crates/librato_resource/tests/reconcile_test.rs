//! Tests for planning and applying declarations.

use async_trait::async_trait;
use librato_core::{MetricSpec, MetricType, RemoteMetric};
use librato_error::{ApiResult, MetricErrorKind, Operation};
use librato_interface::MetricsApi;
use librato_resource::{
    InMemoryMetricsApi, MetricResourceManager, PlannedAction, Reconciler, ResourceState,
    SettleStrategy,
};
use std::time::Duration;

const NAME: &str = "tftest-metric-plan";

fn reconciler(settle: SettleStrategy) -> (Reconciler<InMemoryMetricsApi>, InMemoryMetricsApi) {
    let api = InMemoryMetricsApi::new();
    let manager = MetricResourceManager::new(api.clone());
    (Reconciler::new(manager, settle), api)
}

fn polling() -> SettleStrategy {
    SettleStrategy::poll(5, Duration::from_millis(10), Duration::from_millis(50))
}

#[tokio::test]
async fn test_nothing_declared_nothing_tracked() {
    let (reconciler, api) = reconciler(SettleStrategy::Immediate);

    let plan = reconciler.plan(None, None).await.unwrap();

    assert_eq!(*plan.action(), PlannedAction::NoOp);
    assert_eq!(api.request_count().await, 0);
}

#[tokio::test]
async fn test_full_lifecycle() {
    let (reconciler, api) = reconciler(SettleStrategy::Immediate);
    let spec = MetricSpec::counter(NAME)
        .unwrap()
        .with_description("A test counter metric");

    // Create
    let plan = reconciler.plan(Some(&spec), None).await.unwrap();
    assert_eq!(*plan.action(), PlannedAction::Create);

    let outcome = reconciler.apply(Some(&spec), None).await.unwrap();
    assert_eq!(*outcome.action(), PlannedAction::Create);
    let state = outcome.state().clone().unwrap();
    assert_eq!(state, ResourceState::new(NAME));
    assert_eq!(
        *outcome.metric().as_ref().unwrap().metric_type(),
        MetricType::Counter
    );

    // Converged
    let outcome = reconciler.apply(Some(&spec), Some(&state)).await.unwrap();
    assert_eq!(*outcome.action(), PlannedAction::NoOp);
    assert_eq!(outcome.state().as_ref(), Some(&state));

    // Update
    let spec = spec.with_description("An updated test counter metric");
    let plan = reconciler.plan(Some(&spec), Some(&state)).await.unwrap();
    assert_eq!(*plan.action(), PlannedAction::Update);
    assert_eq!(plan.drift().fields(), vec!["description"]);

    let outcome = reconciler.apply(Some(&spec), Some(&state)).await.unwrap();
    assert_eq!(*outcome.action(), PlannedAction::Update);
    let stored = api.stored(NAME).await.unwrap();
    assert_eq!(
        stored.description().as_deref(),
        Some("An updated test counter metric")
    );

    // Destroy
    let plan = reconciler.plan(None, Some(&state)).await.unwrap();
    assert_eq!(*plan.action(), PlannedAction::Delete);

    let outcome = reconciler.apply(None, Some(&state)).await.unwrap();
    assert_eq!(*outcome.action(), PlannedAction::Delete);
    assert!(outcome.state().is_none());
    assert!(api.is_empty().await);

    let plan = reconciler.plan(None, Some(&state)).await.unwrap();
    assert_eq!(*plan.action(), PlannedAction::NoOp);
}

#[tokio::test]
async fn test_type_change_replaces() {
    let (reconciler, api) = reconciler(SettleStrategy::Immediate);
    let gauge = MetricSpec::gauge(NAME).unwrap();
    let state = reconciler
        .apply(Some(&gauge), None)
        .await
        .unwrap()
        .state()
        .clone()
        .unwrap();

    let counter = MetricSpec::counter(NAME).unwrap();
    let plan = reconciler.plan(Some(&counter), Some(&state)).await.unwrap();
    assert_eq!(*plan.action(), PlannedAction::Replace);
    assert!(plan.drift().requires_replacement());

    let outcome = reconciler.apply(Some(&counter), Some(&state)).await.unwrap();
    assert_eq!(*outcome.action(), PlannedAction::Replace);
    assert_eq!(
        *api.stored(NAME).await.unwrap().metric_type(),
        MetricType::Counter
    );
}

#[tokio::test]
async fn test_rename_replaces() {
    let (reconciler, api) = reconciler(SettleStrategy::Immediate);
    let old = MetricSpec::gauge("tftest-metric-old").unwrap();
    let state = reconciler
        .apply(Some(&old), None)
        .await
        .unwrap()
        .state()
        .clone()
        .unwrap();

    let renamed = MetricSpec::gauge("tftest-metric-new").unwrap();
    let outcome = reconciler.apply(Some(&renamed), Some(&state)).await.unwrap();

    assert_eq!(*outcome.action(), PlannedAction::Replace);
    assert_eq!(
        outcome.state().as_ref(),
        Some(&ResourceState::new("tftest-metric-new"))
    );
    assert!(api.stored("tftest-metric-old").await.is_none());
    assert!(api.stored("tftest-metric-new").await.is_some());
}

#[tokio::test]
async fn test_vanished_metric_is_recreated() {
    let (reconciler, api) = reconciler(SettleStrategy::Immediate);
    let spec = MetricSpec::gauge(NAME).unwrap();
    let state = ResourceState::new(NAME);

    let plan = reconciler.plan(Some(&spec), Some(&state)).await.unwrap();
    assert_eq!(*plan.action(), PlannedAction::Create);

    reconciler.apply(Some(&spec), Some(&state)).await.unwrap();
    assert_eq!(api.len().await, 1);
}

#[tokio::test]
async fn test_untracked_existing_metric_conflicts() {
    let (reconciler, api) = reconciler(SettleStrategy::Immediate);
    api.insert(
        RemoteMetric::builder()
            .name(NAME)
            .metric_type(MetricType::Gauge)
            .build()
            .unwrap(),
    )
    .await;
    let spec = MetricSpec::gauge(NAME).unwrap();

    let plan = reconciler.plan(Some(&spec), None).await.unwrap();
    assert_eq!(*plan.action(), PlannedAction::Create);
    assert!(plan.remote().is_some());

    let err = reconciler.apply(Some(&spec), None).await.unwrap_err();
    assert_eq!(err.kind, MetricErrorKind::Conflict);
}

#[tokio::test(start_paused = true)]
async fn test_polling_rides_out_visibility_lag() {
    let (reconciler, api) = reconciler(polling());
    api.set_visibility_lag(2).await;
    let spec = MetricSpec::gauge(NAME).unwrap();

    let outcome = reconciler.apply(Some(&spec), None).await.unwrap();
    assert_eq!(*outcome.action(), PlannedAction::Create);

    let state = outcome.state().clone().unwrap();
    reconciler.destroy(&state).await.unwrap();
    assert!(api.is_empty().await);
}

#[tokio::test]
async fn test_immediate_settle_reports_lag() {
    let (reconciler, api) = reconciler(SettleStrategy::Immediate);
    api.set_visibility_lag(2).await;
    let spec = MetricSpec::gauge(NAME).unwrap();

    let err = reconciler.apply(Some(&spec), None).await.unwrap_err();

    assert_eq!(err.kind, MetricErrorKind::NotSettled { attempts: 1 });
    assert_eq!(err.operation, Operation::Verify);
    // The write itself went through.
    assert!(api.stored(NAME).await.is_some());
}

/// Catalog that answers reads with a metric under a different name.
#[derive(Clone)]
struct RenamingApi {
    inner: InMemoryMetricsApi,
}

#[async_trait]
impl MetricsApi for RenamingApi {
    async fn get_metric(&self, name: &str) -> ApiResult<RemoteMetric> {
        let metric = self.inner.get_metric(name).await?;
        Ok(metric.with_name(format!("{}-imposter", name)))
    }

    async fn put_metric(&self, metric: &RemoteMetric) -> ApiResult<RemoteMetric> {
        self.inner.put_metric(metric).await
    }

    async fn delete_metric(&self, name: &str) -> ApiResult<()> {
        self.inner.delete_metric(name).await
    }
}

#[tokio::test]
async fn test_name_mismatch_after_apply_is_fatal() {
    let api = RenamingApi {
        inner: InMemoryMetricsApi::new(),
    };
    let reconciler = Reconciler::new(MetricResourceManager::new(api), polling());
    let spec = MetricSpec::gauge(NAME).unwrap();

    let err = reconciler.apply(Some(&spec), None).await.unwrap_err();

    assert!(err.kind.is_fatal());
    assert!(matches!(err.kind, MetricErrorKind::Integrity { .. }));
}

#[tokio::test]
async fn test_name_mismatch_during_plan_is_fatal() {
    let inner = InMemoryMetricsApi::new();
    inner
        .insert(
            RemoteMetric::builder()
                .name(NAME)
                .metric_type(MetricType::Gauge)
                .build()
                .unwrap(),
        )
        .await;
    let reconciler = Reconciler::new(
        MetricResourceManager::new(RenamingApi { inner }),
        SettleStrategy::Immediate,
    );
    let spec = MetricSpec::gauge(NAME).unwrap();

    let err = reconciler
        .plan(Some(&spec), Some(&ResourceState::new(NAME)))
        .await
        .unwrap_err();

    assert!(err.kind.is_fatal());
}
