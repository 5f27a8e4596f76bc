//! Plan and apply a declaration against the remote catalog.

use crate::{DriftReport, MetricResourceManager, SettleStrategy, detect_drift};
use derive_getters::Getters;
use librato_core::{MetricSpec, ReadOutcome, RemoteMetric};
use librato_error::{MetricResult, Operation};
use librato_interface::MetricsApi;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

/// What the orchestrator remembers about a managed metric between runs.
///
/// The name is the only correlation key; everything else is re-read.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Getters)]
pub struct ResourceState {
    /// Name of the tracked metric
    name: String,
}

impl ResourceState {
    /// Track the metric called `name`.
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

impl From<&RemoteMetric> for ResourceState {
    fn from(metric: &RemoteMetric) -> Self {
        Self::new(metric.name().clone())
    }
}

/// Change needed to bring the catalog in line with a declaration.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
    strum::AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum PlannedAction {
    /// Metric is absent and declared
    Create,
    /// Mutable fields drifted
    Update,
    /// Type or name changed: delete, then create
    Replace,
    /// Declaration removed
    Delete,
    /// Catalog already matches
    NoOp,
}

/// A planned action and the observations that led to it.
#[derive(Debug, Clone, PartialEq, Getters)]
pub struct Plan {
    /// Action to take
    action: PlannedAction,
    /// Drift between the declaration and the remote metric, if both exist
    drift: DriftReport,
    /// Remote metric the plan was computed against
    remote: Option<RemoteMetric>,
}

impl Plan {
    fn new(action: PlannedAction, drift: DriftReport, remote: Option<RemoteMetric>) -> Self {
        Self {
            action,
            drift,
            remote,
        }
    }
}

/// Result of [`Reconciler::apply`].
#[derive(Debug, Clone, PartialEq, Getters)]
pub struct ApplyOutcome {
    /// Action that was executed
    action: PlannedAction,
    /// State for the caller to persist; `None` once the metric is destroyed
    state: Option<ResourceState>,
    /// Metric as verified after the change
    metric: Option<RemoteMetric>,
}

/// Orchestrates lifecycle calls for one declaration at a time.
///
/// Every mutation is followed by a settling wait and a verifying read, so
/// the returned state reflects what the catalog actually holds.
#[derive(Debug, Clone)]
pub struct Reconciler<A> {
    manager: MetricResourceManager<A>,
    settle: SettleStrategy,
}

impl<A> Reconciler<A>
where
    A: MetricsApi,
{
    /// Creates a reconciler over `manager`, waiting per `settle`.
    pub fn new(manager: MetricResourceManager<A>, settle: SettleStrategy) -> Self {
        Self { manager, settle }
    }

    /// Returns the underlying manager.
    pub fn manager(&self) -> &MetricResourceManager<A> {
        &self.manager
    }

    /// Returns the settling strategy.
    pub fn settle_strategy(&self) -> &SettleStrategy {
        &self.settle
    }

    /// Decide what `apply` would do, without mutating anything.
    ///
    /// # Errors
    ///
    /// Read failures, and `Integrity` if the catalog answers with another name.
    #[instrument(
        skip(self, declared, state),
        fields(
            declared = declared.map(|spec| spec.name().as_str()),
            tracked = state.map(|state| state.name().as_str())
        )
    )]
    pub async fn plan(
        &self,
        declared: Option<&MetricSpec>,
        state: Option<&ResourceState>,
    ) -> MetricResult<Plan> {
        let plan = match (declared, state) {
            (None, None) => Plan::new(PlannedAction::NoOp, DriftReport::default(), None),
            (None, Some(state)) => match self.manager.read(state.name()).await? {
                ReadOutcome::Found(remote) => {
                    Plan::new(PlannedAction::Delete, DriftReport::default(), Some(remote))
                }
                ReadOutcome::NotFound => {
                    Plan::new(PlannedAction::NoOp, DriftReport::default(), None)
                }
            },
            (Some(spec), Some(state)) if state.name() != spec.name() => {
                let remote = self.manager.read(state.name()).await?.into_option();
                Plan::new(PlannedAction::Replace, DriftReport::default(), remote)
            }
            (Some(spec), state) => match self.manager.read(spec.name()).await? {
                // Untracked but present: creating reports the conflict.
                ReadOutcome::Found(remote) if state.is_none() => {
                    Plan::new(PlannedAction::Create, DriftReport::default(), Some(remote))
                }
                ReadOutcome::Found(remote) => {
                    let drift = detect_drift(spec, &remote)?;
                    let action = if drift.requires_replacement() {
                        PlannedAction::Replace
                    } else if drift.is_clean() {
                        PlannedAction::NoOp
                    } else {
                        PlannedAction::Update
                    };
                    Plan::new(action, drift, Some(remote))
                }
                ReadOutcome::NotFound => {
                    Plan::new(PlannedAction::Create, DriftReport::default(), None)
                }
            },
        };

        debug!(action = %plan.action, drifted = ?plan.drift.fields(), "Planned");
        Ok(plan)
    }

    /// Bring the catalog in line with `declared`.
    ///
    /// # Errors
    ///
    /// Any lifecycle error, `NotSettled` if the change never became
    /// visible, `Integrity` if the catalog answers with another name.
    #[instrument(
        skip(self, declared, state),
        fields(
            declared = declared.map(|spec| spec.name().as_str()),
            tracked = state.map(|state| state.name().as_str())
        )
    )]
    pub async fn apply(
        &self,
        declared: Option<&MetricSpec>,
        state: Option<&ResourceState>,
    ) -> MetricResult<ApplyOutcome> {
        let plan = self.plan(declared, state).await?;
        let action = plan.action;

        let metric = match (action, declared) {
            (PlannedAction::NoOp, _) => {
                return Ok(ApplyOutcome {
                    action,
                    state: plan.remote.as_ref().map(ResourceState::from),
                    metric: plan.remote,
                });
            }
            (PlannedAction::Delete, _) | (_, None) => {
                if let Some(state) = state {
                    self.destroy(state).await?;
                }
                return Ok(ApplyOutcome {
                    action: PlannedAction::Delete,
                    state: None,
                    metric: None,
                });
            }
            (PlannedAction::Create, Some(spec)) => {
                self.manager.create(spec).await?;
                self.converge(spec).await?
            }
            (PlannedAction::Update, Some(spec)) => {
                self.manager.update(spec.name(), spec).await?;
                self.converge(spec).await?
            }
            (PlannedAction::Replace, Some(spec)) => {
                let old_name = state.map(|s| s.name().as_str()).unwrap_or(spec.name().as_str());
                self.manager.delete(old_name).await?;
                self.await_absence(old_name, Operation::Delete).await?;
                self.manager.create(spec).await?;
                self.converge(spec).await?
            }
        };

        info!(%action, metric = %metric.name(), "Applied");
        Ok(ApplyOutcome {
            action,
            state: Some(ResourceState::from(&metric)),
            metric: Some(metric),
        })
    }

    /// Delete the tracked metric and wait until the catalog reports it gone.
    #[instrument(skip(self, state), fields(metric = %state.name()))]
    pub async fn destroy(&self, state: &ResourceState) -> MetricResult<()> {
        self.manager.delete(state.name()).await?;
        self.await_absence(state.name(), Operation::Delete).await
    }

    /// Re-read until the catalog matches every declared field.
    async fn converge(&self, spec: &MetricSpec) -> MetricResult<RemoteMetric> {
        let manager = &self.manager;
        self.settle
            .settle(Operation::Verify, spec.name(), move || converged(manager, spec))
            .await
    }

    async fn await_absence(&self, name: &str, operation: Operation) -> MetricResult<()> {
        let manager = &self.manager;
        self.settle
            .settle(operation, name, move || absent(manager, name))
            .await
    }
}

async fn converged<A: MetricsApi>(
    manager: &MetricResourceManager<A>,
    spec: &MetricSpec,
) -> MetricResult<Option<RemoteMetric>> {
    match manager.read(spec.name()).await? {
        ReadOutcome::Found(remote) => {
            let drift = detect_drift(spec, &remote)?;
            if drift.is_clean() {
                Ok(Some(remote))
            } else {
                debug!(drifted = ?drift.fields(), "Catalog still drifted");
                Ok(None)
            }
        }
        ReadOutcome::NotFound => Ok(None),
    }
}

async fn absent<A: MetricsApi>(
    manager: &MetricResourceManager<A>,
    name: &str,
) -> MetricResult<Option<()>> {
    Ok(match manager.read(name).await? {
        ReadOutcome::Found(_) => None,
        ReadOutcome::NotFound => Some(()),
    })
}
