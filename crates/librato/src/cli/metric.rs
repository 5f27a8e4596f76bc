//! Metric command handlers.

use super::{MetricCommand, load_declaration, load_state, save_state};
use anyhow::Result;
use librato_core::ReadOutcome;
use librato_interface::MetricsApi;
use librato_resource::{Reconciler, ResourceState};
use serde_json::json;
use std::path::Path;
use tracing::{info, instrument};

/// Run a metric command, printing results to stdout.
#[instrument(skip_all)]
pub async fn handle_metric_command<A>(
    command: MetricCommand,
    reconciler: &Reconciler<A>,
) -> Result<()>
where
    A: MetricsApi,
{
    let manager = reconciler.manager();

    match command {
        MetricCommand::Show { name } => match manager.read(&name).await? {
            ReadOutcome::Found(metric) => println!("{}", serde_json::to_string_pretty(&metric)?),
            ReadOutcome::NotFound => {
                println!("Metric '{}' does not exist", name);
            }
        },
        MetricCommand::Exists { name } => {
            println!("{}", manager.exists(&name).await?);
        }
        MetricCommand::Plan { file, state } => {
            let spec = load_declaration(&file)?;
            let tracked = tracked_state(state.as_deref(), spec.name())?;
            let plan = reconciler.plan(Some(&spec), tracked.as_ref()).await?;

            let report = json!({
                "metric": spec.name(),
                "action": plan.action().to_string(),
                "drift": plan.drift().fields(),
            });
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        MetricCommand::Apply { file, state } => {
            let spec = load_declaration(&file)?;
            let tracked = tracked_state(state.as_deref(), spec.name())?;
            let outcome = reconciler.apply(Some(&spec), tracked.as_ref()).await?;

            if let Some(path) = state.as_deref() {
                save_state(path, outcome.state().as_ref())?;
            }
            info!(metric = %spec.name(), action = %outcome.action(), "Apply complete");
            println!("{}", outcome.action());
        }
        MetricCommand::Delete { name } => {
            reconciler.destroy(&ResourceState::new(name.as_str())).await?;
            println!("Deleted '{}'", name);
        }
    }

    Ok(())
}

/// State from the state file, where a missing file tracks nothing.
/// Without a state file the declared name is treated as tracked.
fn tracked_state(path: Option<&Path>, declared: &str) -> Result<Option<ResourceState>> {
    match path {
        Some(path) => load_state(path),
        None => Ok(Some(ResourceState::new(declared))),
    }
}
