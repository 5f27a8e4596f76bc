//! Declaration and state files.

use anyhow::{Context, Result};
use librato_core::MetricSpec;
use librato_resource::ResourceState;
use std::path::Path;
use tracing::{debug, instrument};

/// Load a metric declaration from a TOML or JSON file.
///
/// Files ending in `.json` are parsed as JSON, anything else as TOML.
#[instrument(fields(path = %path.display()))]
pub fn load_declaration(path: &Path) -> Result<MetricSpec> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read declaration {}", path.display()))?;

    let spec: MetricSpec = if path.extension().is_some_and(|ext| ext == "json") {
        serde_json::from_str(&content)
            .with_context(|| format!("Invalid declaration in {}", path.display()))?
    } else {
        toml::from_str(&content)
            .with_context(|| format!("Invalid declaration in {}", path.display()))?
    };

    debug!(metric = %spec.name(), metric_type = %spec.metric_type(), "Loaded declaration");
    Ok(spec)
}

/// Load tracked state. A missing file means nothing is tracked.
#[instrument(fields(path = %path.display()))]
pub fn load_state(path: &Path) -> Result<Option<ResourceState>> {
    if !path.exists() {
        debug!("No state file");
        return Ok(None);
    }

    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read state {}", path.display()))?;
    let state = serde_json::from_str(&content)
        .with_context(|| format!("Invalid state in {}", path.display()))?;
    Ok(Some(state))
}

/// Persist tracked state; `None` removes the file.
#[instrument(skip(state), fields(path = %path.display()))]
pub fn save_state(path: &Path, state: Option<&ResourceState>) -> Result<()> {
    match state {
        Some(state) => {
            let content = serde_json::to_string_pretty(state)?;
            std::fs::write(path, content)
                .with_context(|| format!("Failed to write state {}", path.display()))?;
            debug!(metric = %state.name(), "Saved state");
        }
        None if path.exists() => {
            std::fs::remove_file(path)
                .with_context(|| format!("Failed to remove state {}", path.display()))?;
            debug!("Removed state");
        }
        None => {}
    }
    Ok(())
}
