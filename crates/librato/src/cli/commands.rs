//! Command-line argument definitions.

use clap::{Args, Parser, Subcommand};
use librato_resource::SettleStrategy;
use std::path::PathBuf;
use std::time::Duration;

/// Largest wait between settling checks.
const MAX_SETTLE_BACKOFF: Duration = Duration::from_secs(10);

/// Wait before the second check when polling without an explicit delay.
const DEFAULT_POLL_BACKOFF: Duration = Duration::from_millis(500);

/// Manage Librato metric definitions declaratively.
#[derive(Parser, Debug)]
#[command(name = "librato")]
#[command(about = "Declarative management of Librato metric definitions")]
#[command(version)]
pub struct Cli {
    /// Client configuration file (defaults to the user config directory)
    #[arg(short, long, global = true, env = "LIBRATO_CONFIG")]
    pub config: Option<PathBuf>,

    /// Log output format: pretty or json
    #[arg(long, global = true, default_value = "pretty")]
    pub log_format: String,

    /// Settling behaviour after mutations
    #[command(flatten)]
    pub settle: SettleArgs,

    /// Command to run
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Metric definition operations
    #[command(subcommand)]
    Metric(MetricCommand),
}

/// Operations on a single metric.
#[derive(Subcommand, Debug)]
pub enum MetricCommand {
    /// Print the remote metric as JSON
    Show {
        /// Metric name
        name: String,
    },

    /// Print whether the metric exists
    Exists {
        /// Metric name
        name: String,
    },

    /// Show what `apply` would change
    Plan {
        /// Declaration file (TOML or JSON)
        file: PathBuf,

        /// Tracked state file; defaults to tracking the declared name
        #[arg(long)]
        state: Option<PathBuf>,
    },

    /// Bring the catalog in line with a declaration
    Apply {
        /// Declaration file (TOML or JSON)
        file: PathBuf,

        /// Tracked state file, rewritten after a successful apply
        #[arg(long)]
        state: Option<PathBuf>,
    },

    /// Delete a metric (succeeds if already absent)
    Delete {
        /// Metric name
        name: String,
    },
}

/// Settling flags shared by every command.
#[derive(Args, Debug, Clone, Copy, Default)]
pub struct SettleArgs {
    /// Wait this long before re-reading after a change
    #[arg(long, global = true, env = "LIBRATO_SETTLE_DELAY_MS")]
    pub settle_delay_ms: Option<u64>,

    /// Re-read up to this many times, backing off between reads
    #[arg(long, global = true, env = "LIBRATO_SETTLE_ATTEMPTS")]
    pub settle_attempts: Option<usize>,
}

impl SettleArgs {
    /// Strategy selected by the flags.
    ///
    /// More than one attempt polls, starting at the delay. A delay alone
    /// waits once. Neither reads back immediately.
    pub fn strategy(&self) -> SettleStrategy {
        match (self.settle_attempts, self.settle_delay_ms) {
            (Some(attempts), delay) if attempts > 1 => SettleStrategy::poll(
                attempts,
                delay
                    .map(Duration::from_millis)
                    .unwrap_or(DEFAULT_POLL_BACKOFF),
                MAX_SETTLE_BACKOFF,
            ),
            (_, Some(delay)) if delay > 0 => SettleStrategy::fixed(Duration::from_millis(delay)),
            _ => SettleStrategy::Immediate,
        }
    }
}
