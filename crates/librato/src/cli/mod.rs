//! Command-line interface module.
//!
//! This module provides the CLI structure and command handlers for the librato binary.

mod commands;
mod declaration;
mod metric;

pub use commands::{Cli, Commands, MetricCommand, SettleArgs};
pub use declaration::{load_declaration, load_state, save_state};
pub use metric::handle_metric_command;
