//! CLI argument parsing for the sync daemon.
//!
//! CLI flags override every other configuration source.

use clap::{Parser, Subcommand};

/// Task sync daemon
///
/// Keeps a vector index of tasks in step with the relational table,
/// driven by the table's change stream.
#[derive(Parser, Debug)]
#[command(name = "tasksync")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to config file (overrides the default config.toml location)
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    /// Set log level (trace, debug, info, warn, error)
    #[arg(short, long, global = true)]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Reindex every task, then apply change events until SIGINT/SIGTERM
    Run {
        /// Start consuming changes without the initial reindex
        #[arg(long)]
        skip_bulk_load: bool,
    },

    /// Reindex every task once and exit
    Reindex,

    /// Print the effective configuration with secrets redacted
    Config,
}
