//! Task sync daemon
//!
//! Keeps a Qdrant collection of task embeddings in step with the task
//! table: a full reindex at startup, then the table's change stream.
//!
//! # Usage
//!
//! ```bash
//! tasksync run [--skip-bulk-load]
//! tasksync reindex
//! tasksync config
//! ```
//!
//! # Configuration
//!
//! Configuration is loaded in order (later sources override earlier):
//! 1. Built-in defaults
//! 2. Config file (`<config dir>/task-sync/config.toml`)
//! 3. `--config` file
//! 4. Environment variables (`TASKSYNC_*`, `__` between sections)
//! 5. CLI flags

use anyhow::Result;
use clap::Parser;

use tasksync_daemon::{reindex, run_sync, show_config, Cli, Commands};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Run { skip_bulk_load } => {
            run_sync(
                cli.config.as_deref(),
                cli.log_level.as_deref(),
                skip_bulk_load,
            )
            .await?;
        }
        Commands::Reindex => {
            reindex(cli.config.as_deref(), cli.log_level.as_deref()).await?;
        }
        Commands::Config => {
            show_config(cli.config.as_deref(), cli.log_level.as_deref())?;
        }
    }

    Ok(())
}
