//! Task sync daemon library exports.
//!
//! # Modules
//!
//! - `cli`: Command-line argument parsing with clap
//! - `commands`: Command implementations (run, reindex, config)
//! - `lifecycle`: Stop token, signal handling and ordered shutdown

pub mod cli;
pub mod commands;
pub mod lifecycle;

pub use cli::{Cli, Commands};
pub use commands::{init_logging, load_settings, reindex, run_sync, show_config};
pub use lifecycle::{LifecycleController, RunReport};
