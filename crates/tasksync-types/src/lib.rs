//! # tasksync-types
//!
//! Shared domain types for the task-sync pipeline.
//!
//! This crate defines the data that flows between the relational store,
//! the change stream and the vector index:
//! - Task records and their enum codes
//! - Change event envelopes
//! - The payload stored with each index point
//! - The semantic text used as embedding input
//! - Settings
//!
//! ## Usage
//!
//! ```rust
//! use tasksync_types::{build_semantic_text, TaskPayload, TaskRecord};
//!
//! let mut task = TaskRecord::new(42);
//! task.title = Some("Fix bug".to_string());
//! task.priority = Some(4);
//!
//! assert!(build_semantic_text(&task).contains("Priority: urgent"));
//! assert_eq!(TaskPayload::project(&task).priority.as_deref(), Some("urgent"));
//! ```

pub mod codes;
pub mod config;
pub mod envelope;
pub mod error;
pub mod payload;
pub mod semantic;
pub mod task;

pub use codes::{Priority, Progress, TaskStatus};
pub use config::{
    default_config_path, DatabaseSettings, EmbeddingProviderKind, EmbeddingSettings,
    KafkaSettings, QdrantSettings, Settings,
};
pub use envelope::{decode_change, ChangeEvent, SkipReason, DELETE_OP};
pub use error::SyncError;
pub use payload::TaskPayload;
pub use semantic::{build_semantic_text, strip_markup};
pub use task::{TaskDate, TaskRecord};
