//! # tasksync-indexing
//!
//! Keeps the vector index in step with the task table.
//!
//! ## Pipeline
//! 1. [`BulkLoader`] reindexes every task once at startup
//! 2. [`CdcConsumer`] applies change events until stopped
//!
//! Both go through [`IndexWriter`], which embeds the task's semantic text,
//! projects the payload and writes one point keyed by task id. Change
//! events are first passed to [`EnrichmentResolver`] to look up user names.
//!
//! Failures are per item: a task that cannot be enriched, embedded or
//! written is logged, counted and dropped.

pub mod bulk;
pub mod consumer;
pub mod enrich;
pub mod error;
pub mod stats;
pub mod writer;

pub use bulk::BulkLoader;
pub use consumer::{CdcConsumer, ConsumerConfig};
pub use enrich::EnrichmentResolver;
pub use error::IndexingError;
pub use stats::{BulkLoadReport, ConsumerReport};
pub use writer::IndexWriter;
