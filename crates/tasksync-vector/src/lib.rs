//! # tasksync-vector
//!
//! Vector index for task-sync.
//!
//! One point per task, keyed by task id, with the projected
//! [`TaskPayload`](tasksync_types::TaskPayload) stored alongside the
//! embedding. Upserts replace, deletes of absent ids succeed.
//!
//! Backends:
//! - [`QdrantIndex`]: Qdrant over gRPC, cosine distance
//! - [`MemoryIndex`]: in-process map

pub mod error;
pub mod index;
pub mod memory;
pub mod qdrant;

pub use error::VectorError;
pub use index::{check_dimension, TaskPoint, VectorIndex};
pub use memory::MemoryIndex;
pub use qdrant::QdrantIndex;
