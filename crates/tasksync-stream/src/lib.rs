//! # tasksync-stream
//!
//! Consumers for the task change topic.
//!
//! A [`ChangeStream`] hands out raw record values in bounded batches;
//! decoding into change events happens in the indexing pipeline.

pub mod error;
pub mod kafka;
pub mod memory;
pub mod stream;

pub use error::StreamError;
pub use kafka::KafkaChangeStream;
pub use memory::MemoryChangeStream;
pub use stream::{ChangeStream, StreamMessage};
