//! Error types for the indexing pipeline.

use tasksync_embeddings::EmbeddingError;
use tasksync_storage::StorageError;
use tasksync_vector::VectorError;
use thiserror::Error;

/// Errors that can occur in the indexing pipeline
#[derive(Error, Debug)]
pub enum IndexingError {
    /// Relational store query failed
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// Vector index operation failed
    #[error("Vector error: {0}")]
    Vector(#[from] VectorError),

    /// Embedding could not be produced
    #[error("Embedding error: {0}")]
    Embedding(#[from] EmbeddingError),

    /// Task id cannot be used as a point id
    #[error("Invalid task id: {0}")]
    InvalidId(i64),
}
