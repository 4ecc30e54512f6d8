//! Vector index error types.

use thiserror::Error;

/// Errors that can occur during vector index operations.
#[derive(Debug, Error)]
pub enum VectorError {
    /// Backend rejected or failed the request
    #[error("Index error: {0}")]
    Index(String),

    /// Dimension mismatch
    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    /// Payload could not be converted for the backend
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Could not reach or configure the backend
    #[error("Connection error: {0}")]
    Connection(String),
}

impl From<qdrant_client::QdrantError> for VectorError {
    fn from(err: qdrant_client::QdrantError) -> Self {
        VectorError::Index(err.to_string())
    }
}
