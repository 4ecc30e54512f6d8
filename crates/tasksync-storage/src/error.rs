//! Storage error types.

use thiserror::Error;

/// Errors from the relational task store.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Could not establish the connection pool
    #[error("Connection error: {0}")]
    Connection(String),

    /// Query failed
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Row could not be mapped to a task
    #[error("Invalid row: {0}")]
    InvalidRow(String),

    /// Store was closed
    #[error("Store is closed")]
    Closed,
}
