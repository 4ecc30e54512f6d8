//! Vector index trait and point type.

use async_trait::async_trait;

use tasksync_types::TaskPayload;

use crate::error::VectorError;

/// One index entry: a task's embedding and its projected payload.
///
/// The point id is the task id.
#[derive(Debug, Clone, PartialEq)]
pub struct TaskPoint {
    pub id: u64,
    pub vector: Vec<f32>,
    pub payload: TaskPayload,
}

impl TaskPoint {
    pub fn new(id: u64, vector: Vec<f32>, payload: TaskPayload) -> Self {
        Self {
            id,
            vector,
            payload,
        }
    }
}

/// A vector collection keyed by task id.
///
/// Every call waits for the backend to acknowledge before returning.
#[async_trait]
pub trait VectorIndex: Send + Sync {
    /// Fixed vector dimensionality of the collection.
    fn dimension(&self) -> usize;

    /// Create the collection if it does not exist.
    async fn ensure_collection(&self) -> Result<(), VectorError>;

    /// Write `point`, replacing any existing point with the same id.
    async fn upsert(&self, point: TaskPoint) -> Result<(), VectorError>;

    /// Remove the point with `id`. Removing an absent id succeeds.
    async fn delete(&self, id: u64) -> Result<(), VectorError>;
}

/// Reject vectors whose length differs from the collection dimension.
pub fn check_dimension(expected: usize, vector: &[f32]) -> Result<(), VectorError> {
    if vector.len() != expected {
        return Err(VectorError::DimensionMismatch {
            expected,
            actual: vector.len(),
        });
    }
    Ok(())
}
