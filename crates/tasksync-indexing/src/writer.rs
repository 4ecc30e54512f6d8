//! Index writer: embed, project and write one task at a time.

use std::sync::Arc;
use tracing::debug;

use tasksync_embeddings::EmbeddingGateway;
use tasksync_types::{build_semantic_text, TaskPayload, TaskRecord};
use tasksync_vector::{check_dimension, TaskPoint, VectorIndex};

use crate::error::IndexingError;

/// Writes task points to the vector index.
///
/// Upserts are keyed by task id and replace the previous point, so
/// replaying an event is harmless.
pub struct IndexWriter {
    gateway: EmbeddingGateway,
    index: Arc<dyn VectorIndex>,
}

impl IndexWriter {
    pub fn new(gateway: EmbeddingGateway, index: Arc<dyn VectorIndex>) -> Self {
        Self { gateway, index }
    }

    pub fn dimension(&self) -> usize {
        self.index.dimension()
    }

    /// Create the index collection if missing.
    pub async fn ensure_collection(&self) -> Result<(), IndexingError> {
        self.index.ensure_collection().await?;
        Ok(())
    }

    /// Embed and write `task`.
    ///
    /// Nothing is written unless the embedding succeeds and has the
    /// collection's dimension.
    pub async fn upsert(&self, task: &TaskRecord) -> Result<(), IndexingError> {
        let id = task.point_id().ok_or(IndexingError::InvalidId(task.id))?;

        let text = build_semantic_text(task);
        let vector = self.gateway.embed(&text).await?.into_values();
        check_dimension(self.index.dimension(), &vector)?;

        let payload = TaskPayload::project(task);
        self.index.upsert(TaskPoint::new(id, vector, payload)).await?;

        debug!(task_id = task.id, "Indexed task");
        Ok(())
    }

    /// Remove the point for `task_id`. Absent points are not an error.
    pub async fn delete(&self, task_id: i64) -> Result<(), IndexingError> {
        let id = u64::try_from(task_id).map_err(|_| IndexingError::InvalidId(task_id))?;
        self.index.delete(id).await?;

        debug!(task_id, "Removed task");
        Ok(())
    }
}
