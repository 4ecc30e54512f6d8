//! Initial full reindex.
//!
//! One join query fetches every task with both user names resolved, then
//! each row goes through the writer. A failing row is logged and counted;
//! only a failed fetch aborts the load.

use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use tasksync_storage::TaskStore;

use crate::error::IndexingError;
use crate::stats::BulkLoadReport;
use crate::writer::IndexWriter;

pub struct BulkLoader {
    store: Arc<dyn TaskStore>,
    writer: Arc<IndexWriter>,
}

impl BulkLoader {
    pub fn new(store: Arc<dyn TaskStore>, writer: Arc<IndexWriter>) -> Self {
        Self { store, writer }
    }

    /// Index every task once.
    ///
    /// Cancellation is checked between rows; rows not reached are left
    /// out of both `indexed` and `failed`.
    pub async fn run(&self, cancel: &CancellationToken) -> Result<BulkLoadReport, IndexingError> {
        let tasks = self.store.fetch_all_tasks().await?;

        let mut report = BulkLoadReport {
            fetched: tasks.len(),
            ..Default::default()
        };
        info!(rows = report.fetched, "Starting bulk load");

        for task in &tasks {
            if cancel.is_cancelled() {
                info!(remaining = report.remaining(), "Bulk load cancelled");
                break;
            }

            match self.writer.upsert(task).await {
                Ok(()) => report.record_indexed(),
                Err(e) => {
                    warn!(task_id = task.id, error = %e, "Failed to index task, skipping");
                    report.record_failed();
                }
            }
        }

        info!(
            fetched = report.fetched,
            indexed = report.indexed,
            failed = report.failed,
            "Bulk load complete"
        );
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tasksync_embeddings::{EmbeddingGateway, MockEmbedder, RetryPolicy};
    use tasksync_storage::MemoryTaskStore;
    use tasksync_types::TaskRecord;
    use tasksync_vector::MemoryIndex;

    fn titled(id: i64, title: &str) -> TaskRecord {
        let mut task = TaskRecord::new(id);
        task.title = Some(title.to_string());
        task
    }

    fn loader(
        store: MemoryTaskStore,
        embedder: MockEmbedder,
        index: Arc<MemoryIndex>,
    ) -> BulkLoader {
        let gateway = EmbeddingGateway::new(
            Arc::new(embedder),
            RetryPolicy::new(2, Duration::from_millis(10)),
        );
        let writer = Arc::new(IndexWriter::new(gateway, index));
        BulkLoader::new(Arc::new(store), writer)
    }

    #[tokio::test]
    async fn test_indexes_every_row_with_names() {
        let mut task = titled(1, "Write docs");
        task.by_user_id = Some(7);
        let store = MemoryTaskStore::new()
            .with_user(7, "Alice")
            .with_task(task)
            .with_task(titled(2, "Ship it"));
        let index = Arc::new(MemoryIndex::new(2));

        let report = loader(store, MockEmbedder::fixed(vec![1.0, 0.0]), index.clone())
            .run(&CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(report, BulkLoadReport { fetched: 2, indexed: 2, failed: 0 });
        assert_eq!(index.ids(), vec![1, 2]);
        assert_eq!(
            index.get(1).unwrap().payload.assigned_by_name.as_deref(),
            Some("Alice")
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_row_failure_does_not_abort() {
        let store = MemoryTaskStore::new()
            .with_task(titled(1, "fine"))
            .with_task(titled(2, "poison"))
            .with_task(titled(3, "also fine"));
        let index = Arc::new(MemoryIndex::new(2));
        let embedder = MockEmbedder::fixed(vec![1.0, 0.0]).fail_when_contains("poison");

        let report = loader(store, embedder, index.clone())
            .run(&CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(report, BulkLoadReport { fetched: 3, indexed: 2, failed: 1 });
        assert_eq!(index.ids(), vec![1, 3]);
    }

    #[tokio::test]
    async fn test_cancelled_before_first_row() {
        let store = MemoryTaskStore::new().with_task(titled(1, "a"));
        let index = Arc::new(MemoryIndex::new(2));
        let cancel = CancellationToken::new();
        cancel.cancel();

        let report = loader(store, MockEmbedder::fixed(vec![1.0, 0.0]), index.clone())
            .run(&cancel)
            .await
            .unwrap();

        assert_eq!(report.remaining(), 1);
        assert!(index.is_empty());
    }

    #[tokio::test]
    async fn test_fetch_failure_is_error() {
        let store = MemoryTaskStore::new();
        store.close().await;
        let index = Arc::new(MemoryIndex::new(2));

        let result = loader(store, MockEmbedder::fixed(vec![1.0, 0.0]), index)
            .run(&CancellationToken::new())
            .await;
        assert!(matches!(result, Err(IndexingError::Storage(_))));
    }
}
