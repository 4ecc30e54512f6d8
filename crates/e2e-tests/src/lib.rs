//! End-to-end test infrastructure for task-sync.
//!
//! Wires the full pipeline (lifecycle controller, bulk loader, change
//! consumer, writer) over the in-memory store, stream and index, with a
//! mock embedder in place of the HTTP provider.

use std::sync::Arc;
use std::time::Duration;

use serde_json::{json, Value};

use tasksync_daemon::{LifecycleController, RunReport};
use tasksync_embeddings::{EmbeddingGateway, MockEmbedder, RetryPolicy};
use tasksync_indexing::{ConsumerConfig, IndexWriter};
use tasksync_storage::MemoryTaskStore;
use tasksync_stream::MemoryChangeStream;
use tasksync_vector::MemoryIndex;

/// Dimension of the harness collection.
pub const DIMENSION: usize = 4;

/// Fixed vector returned by the default harness embedder.
pub fn fixed_vector() -> Vec<f32> {
    vec![0.5, 0.5, 0.5, 0.5]
}

/// Shared test harness for E2E tests.
pub struct TestHarness {
    pub store: Arc<MemoryTaskStore>,
    pub stream: Arc<MemoryChangeStream>,
    pub index: Arc<MemoryIndex>,
    pub embedder: Arc<MockEmbedder>,
}

impl TestHarness {
    /// Harness with users 7 ("Alice") and 9 ("Bob") and a fixed embedder.
    pub fn new() -> Self {
        Self::with_embedder(MockEmbedder::fixed(fixed_vector()))
    }

    pub fn with_embedder(embedder: MockEmbedder) -> Self {
        Self::with_store(
            MemoryTaskStore::new()
                .with_user(7, "Alice")
                .with_user(9, "Bob"),
            embedder,
        )
    }

    pub fn with_store(store: MemoryTaskStore, embedder: MockEmbedder) -> Self {
        Self {
            store: Arc::new(store),
            stream: Arc::new(MemoryChangeStream::new()),
            index: Arc::new(MemoryIndex::new(DIMENSION)),
            embedder: Arc::new(embedder),
        }
    }

    /// Controller over the harness backends, with the default retry
    /// budget and loop timing.
    pub fn controller(&self) -> LifecycleController {
        let gateway = EmbeddingGateway::new(
            self.embedder.clone(),
            RetryPolicy::new(3, Duration::from_secs(1)),
        );
        let writer = Arc::new(IndexWriter::new(gateway, self.index.clone()));
        LifecycleController::new(self.store.clone(), writer)
            .with_stream(self.stream.clone(), ConsumerConfig::default())
    }

    /// Run the pipeline for `duration`, then cancel and wait for shutdown.
    ///
    /// Intended for `start_paused` tests, where the duration is virtual.
    pub async fn run_for(&self, skip_bulk_load: bool, duration: Duration) -> RunReport {
        let controller = self.controller();
        let cancel = controller.cancel_token();

        let handle = tokio::spawn(async move { controller.run(skip_bulk_load).await });
        tokio::time::sleep(duration).await;
        cancel.cancel();

        handle
            .await
            .expect("pipeline task panicked")
            .expect("pipeline run failed")
    }

    /// Queue a create/update envelope with `row` as the `after` snapshot.
    pub fn push_upsert(&self, row: Value) {
        self.stream.push_json(&upsert_envelope(row).to_string());
    }

    /// Queue a delete envelope for `id`.
    pub fn push_delete(&self, id: i64) {
        self.stream.push_json(&delete_envelope(id).to_string());
    }
}

impl Default for TestHarness {
    fn default() -> Self {
        Self::new()
    }
}

/// Debezium-style create envelope.
pub fn upsert_envelope(row: Value) -> Value {
    json!({
        "schema": {"type": "struct", "name": "cdc.public.task.Envelope"},
        "payload": {"op": "c", "before": null, "after": row, "source": {"table": "task"}}
    })
}

/// Debezium-style delete envelope.
pub fn delete_envelope(id: i64) -> Value {
    json!({
        "schema": {"type": "struct", "name": "cdc.public.task.Envelope"},
        "payload": {"op": "d", "before": {"id": id}, "after": null}
    })
}

/// Row used by the reference scenario.
pub fn reference_row() -> Value {
    json!({
        "id": 42,
        "title": "Fix bug",
        "description": "<p>urgent</p>",
        "priority": 4,
        "status": 1,
        "progress": 0,
        "by_user_id": 7,
        "to_user_id": 9
    })
}
