//! Lifecycle controller.
//!
//! Owns the stop token, runs the bulk load and the consumer loop, and
//! releases the stream and the store in that order however the run ends.

use std::sync::Arc;
use tokio::signal;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use tasksync_indexing::{
    BulkLoadReport, BulkLoader, CdcConsumer, ConsumerConfig, ConsumerReport, EnrichmentResolver,
    IndexWriter, IndexingError,
};
use tasksync_storage::TaskStore;
use tasksync_stream::ChangeStream;

/// Reports from one run.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RunReport {
    pub bulk: Option<BulkLoadReport>,
    pub consumer: Option<ConsumerReport>,
}

pub struct LifecycleController {
    store: Arc<dyn TaskStore>,
    writer: Arc<IndexWriter>,
    stream: Option<(Arc<dyn ChangeStream>, ConsumerConfig)>,
    cancel: CancellationToken,
}

impl LifecycleController {
    pub fn new(store: Arc<dyn TaskStore>, writer: Arc<IndexWriter>) -> Self {
        Self {
            store,
            writer,
            stream: None,
            cancel: CancellationToken::new(),
        }
    }

    /// Attach the change stream consumed after the bulk load.
    pub fn with_stream(mut self, stream: Arc<dyn ChangeStream>, config: ConsumerConfig) -> Self {
        self.stream = Some((stream, config));
        self
    }

    /// Token that stops the run when cancelled.
    pub fn cancel_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Cancel the token on SIGINT or SIGTERM.
    pub fn install_signal_handlers(&self) -> JoinHandle<()> {
        let cancel = self.cancel.clone();
        tokio::spawn(async move {
            let name = wait_for_signal().await;
            cancel.cancel();
            info!(signal = name, "Received signal, shutting down");
        })
    }

    /// Bulk load (unless skipped), then consume until stopped.
    ///
    /// Without an attached stream only the bulk load runs. Resources are
    /// released before returning, whether the run succeeded or not.
    pub async fn run(&self, skip_bulk_load: bool) -> Result<RunReport, IndexingError> {
        let result = self.run_inner(skip_bulk_load).await;
        self.release().await;
        result
    }

    async fn run_inner(&self, skip_bulk_load: bool) -> Result<RunReport, IndexingError> {
        let mut report = RunReport::default();

        if skip_bulk_load {
            info!("Skipping bulk load");
        } else {
            let loader = BulkLoader::new(self.store.clone(), self.writer.clone());
            report.bulk = Some(loader.run(&self.cancel).await?);
        }

        if let Some((stream, config)) = &self.stream {
            let carried = report.bulk.map_or(0, |bulk| bulk.indexed as u64);
            let consumer = CdcConsumer::new(
                stream.clone(),
                EnrichmentResolver::new(self.store.clone()),
                self.writer.clone(),
                *config,
            )
            .with_carried_count(carried);
            report.consumer = Some(consumer.run(self.cancel.clone()).await);
        }

        Ok(report)
    }

    async fn release(&self) {
        if let Some((stream, _)) = &self.stream {
            stream.close().await;
        }
        self.store.close().await;
        info!("Shutdown complete");
    }
}

async fn wait_for_signal() -> &'static str {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!(error = %e, "Failed to listen for SIGINT");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => "SIGINT",
        _ = terminate => "SIGTERM",
    }
}
