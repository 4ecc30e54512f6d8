//! Command implementations.
//!
//! Startup faults (configuration, connections, collection setup) are
//! fatal and surface as `anyhow` errors with context. Once the pipeline is
//! running, failures are per item and handled inside the indexing crate.

use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::info;

use tasksync_embeddings::{create_embedder, EmbeddingGateway, RetryPolicy};
use tasksync_indexing::{ConsumerConfig, IndexWriter};
use tasksync_storage::PgTaskStore;
use tasksync_stream::KafkaChangeStream;
use tasksync_types::Settings;
use tasksync_vector::QdrantIndex;

use crate::lifecycle::{LifecycleController, RunReport};

/// Load settings and apply CLI overrides (highest precedence).
pub fn load_settings(
    config_path: Option<&str>,
    log_level_override: Option<&str>,
) -> Result<Settings> {
    let mut settings = Settings::load(config_path).context("Failed to load configuration")?;
    if let Some(log_level) = log_level_override {
        settings.log_level = log_level.to_string();
    }
    Ok(settings)
}

/// Install the global subscriber. `RUST_LOG` wins over the configured level.
pub fn init_logging(log_level: &str) -> Result<()> {
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level)),
        )
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to set tracing subscriber")?;
    Ok(())
}

/// Connect the store, the embedder and the index, and make sure the
/// collection exists.
async fn build_controller(settings: &Settings) -> Result<LifecycleController> {
    let store = PgTaskStore::connect(&settings.database)
        .await
        .context("Failed to connect to task store")?;

    let dimension = settings.qdrant.vector_size as usize;
    let embedder = create_embedder(&settings.embedding, dimension)
        .context("Failed to create embedding provider")?;
    let gateway = EmbeddingGateway::new(embedder, RetryPolicy::from_settings(&settings.embedding));

    let index = QdrantIndex::connect(&settings.qdrant).context("Failed to connect to Qdrant")?;
    let writer = IndexWriter::new(gateway, Arc::new(index));
    writer
        .ensure_collection()
        .await
        .context("Failed to prepare vector collection")?;

    Ok(LifecycleController::new(Arc::new(store), Arc::new(writer)))
}

/// Reindex, then consume changes until SIGINT/SIGTERM.
pub async fn run_sync(
    config_path: Option<&str>,
    log_level: Option<&str>,
    skip_bulk_load: bool,
) -> Result<()> {
    let settings = load_settings(config_path, log_level)?;
    init_logging(&settings.log_level)?;

    info!(
        topic = %settings.kafka.topic,
        collection = %settings.qdrant.collection,
        model = %settings.embedding.model,
        "Task sync starting"
    );

    let controller = build_controller(&settings).await?;
    let stream =
        KafkaChangeStream::subscribe(&settings.kafka).context("Failed to subscribe to topic")?;
    let controller =
        controller.with_stream(Arc::new(stream), ConsumerConfig::from_settings(&settings));

    let _signals = controller.install_signal_handlers();

    let report = controller.run(skip_bulk_load).await.context("Sync failed")?;
    log_report(&report);
    Ok(())
}

/// Reindex every task once and exit.
pub async fn reindex(config_path: Option<&str>, log_level: Option<&str>) -> Result<()> {
    let settings = load_settings(config_path, log_level)?;
    init_logging(&settings.log_level)?;

    let controller = build_controller(&settings).await?;
    let _signals = controller.install_signal_handlers();

    let report = controller.run(false).await.context("Reindex failed")?;
    log_report(&report);
    Ok(())
}

/// Print the effective configuration as TOML, secrets masked.
pub fn show_config(config_path: Option<&str>, log_level: Option<&str>) -> Result<()> {
    let settings = load_settings(config_path, log_level)?;
    print!("{}", render_config(&settings)?);
    Ok(())
}

fn render_config(settings: &Settings) -> Result<String> {
    toml::to_string_pretty(&settings.redacted()).context("Failed to render configuration")
}

fn log_report(report: &RunReport) {
    if let Some(bulk) = report.bulk {
        info!(
            fetched = bulk.fetched,
            indexed = bulk.indexed,
            failed = bulk.failed,
            "Bulk load summary"
        );
    }
    if let Some(consumer) = report.consumer {
        info!(
            events_processed = consumer.events_processed(),
            deleted = consumer.deleted,
            skipped = consumer.skipped,
            failed = consumer.failed,
            polls = consumer.polls,
            "Consumer summary"
        );
    }
}
