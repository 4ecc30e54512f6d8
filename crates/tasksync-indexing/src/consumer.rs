//! Change-stream consumer loop.
//!
//! Polls the stream in bounded batches and routes each decoded event to
//! the writer. The stop token is checked once per iteration, so a batch
//! that has been polled is always processed to the end.

use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use tasksync_stream::{ChangeStream, StreamError, StreamMessage};
use tasksync_types::{decode_change, ChangeEvent, Settings};

use crate::enrich::EnrichmentResolver;
use crate::stats::ConsumerReport;
use crate::writer::IndexWriter;

/// Loop timing and batch size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConsumerConfig {
    /// Bounded wait per poll
    pub poll_timeout: Duration,
    /// Maximum records per poll
    pub max_records: usize,
    /// Interval between liveness lines
    pub heartbeat_interval: Duration,
}

impl Default for ConsumerConfig {
    fn default() -> Self {
        Self {
            poll_timeout: Duration::from_secs(1),
            max_records: 10,
            heartbeat_interval: Duration::from_secs(30),
        }
    }
}

impl ConsumerConfig {
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            poll_timeout: Duration::from_millis(settings.kafka.poll_timeout_ms),
            max_records: settings.kafka.max_poll_records,
            heartbeat_interval: Duration::from_secs(settings.heartbeat_interval_secs),
        }
    }
}

/// Outcome of one message, for the report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Outcome {
    Upserted,
    Deleted,
    Skipped,
    Failed,
}

pub struct CdcConsumer {
    stream: Arc<dyn ChangeStream>,
    resolver: EnrichmentResolver,
    writer: Arc<IndexWriter>,
    config: ConsumerConfig,
    carried: u64,
}

impl CdcConsumer {
    pub fn new(
        stream: Arc<dyn ChangeStream>,
        resolver: EnrichmentResolver,
        writer: Arc<IndexWriter>,
        config: ConsumerConfig,
    ) -> Self {
        Self {
            stream,
            resolver,
            writer,
            config,
            carried: 0,
        }
    }

    /// Start the liveness counter at `count` (tasks already indexed by the
    /// bulk load).
    pub fn with_carried_count(mut self, count: u64) -> Self {
        self.carried = count;
        self
    }

    /// Consume until `cancel` fires or the stream is closed.
    pub async fn run(&self, cancel: CancellationToken) -> ConsumerReport {
        let mut report = ConsumerReport {
            carried: self.carried,
            ..Default::default()
        };
        let mut last_heartbeat = Instant::now();

        info!(
            poll_timeout_ms = self.config.poll_timeout.as_millis() as u64,
            max_records = self.config.max_records,
            "Consuming change stream"
        );

        while !cancel.is_cancelled() {
            report.polls += 1;

            match self
                .stream
                .poll(self.config.poll_timeout, self.config.max_records)
                .await
            {
                Ok(batch) => {
                    for message in &batch {
                        match self.handle(message).await {
                            Outcome::Upserted => report.upserted += 1,
                            Outcome::Deleted => report.deleted += 1,
                            Outcome::Skipped => report.skipped += 1,
                            Outcome::Failed => report.failed += 1,
                        }
                    }
                }
                Err(StreamError::Closed) => {
                    info!("Change stream closed, stopping consumer");
                    break;
                }
                Err(e) => {
                    warn!(error = %e, "Poll failed");
                    // Avoid spinning on a broker that fails fast
                    tokio::time::sleep(self.config.poll_timeout).await;
                }
            }

            if last_heartbeat.elapsed() >= self.config.heartbeat_interval {
                info!(events_processed = report.events_processed(), "Alive");
                report.heartbeats += 1;
                last_heartbeat = Instant::now();
            }
        }

        info!(
            upserted = report.upserted,
            deleted = report.deleted,
            skipped = report.skipped,
            failed = report.failed,
            "Consumer stopped"
        );
        report
    }

    async fn handle(&self, message: &StreamMessage) -> Outcome {
        let event = match decode_change(message.value()) {
            Ok(event) => event,
            Err(reason) => {
                debug!(
                    partition = message.partition,
                    offset = message.offset,
                    reason = %reason,
                    "Skipping message"
                );
                return Outcome::Skipped;
            }
        };

        if event.task_id() < 0 {
            warn!(task_id = event.task_id(), "Skipping event with negative id");
            return Outcome::Skipped;
        }

        match event {
            ChangeEvent::Delete(task_id) => match self.writer.delete(task_id).await {
                Ok(()) => Outcome::Deleted,
                Err(e) => {
                    warn!(task_id, error = %e, "Failed to delete task");
                    Outcome::Failed
                }
            },
            ChangeEvent::Upsert(mut task) => {
                if let Err(e) = self.resolver.enrich(&mut task).await {
                    warn!(task_id = task.id, error = %e, "Failed to resolve user names, dropping event");
                    return Outcome::Failed;
                }
                match self.writer.upsert(&task).await {
                    Ok(()) => Outcome::Upserted,
                    Err(e) => {
                        warn!(task_id = task.id, error = %e, "Failed to index task, dropping event");
                        Outcome::Failed
                    }
                }
            }
        }
    }
}
