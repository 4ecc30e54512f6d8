//! Kafka change stream.

use async_trait::async_trait;
use rdkafka::config::ClientConfig;
use rdkafka::consumer::{Consumer, StreamConsumer};
use rdkafka::message::Message;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tracing::{debug, info};

use tasksync_types::KafkaSettings;

use crate::error::StreamError;
use crate::stream::{ChangeStream, StreamMessage};

pub struct KafkaChangeStream {
    consumer: StreamConsumer,
    topic: String,
    closed: AtomicBool,
}

impl KafkaChangeStream {
    /// Create the consumer and subscribe to the configured topic.
    pub fn subscribe(settings: &KafkaSettings) -> Result<Self, StreamError> {
        match settings.auto_offset_reset.as_str() {
            "latest" | "earliest" => {}
            other => {
                return Err(StreamError::Config(format!(
                    "auto_offset_reset must be \"latest\" or \"earliest\", got {:?}",
                    other
                )))
            }
        }

        let consumer: StreamConsumer = ClientConfig::new()
            .set("bootstrap.servers", &settings.bootstrap_servers)
            .set("group.id", &settings.group_id)
            .set("auto.offset.reset", &settings.auto_offset_reset)
            .set(
                "enable.auto.commit",
                if settings.enable_auto_commit {
                    "true"
                } else {
                    "false"
                },
            )
            .create()?;

        consumer.subscribe(&[settings.topic.as_str()])?;

        info!(
            topic = %settings.topic,
            group_id = %settings.group_id,
            "Subscribed to change stream"
        );

        Ok(Self {
            consumer,
            topic: settings.topic.clone(),
            closed: AtomicBool::new(false),
        })
    }

    fn to_message<M: Message>(message: &M) -> StreamMessage {
        StreamMessage {
            value: message.payload().map(|p| p.to_vec()),
            partition: message.partition(),
            offset: message.offset(),
        }
    }
}

#[async_trait]
impl ChangeStream for KafkaChangeStream {
    async fn poll(
        &self,
        wait: Duration,
        max_records: usize,
    ) -> Result<Vec<StreamMessage>, StreamError> {
        if self.closed.load(Ordering::SeqCst) {
            return Err(StreamError::Closed);
        }

        let mut batch = Vec::new();

        // First record waits up to `wait`; the rest only drain what is
        // already buffered.
        let mut timeout = wait;
        while batch.len() < max_records {
            match tokio::time::timeout(timeout, self.consumer.recv()).await {
                Ok(Ok(message)) => batch.push(Self::to_message(&message)),
                Ok(Err(e)) if batch.is_empty() => return Err(e.into()),
                Ok(Err(e)) => {
                    debug!(error = %e, "Stopping batch on consumer error");
                    break;
                }
                Err(_) => break,
            }
            timeout = Duration::ZERO;
        }

        Ok(batch)
    }

    async fn close(&self) {
        if self.closed.swap(true, Ordering::SeqCst) {
            return;
        }
        self.consumer.unsubscribe();
        info!(topic = %self.topic, "Change stream closed");
    }
}
