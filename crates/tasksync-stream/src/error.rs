//! Change stream error types.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum StreamError {
    /// Broker or client error
    #[error("Kafka error: {0}")]
    Kafka(#[from] rdkafka::error::KafkaError),

    /// Invalid consumer configuration
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// Stream was closed
    #[error("Stream is closed")]
    Closed,
}
