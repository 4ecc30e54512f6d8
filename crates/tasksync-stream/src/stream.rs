//! Change stream trait and message type.

use async_trait::async_trait;
use std::time::Duration;

use crate::error::StreamError;

/// One raw record from the change stream.
///
/// Only the value is decoded downstream; the position fields are carried
/// for logging.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct StreamMessage {
    pub value: Option<Vec<u8>>,
    pub partition: i32,
    pub offset: i64,
}

impl StreamMessage {
    pub fn new(value: impl Into<Vec<u8>>) -> Self {
        Self {
            value: Some(value.into()),
            ..Default::default()
        }
    }

    /// A record with no value (tombstone).
    pub fn tombstone() -> Self {
        Self::default()
    }

    pub fn value(&self) -> Option<&[u8]> {
        self.value.as_deref()
    }
}

/// Subscribed consumer of the task change topic.
#[async_trait]
pub trait ChangeStream: Send + Sync {
    /// Wait up to `wait` for records and return at most `max_records`.
    ///
    /// An empty batch means nothing arrived within `wait`.
    async fn poll(
        &self,
        wait: Duration,
        max_records: usize,
    ) -> Result<Vec<StreamMessage>, StreamError>;

    /// Leave the consumer group. Later polls fail with [`StreamError::Closed`].
    async fn close(&self);
}
