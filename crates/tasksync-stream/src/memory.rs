//! In-process change stream for tests.

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use crate::error::StreamError;
use crate::stream::{ChangeStream, StreamMessage};

/// Queue-backed stream.
///
/// An empty queue sleeps for the full wait before returning an empty
/// batch, like a broker with no traffic.
#[derive(Debug, Default)]
pub struct MemoryChangeStream {
    queue: Mutex<VecDeque<StreamMessage>>,
    polls: AtomicUsize,
    closed: AtomicBool,
}

impl MemoryChangeStream {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, message: StreamMessage) {
        if let Ok(mut queue) = self.queue.lock() {
            queue.push_back(message);
        }
    }

    /// Queue a record whose value is `json`.
    pub fn push_json(&self, json: &str) {
        self.push(StreamMessage::new(json.as_bytes()));
    }

    pub fn pending(&self) -> usize {
        self.queue.lock().map(|q| q.len()).unwrap_or(0)
    }

    pub fn polls(&self) -> usize {
        self.polls.load(Ordering::SeqCst)
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ChangeStream for MemoryChangeStream {
    async fn poll(
        &self,
        wait: Duration,
        max_records: usize,
    ) -> Result<Vec<StreamMessage>, StreamError> {
        if self.is_closed() {
            return Err(StreamError::Closed);
        }
        self.polls.fetch_add(1, Ordering::SeqCst);

        let batch: Vec<StreamMessage> = match self.queue.lock() {
            Ok(mut queue) => {
                let take = max_records.min(queue.len());
                queue.drain(..take).collect()
            }
            Err(_) => Vec::new(),
        };

        if batch.is_empty() {
            tokio::time::sleep(wait).await;
        }
        Ok(batch)
    }

    async fn close(&self) {
        self.closed.store(true, Ordering::SeqCst);
    }
}
