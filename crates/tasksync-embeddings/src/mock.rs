//! Mock embedding model for testing.

use async_trait::async_trait;
use std::sync::atomic::{AtomicU32, Ordering};

use crate::error::EmbeddingError;
use crate::model::{Embedding, EmbeddingModel, ModelInfo};

/// Deterministic embedder that never touches the network.
///
/// Returns the same vector for every text. Failure behavior is configurable
/// so retry and drop paths can be exercised.
pub struct MockEmbedder {
    info: ModelInfo,
    vector: Vec<f32>,
    /// Number of leading calls that fail
    fail_first: u32,
    fail_always: bool,
    /// Texts containing this substring always fail
    fail_pattern: Option<String>,
    calls: AtomicU32,
}

impl MockEmbedder {
    /// Always returns `vector`.
    pub fn fixed(vector: Vec<f32>) -> Self {
        let dimension = vector.len();
        Self {
            info: ModelInfo {
                name: "mock".to_string(),
                dimension: Some(dimension),
            },
            vector,
            fail_first: 0,
            fail_always: false,
            fail_pattern: None,
            calls: AtomicU32::new(0),
        }
    }

    /// Fails every call.
    pub fn failing() -> Self {
        Self {
            fail_always: true,
            ..Self::fixed(Vec::new())
        }
    }

    /// Fail the first `n` calls, then succeed.
    pub fn fail_times(mut self, n: u32) -> Self {
        self.fail_first = n;
        self
    }

    /// Fail every call whose text contains `pattern`.
    pub fn fail_when_contains(mut self, pattern: impl Into<String>) -> Self {
        self.fail_pattern = Some(pattern.into());
        self
    }

    /// Number of `embed` calls so far.
    pub fn calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl EmbeddingModel for MockEmbedder {
    fn info(&self) -> &ModelInfo {
        &self.info
    }

    async fn embed(&self, text: &str) -> Result<Embedding, EmbeddingError> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);

        if self.fail_always || call < self.fail_first {
            return Err(EmbeddingError::Request("mock failure".to_string()));
        }
        if let Some(pattern) = &self.fail_pattern {
            if text.contains(pattern.as_str()) {
                return Err(EmbeddingError::Api {
                    status: 500,
                    message: format!("mock rejects text containing {:?}", pattern),
                });
            }
        }

        Ok(Embedding::new(self.vector.clone()))
    }
}
