//! Retrying embedding gateway.
//!
//! Wraps any [`EmbeddingModel`] with a bounded retry policy: on failure wait
//! a fixed backoff and try again until the attempt budget is spent. The
//! gateway never panics or aborts the process; exhaustion is reported as
//! [`EmbeddingError::Unavailable`] and the caller treats it as a per-item
//! failure.

use backoff::backoff::{Backoff, Constant};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, warn};

use tasksync_types::EmbeddingSettings;

use crate::error::EmbeddingError;
use crate::model::{Embedding, EmbeddingModel, ModelInfo};

/// Bounded retry policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, including the first
    pub max_attempts: u32,
    /// Fixed wait between attempts
    pub backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            backoff: Duration::from_secs(1),
        }
    }
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, backoff: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            backoff,
        }
    }

    pub fn from_settings(settings: &EmbeddingSettings) -> Self {
        Self::new(
            settings.max_attempts,
            Duration::from_millis(settings.retry_backoff_ms),
        )
    }
}

/// Embedding model with retries applied.
#[derive(Clone)]
pub struct EmbeddingGateway {
    model: Arc<dyn EmbeddingModel>,
    policy: RetryPolicy,
}

impl EmbeddingGateway {
    pub fn new(model: Arc<dyn EmbeddingModel>, policy: RetryPolicy) -> Self {
        Self { model, policy }
    }

    pub fn policy(&self) -> RetryPolicy {
        self.policy
    }

    pub fn info(&self) -> &ModelInfo {
        self.model.info()
    }

    /// Embed `text`, retrying on any failure up to the policy budget.
    pub async fn embed(&self, text: &str) -> Result<Embedding, EmbeddingError> {
        let mut backoff = Constant::new(self.policy.backoff);
        let mut attempts = 0;

        loop {
            attempts += 1;
            debug!(attempt = attempts, model = %self.model.info().name, "Requesting embedding");

            match self.model.embed(text).await {
                Ok(embedding) => return Ok(embedding),
                Err(e) => {
                    if attempts >= self.policy.max_attempts {
                        error!(error = %e, attempts, "Embedding retries exhausted");
                        return Err(EmbeddingError::Unavailable {
                            attempts,
                            last_error: e.to_string(),
                        });
                    }

                    // Constant never runs dry
                    let wait = backoff.next_backoff().unwrap_or(self.policy.backoff);
                    warn!(
                        error = %e,
                        attempt = attempts,
                        retry_in_ms = wait.as_millis() as u64,
                        "Embedding failed, retrying"
                    );
                    tokio::time::sleep(wait).await;
                }
            }
        }
    }
}
