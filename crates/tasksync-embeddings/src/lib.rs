//! # tasksync-embeddings
//!
//! Text embedding for the task-sync pipeline.
//!
//! ## Features
//! - [`EmbeddingModel`] trait with HTTP providers for Gemini and
//!   OpenAI-compatible endpoints
//! - [`EmbeddingGateway`] applying a bounded retry policy
//! - [`MockEmbedder`] for tests that must not touch the network

pub mod api;
pub mod error;
pub mod mock;
pub mod model;
pub mod retry;

pub use api::{create_embedder, ApiEmbedderConfig, GeminiEmbedder, OpenAiEmbedder};
pub use error::EmbeddingError;
pub use mock::MockEmbedder;
pub use model::{Embedding, EmbeddingModel, ModelInfo};
pub use retry::{EmbeddingGateway, RetryPolicy};
