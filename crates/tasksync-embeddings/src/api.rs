//! HTTP embedding providers.
//!
//! - [`GeminiEmbedder`]: Google Gemini `models/{model}:embedContent`
//! - [`OpenAiEmbedder`]: OpenAI-compatible `POST /embeddings`
//!
//! Each call is a single attempt. Transport errors and non-success statuses
//! are returned as [`EmbeddingError`] for the gateway to retry.

use async_trait::async_trait;
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

use tasksync_types::{EmbeddingProviderKind, EmbeddingSettings};

use crate::error::EmbeddingError;
use crate::model::{Embedding, EmbeddingModel, ModelInfo};

/// Default Gemini REST base URL.
pub const GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
/// Default OpenAI REST base URL.
pub const OPENAI_BASE_URL: &str = "https://api.openai.com/v1";

/// Configuration for an HTTP embedding provider.
#[derive(Debug, Clone)]
pub struct ApiEmbedderConfig {
    /// API base URL (e.g., "https://api.openai.com/v1")
    pub base_url: String,

    /// Model to use (e.g., "gemini-embedding-001", "text-embedding-3-small")
    pub model: String,

    /// API key
    pub api_key: SecretString,

    /// Requested output dimensionality
    pub dimension: Option<usize>,

    /// Request timeout
    pub timeout: Duration,
}

impl ApiEmbedderConfig {
    /// Create config for the Gemini API.
    pub fn gemini(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            base_url: GEMINI_BASE_URL.to_string(),
            model: model.into(),
            api_key: SecretString::from(api_key.into()),
            dimension: None,
            timeout: Duration::from_secs(30),
        }
    }

    /// Create config for the OpenAI API.
    pub fn openai(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            base_url: OPENAI_BASE_URL.to_string(),
            model: model.into(),
            api_key: SecretString::from(api_key.into()),
            dimension: None,
            timeout: Duration::from_secs(30),
        }
    }

    /// Override the base URL.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Request a specific output dimensionality.
    pub fn with_dimension(mut self, dimension: usize) -> Self {
        self.dimension = Some(dimension);
        self
    }

    /// Set the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

fn build_client(timeout: Duration) -> Result<Client, EmbeddingError> {
    Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| EmbeddingError::Config(e.to_string()))
}

async fn error_for_status(response: reqwest::Response) -> EmbeddingError {
    let status = response.status().as_u16();
    let message = response.text().await.unwrap_or_default();
    EmbeddingError::Api { status, message }
}

fn non_empty(values: Vec<f32>) -> Result<Embedding, EmbeddingError> {
    if values.is_empty() {
        return Err(EmbeddingError::InvalidResponse(
            "empty embedding vector".to_string(),
        ));
    }
    Ok(Embedding::new(values))
}

// ============ Gemini ============

/// Embedding provider backed by the Gemini `embedContent` endpoint.
pub struct GeminiEmbedder {
    client: Client,
    config: ApiEmbedderConfig,
    info: ModelInfo,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiRequest<'a> {
    model: String,
    content: GeminiContent<'a>,
    #[serde(skip_serializing_if = "Option::is_none")]
    output_dimensionality: Option<usize>,
}

#[derive(Serialize)]
struct GeminiContent<'a> {
    parts: Vec<GeminiPart<'a>>,
}

#[derive(Serialize)]
struct GeminiPart<'a> {
    text: &'a str,
}

#[derive(Deserialize)]
struct GeminiResponse {
    embedding: Option<GeminiValues>,
}

#[derive(Deserialize)]
struct GeminiValues {
    #[serde(default)]
    values: Vec<f32>,
}

impl GeminiEmbedder {
    pub fn new(config: ApiEmbedderConfig) -> Result<Self, EmbeddingError> {
        let client = build_client(config.timeout)?;
        let info = ModelInfo {
            name: config.model.clone(),
            dimension: config.dimension,
        };
        Ok(Self {
            client,
            config,
            info,
        })
    }
}

#[async_trait]
impl EmbeddingModel for GeminiEmbedder {
    fn info(&self) -> &ModelInfo {
        &self.info
    }

    async fn embed(&self, text: &str) -> Result<Embedding, EmbeddingError> {
        let model = self.config.model.trim_start_matches("models/");
        let url = format!("{}/models/{}:embedContent", self.config.base_url, model);

        let request = GeminiRequest {
            model: format!("models/{}", model),
            content: GeminiContent {
                parts: vec![GeminiPart { text }],
            },
            output_dimensionality: self.config.dimension,
        };

        debug!(model = %model, chars = text.len(), "Requesting Gemini embedding");

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", self.config.api_key.expose_secret())
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(error_for_status(response).await);
        }

        let body: GeminiResponse = response
            .json()
            .await
            .map_err(|e| EmbeddingError::InvalidResponse(e.to_string()))?;

        let values = body
            .embedding
            .ok_or_else(|| EmbeddingError::InvalidResponse("missing embedding".to_string()))?
            .values;
        non_empty(values)
    }
}

// ============ OpenAI-compatible ============

/// Embedding provider for OpenAI-compatible `/embeddings` endpoints.
pub struct OpenAiEmbedder {
    client: Client,
    config: ApiEmbedderConfig,
    info: ModelInfo,
}

#[derive(Serialize)]
struct OpenAiRequest<'a> {
    model: &'a str,
    input: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    dimensions: Option<usize>,
}

#[derive(Deserialize)]
struct OpenAiResponse {
    #[serde(default)]
    data: Vec<OpenAiData>,
}

#[derive(Deserialize)]
struct OpenAiData {
    embedding: Vec<f32>,
}

impl OpenAiEmbedder {
    pub fn new(config: ApiEmbedderConfig) -> Result<Self, EmbeddingError> {
        let client = build_client(config.timeout)?;
        let info = ModelInfo {
            name: config.model.clone(),
            dimension: config.dimension,
        };
        Ok(Self {
            client,
            config,
            info,
        })
    }
}

#[async_trait]
impl EmbeddingModel for OpenAiEmbedder {
    fn info(&self) -> &ModelInfo {
        &self.info
    }

    async fn embed(&self, text: &str) -> Result<Embedding, EmbeddingError> {
        let url = format!("{}/embeddings", self.config.base_url);
        let request = OpenAiRequest {
            model: &self.config.model,
            input: text,
            dimensions: self.config.dimension,
        };

        debug!(model = %self.config.model, chars = text.len(), "Requesting OpenAI embedding");

        let response = self
            .client
            .post(&url)
            .header(
                "Authorization",
                format!("Bearer {}", self.config.api_key.expose_secret()),
            )
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(error_for_status(response).await);
        }

        let body: OpenAiResponse = response
            .json()
            .await
            .map_err(|e| EmbeddingError::InvalidResponse(e.to_string()))?;

        let values = body
            .data
            .into_iter()
            .next()
            .ok_or_else(|| EmbeddingError::InvalidResponse("missing data[0]".to_string()))?
            .embedding;
        non_empty(values)
    }
}

/// Create the configured provider.
///
/// `dimension` is the vector size of the target collection and is passed
/// to the provider as the requested output dimensionality.
pub fn create_embedder(
    settings: &EmbeddingSettings,
    dimension: usize,
) -> Result<Arc<dyn EmbeddingModel>, EmbeddingError> {
    let api_key = settings.resolve_api_key().ok_or_else(|| {
        EmbeddingError::Config(format!(
            "no API key configured for {:?} (set embedding.api_key or one of {:?})",
            settings.provider,
            settings.provider.api_key_env_vars()
        ))
    })?;

    let timeout = Duration::from_secs(settings.timeout_secs);

    match settings.provider {
        EmbeddingProviderKind::Gemini => {
            let mut config = ApiEmbedderConfig::gemini(api_key, settings.model.clone())
                .with_dimension(dimension)
                .with_timeout(timeout);
            if let Some(base_url) = &settings.base_url {
                config = config.with_base_url(base_url.clone());
            }
            Ok(Arc::new(GeminiEmbedder::new(config)?))
        }
        EmbeddingProviderKind::OpenAi => {
            // Only the text-embedding-3 family accepts `dimensions`
            let mut config = ApiEmbedderConfig::openai(api_key, settings.model.clone())
                .with_timeout(timeout);
            if settings.model.starts_with("text-embedding-3") {
                config = config.with_dimension(dimension);
            }
            if let Some(base_url) = &settings.base_url {
                config = config.with_base_url(base_url.clone());
            }
            Ok(Arc::new(OpenAiEmbedder::new(config)?))
        }
    }
}
