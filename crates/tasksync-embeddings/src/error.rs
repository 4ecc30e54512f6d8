//! Embedding error types.

use thiserror::Error;

/// Errors that can occur during embedding operations.
#[derive(Debug, Error)]
pub enum EmbeddingError {
    /// Transport-level failure (connect, timeout, body read)
    #[error("Request failed: {0}")]
    Request(String),

    /// Provider answered with a non-success status
    #[error("API error {status}: {message}")]
    Api { status: u16, message: String },

    /// Response body did not contain an embedding
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Provider misconfiguration
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// Every attempt of the retry budget failed
    #[error("Embedding unavailable after {attempts} attempts: {last_error}")]
    Unavailable { attempts: u32, last_error: String },
}

impl From<reqwest::Error> for EmbeddingError {
    fn from(err: reqwest::Error) -> Self {
        EmbeddingError::Request(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = EmbeddingError::Api {
            status: 429,
            message: "quota".to_string(),
        };
        assert_eq!(err.to_string(), "API error 429: quota");

        let err = EmbeddingError::Unavailable {
            attempts: 3,
            last_error: "timeout".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Embedding unavailable after 3 attempts: timeout"
        );
    }
}
