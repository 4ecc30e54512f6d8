//! Error types shared across task-sync crates.

use thiserror::Error;

/// Errors raised while loading or validating settings.
#[derive(Debug, Error)]
pub enum SyncError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = SyncError::Config("database.url must not be empty".to_string());
        assert_eq!(
            err.to_string(),
            "Configuration error: database.url must not be empty"
        );
    }
}
