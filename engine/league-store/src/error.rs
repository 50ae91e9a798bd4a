//! Error types for the league store

use league_analytics::AnalyticsError;
use thiserror::Error;

/// Result type alias for store operations
pub type Result<T> = std::result::Result<T, StoreError>;

/// Errors that can occur while reading league rows
#[derive(Error, Debug)]
pub enum StoreError {
    /// I/O errors (file operations)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Row files that are not valid JSON
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Rows that fail validation at the ingestion boundary
    #[error("Ingest error: {0}")]
    Ingest(#[from] AnalyticsError),

    /// No data exists for the league at all
    #[error("League not found: {0}")]
    LeagueNotFound(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Repository used before `initialize`
    #[error("Invalid operation: {0}")]
    InvalidOperation(String),
}

impl StoreError {
    /// Create a new configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a new league not found error
    pub fn league_not_found(league_id: impl Into<String>) -> Self {
        Self::LeagueNotFound(league_id.into())
    }

    /// Create a new invalid operation error
    pub fn invalid_operation(msg: impl Into<String>) -> Self {
        Self::InvalidOperation(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ingest_error_wraps_validation() {
        let err: StoreError = AnalyticsError::validation("season", "not a number").into();
        assert!(matches!(err, StoreError::Ingest(AnalyticsError::Validation { .. })));
        assert_eq!(err.to_string(), "Ingest error: Validation error: season: not a number");
    }

    #[test]
    fn test_helpers() {
        assert!(matches!(StoreError::league_not_found("abc"), StoreError::LeagueNotFound(id) if id == "abc"));
        assert_eq!(StoreError::config("empty").to_string(), "Configuration error: empty");
    }
}
