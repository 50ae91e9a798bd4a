//! Error types for the service layer

use league_analytics::AnalyticsError;
use league_store::StoreError;
use thiserror::Error;

/// Result type alias for service operations
pub type Result<T> = std::result::Result<T, ServiceError>;

/// Errors surfaced to a caller of the service
#[derive(Error, Debug)]
pub enum ServiceError {
    /// Invalid request parameters or engine-level errors
    #[error(transparent)]
    Analytics(#[from] AnalyticsError),

    /// The backing store read failed
    #[error("Upstream error: {0}")]
    Upstream(#[from] StoreError),

    /// A fetch did not finish within the configured timeout
    #[error("Upstream timeout: {operation} exceeded {timeout_ms}ms")]
    Timeout { operation: String, timeout_ms: u64 },

    /// Response payload could not be encoded
    #[error("Encoding error: {0}")]
    Encoding(#[from] serde_json::Error),
}

impl ServiceError {
    /// Create a new timeout error
    pub fn timeout(operation: impl Into<String>, timeout_ms: u64) -> Self {
        Self::Timeout { operation: operation.into(), timeout_ms }
    }

    /// HTTP-style status for the response envelope
    pub fn status_code(&self) -> u16 {
        match self {
            Self::Analytics(err) => err.status_code(),
            Self::Upstream(StoreError::LeagueNotFound(_)) => 404,
            Self::Upstream(StoreError::Config(_) | StoreError::InvalidOperation(_)) => 500,
            Self::Upstream(_) | Self::Timeout { .. } => 502,
            Self::Encoding(_) => 500,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(ServiceError::from(AnalyticsError::validation("season", "bad")).status_code(), 400);
        assert_eq!(ServiceError::from(StoreError::league_not_found("abc")).status_code(), 404);
        assert_eq!(
            ServiceError::from(StoreError::Ingest(AnalyticsError::validation("week", "zero"))).status_code(),
            502
        );
        assert_eq!(ServiceError::timeout("weekly_scores", 100).status_code(), 502);
        assert_eq!(ServiceError::from(StoreError::config("empty")).status_code(), 500);
    }

    #[test]
    fn test_messages() {
        let err = ServiceError::from(AnalyticsError::validation("season", "bad"));
        assert_eq!(err.to_string(), "Validation error: season: bad");
        assert_eq!(
            ServiceError::timeout("matchups", 250).to_string(),
            "Upstream timeout: matchups exceeded 250ms"
        );
        assert_eq!(
            ServiceError::from(StoreError::league_not_found("abc")).to_string(),
            "Upstream error: League not found: abc"
        );
    }
}
