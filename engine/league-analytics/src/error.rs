//! Error types for the analytics engine

use thiserror::Error;

/// Result type alias for analytics operations
pub type Result<T> = std::result::Result<T, AnalyticsError>;

/// Errors that can occur while validating or folding league rows
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AnalyticsError {
    /// Malformed or out-of-range input (filters or raw rows)
    #[error("Validation error: {field}: {message}")]
    Validation { field: String, message: String },

    /// A matchup group did not resolve to exactly two sides
    #[error("Data integrity error: season {season} week {week} matchup {matchup_id} has {sides} side(s)")]
    DataIntegrity { season: i32, week: u32, matchup_id: u32, sides: usize },
}

impl AnalyticsError {
    /// Create a new validation error
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation { field: field.into(), message: message.into() }
    }

    /// HTTP-style status code for the surrounding service envelope
    pub fn status_code(&self) -> u16 {
        match self {
            Self::Validation { .. } => 400,
            Self::DataIntegrity { .. } => 422,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = AnalyticsError::validation("season", "expected a number, got 'abc'");
        assert_eq!(err.to_string(), "Validation error: season: expected a number, got 'abc'");
        assert_eq!(err.status_code(), 400);

        let err = AnalyticsError::DataIntegrity { season: 2023, week: 4, matchup_id: 2, sides: 3 };
        assert_eq!(
            err.to_string(),
            "Data integrity error: season 2023 week 4 matchup 2 has 3 side(s)"
        );
    }

    #[test]
    fn test_integrity_status() {
        let err = AnalyticsError::DataIntegrity { season: 2023, week: 4, matchup_id: 2, sides: 1 };
        assert_eq!(err.status_code(), 422);
    }
}
