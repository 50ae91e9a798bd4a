//! # Configuration Management
//!
//! Engine-level settings: playoff fallbacks and matchup thresholds.

use crate::models::{PlayoffSchedule, SeasonPlayoffConfig};
use crate::{DEFAULT_PLAYOFF_TEAMS, DEFAULT_PLAYOFF_WEEK_START};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Main configuration for the analytics engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct AnalyticsConfig {
    /// Fallbacks for seasons without playoff settings
    pub playoffs: PlayoffDefaults,
    /// Close game / blowout thresholds
    pub matchups: MatchupThresholds,
}

/// Playoff fallbacks
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayoffDefaults {
    /// First playoff week when a season does not say otherwise
    pub week_start: u32,
    /// Seeds handed out when a season does not say otherwise
    pub playoff_teams: u32,
}

impl Default for PlayoffDefaults {
    fn default() -> Self {
        Self { week_start: DEFAULT_PLAYOFF_WEEK_START, playoff_teams: DEFAULT_PLAYOFF_TEAMS }
    }
}

/// Point-differential thresholds for matchup classification
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchupThresholds {
    /// A game is close when the differential is strictly below this
    pub close_game_margin: Decimal,
    /// A game is a blowout when the differential is strictly above this
    pub blowout_margin: Decimal,
}

impl Default for MatchupThresholds {
    fn default() -> Self {
        Self { close_game_margin: Decimal::from(10), blowout_margin: Decimal::from(40) }
    }
}

impl MatchupThresholds {
    pub fn is_close(&self, differential: Decimal) -> bool {
        differential.abs() < self.close_game_margin
    }

    pub fn is_blowout(&self, differential: Decimal) -> bool {
        differential.abs() > self.blowout_margin
    }
}

impl AnalyticsConfig {
    /// Load configuration from file
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config: AnalyticsConfig = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to file
    pub fn save_to_file(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.playoffs.week_start == 0 {
            return Err(ConfigError::Invalid("playoffs.week_start must be at least 1".into()));
        }
        if self.matchups.close_game_margin.is_sign_negative()
            || self.matchups.blowout_margin.is_sign_negative()
        {
            return Err(ConfigError::Invalid("matchup thresholds must be non-negative".into()));
        }
        if self.matchups.close_game_margin > self.matchups.blowout_margin {
            return Err(ConfigError::Invalid(
                "close_game_margin must not exceed blowout_margin".into(),
            ));
        }
        Ok(())
    }

    /// Playoff schedule for a league, applying this config's fallbacks
    pub fn schedule(&self, seasons: impl IntoIterator<Item = SeasonPlayoffConfig>) -> PlayoffSchedule {
        PlayoffSchedule::with_defaults(self.playoffs.week_start, self.playoffs.playoff_teams, seasons)
    }
}

/// Errors raised while loading or saving configuration
#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Serialization error: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use tempfile::TempDir;

    #[test]
    fn test_config_default() {
        let config = AnalyticsConfig::default();
        assert_eq!(config.playoffs.week_start, 15);
        assert_eq!(config.playoffs.playoff_teams, 6);
        assert_eq!(config.matchups.close_game_margin, dec!(10));
        assert_eq!(config.matchups.blowout_margin, dec!(40));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_thresholds_are_strict() {
        let thresholds = MatchupThresholds::default();
        assert!(thresholds.is_close(dec!(9.99)));
        assert!(!thresholds.is_close(dec!(10)));
        assert!(thresholds.is_blowout(dec!(-40.01)));
        assert!(!thresholds.is_blowout(dec!(40)));
    }

    #[test]
    fn test_config_round_trip_through_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("analytics.toml");

        let mut config = AnalyticsConfig::default();
        config.playoffs.week_start = 14;
        config.save_to_file(&path).unwrap();

        let loaded = AnalyticsConfig::load_from_file(&path).unwrap();
        assert_eq!(loaded.playoffs.week_start, 14);
        assert_eq!(loaded.matchups, MatchupThresholds::default());
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("analytics.toml");
        std::fs::write(&path, "[playoffs]\nweek_start = 16\n").unwrap();

        let loaded = AnalyticsConfig::load_from_file(&path).unwrap();
        assert_eq!(loaded.playoffs.week_start, 16);
        assert_eq!(loaded.playoffs.playoff_teams, 6);
    }

    #[test]
    fn test_invalid_thresholds_rejected() {
        let mut config = AnalyticsConfig::default();
        config.matchups.close_game_margin = dec!(50);
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }
}
