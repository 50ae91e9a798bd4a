//! Configuration for the league store

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Which repository implementation to construct
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackendKind {
    /// JSON row files under `data_dir`
    #[default]
    Local,
    /// Process-local maps, filled by an embedding caller; rejected by the CLI
    Memory,
}

/// Configuration for the league store
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Base directory holding one sub-directory per league
    pub data_dir: PathBuf,

    /// Backend selection
    pub backend: BackendKind,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self { data_dir: PathBuf::from("./data/leagues"), backend: BackendKind::Local }
    }
}

/// File names inside a league directory
pub const WEEKLY_SCORES_FILE: &str = "weekly_scores.json";
pub const TEAM_WEEKS_FILE: &str = "team_weeks.json";
pub const MATCHUPS_FILE: &str = "matchups.json";
pub const SEASONS_FILE: &str = "seasons.json";
pub const MANAGERS_FILE: &str = "managers.json";

impl StoreConfig {
    /// Create a new configuration with custom data directory
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self { data_dir: data_dir.into(), ..Default::default() }
    }

    /// Directory holding one league's row files
    pub fn league_dir(&self, league_id: &str) -> PathBuf {
        self.data_dir.join(league_id)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.backend == BackendKind::Local && self.data_dir.as_os_str().is_empty() {
            return Err("data_dir must not be empty for the local backend".to_string());
        }
        Ok(())
    }
}

/// League ids become directory names, so they are restricted to a safe alphabet
pub fn validate_league_id(league_id: &str) -> Result<(), String> {
    if league_id.is_empty() {
        return Err("league_id must not be empty".to_string());
    }
    if !league_id.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_') {
        return Err(format!("league_id contains unsupported characters: {league_id}"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = StoreConfig::default();
        assert_eq!(config.backend, BackendKind::Local);
        assert!(config.validate().is_ok());
        assert_eq!(config.league_dir("123"), PathBuf::from("./data/leagues/123"));
    }

    #[test]
    fn test_empty_data_dir_rejected_for_local() {
        let config = StoreConfig::new("");
        assert!(config.validate().is_err());

        let memory = StoreConfig { backend: BackendKind::Memory, ..StoreConfig::new("") };
        assert!(memory.validate().is_ok());
    }

    #[test]
    fn test_backend_kind_deserializes_snake_case() {
        let config: StoreConfig = serde_json::from_str(r#"{"backend": "memory"}"#).unwrap();
        assert_eq!(config.backend, BackendKind::Memory);
        assert_eq!(config.data_dir, PathBuf::from("./data/leagues"));
    }

    #[test]
    fn test_league_id_alphabet() {
        assert!(validate_league_id("league_2023-a").is_ok());
        assert!(validate_league_id("").is_err());
        assert!(validate_league_id("../etc").is_err());
    }
}
