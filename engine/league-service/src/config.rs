//! Service configuration management

use anyhow::{Context, Result};
use league_analytics::AnalyticsConfig;
use league_store::{BackendKind, StoreConfig};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Main service configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    /// Engine configuration
    pub analytics: AnalyticsConfig,

    /// Row store configuration
    pub store: StoreConfig,

    /// Service-level configuration
    pub service: ServiceSettings,

    /// Logging configuration
    pub logging: LoggingConfig,
}

/// Service-level settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceSettings {
    /// Upper bound on each repository fetch, in milliseconds
    pub fetch_timeout_ms: u64,
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,

    /// Log format (json, pretty, compact)
    pub format: String,
}

impl Default for ServiceSettings {
    fn default() -> Self {
        Self { fetch_timeout_ms: 5_000 }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { level: "info".to_string(), format: "pretty".to_string() }
    }
}

/// Load configuration from an optional TOML file and environment variables.
///
/// The file is `config_file` when given, else `LEAGUE_CONFIG` when set.
pub fn load_config(config_file: Option<&Path>) -> Result<ServiceConfig> {
    let config_file =
        config_file.map(Path::to_path_buf).or_else(|| std::env::var("LEAGUE_CONFIG").ok().map(PathBuf::from));

    let mut config = match &config_file {
        Some(path) => {
            tracing::debug!("Loading configuration from file: {:?}", path);
            load_from_file(path)?
        }
        None => ServiceConfig::default(),
    };

    // Override with environment variables
    load_from_env(&mut config)?;

    // Validate configuration
    validate_config(&config)?;

    Ok(config)
}

/// Load configuration from a TOML file
pub fn load_from_file(path: &Path) -> Result<ServiceConfig> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {:?}", path))?;
    toml::from_str(&content).with_context(|| format!("Failed to parse config file: {:?}", path))
}

/// Load configuration from environment variables
fn load_from_env(config: &mut ServiceConfig) -> Result<()> {
    apply_overrides(config, |key| std::env::var(key).ok())
}

fn apply_overrides(
    config: &mut ServiceConfig,
    lookup: impl Fn(&str) -> Option<String>,
) -> Result<()> {
    if let Some(data_dir) = lookup("LEAGUE_DATA_DIR") {
        config.store.data_dir = PathBuf::from(data_dir);
    }

    if let Some(level) = lookup("LEAGUE_LOG_LEVEL") {
        config.logging.level = level;
    }

    if let Some(format) = lookup("LEAGUE_LOG_FORMAT") {
        config.logging.format = format;
    }

    if let Some(timeout) = lookup("LEAGUE_FETCH_TIMEOUT_MS") {
        config.service.fetch_timeout_ms = timeout
            .parse()
            .with_context(|| format!("Invalid LEAGUE_FETCH_TIMEOUT_MS: {}", timeout))?;
    }

    Ok(())
}

/// Validate configuration
pub fn validate_config(config: &ServiceConfig) -> Result<()> {
    // Validate log level
    match config.logging.level.as_str() {
        "trace" | "debug" | "info" | "warn" | "error" => {}
        _ => return Err(anyhow::anyhow!("Invalid log level: {}", config.logging.level)),
    }

    // Validate log format
    match config.logging.format.as_str() {
        "json" | "pretty" | "compact" => {}
        _ => return Err(anyhow::anyhow!("Invalid log format: {}", config.logging.format)),
    }

    if config.service.fetch_timeout_ms == 0 {
        return Err(anyhow::anyhow!("fetch_timeout_ms must be greater than 0"));
    }

    config.store.validate().map_err(anyhow::Error::msg).context("Invalid store configuration")?;
    config.analytics.validate().context("Invalid analytics configuration")?;

    Ok(())
}

/// Extra checks for the command-line binary, which can only read leagues from disk.
///
/// The memory backend starts empty and is filled through `InMemoryRepository::insert_league`,
/// so it is only usable by callers embedding the service.
pub fn validate_for_cli(config: &ServiceConfig) -> Result<()> {
    if config.store.backend == BackendKind::Memory {
        return Err(anyhow::anyhow!(
            "The memory backend is for embedding only; set store.backend = \"local\" for the CLI"
        ));
    }
    Ok(())
}

/// Save configuration to a TOML file
pub fn save_config(config: &ServiceConfig, path: &Path) -> Result<()> {
    let content = toml::to_string_pretty(config).context("Failed to serialize configuration")?;
    std::fs::write(path, content).with_context(|| format!("Failed to write config file: {:?}", path))
}
