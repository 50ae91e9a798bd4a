//! League Analytics Service Library
//!
//! Hosts the analytics engine behind a request/response boundary: string
//! parameters are validated into an [`AnalyticsRequest`], rows are fetched from an
//! injected [`league_store::LeagueRepository`] under a timeout, and results are
//! wrapped in the `{ success, ... }` envelope.

use anyhow::{Context, Result};
use std::path::Path;

pub mod cli;
pub mod config;
pub mod error;
pub mod logging;
pub mod request;
pub mod response;
pub mod service;

pub use config::ServiceConfig;
pub use error::ServiceError;
pub use logging::{initialize_logging, initialize_logging_with_config};
pub use request::AnalyticsRequest;
pub use response::ApiResponse;
pub use service::{AnalyticsService, Operation};

/// Load configuration from an optional file and environment variables
pub fn load_configuration(config_file: Option<&Path>) -> Result<ServiceConfig> {
    config::load_config(config_file).context("Failed to load service configuration")
}
