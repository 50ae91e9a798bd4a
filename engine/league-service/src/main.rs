//! League Analytics command-line entry point
//!
//! Loads configuration, opens the configured repository, runs one command and
//! prints the JSON response envelope to stdout.

use anyhow::{Context, Result};
use clap::Parser;
use std::time::Duration;
use tracing::info;

use league_service::cli::{Cli, CliHandler, Commands};
use league_service::config::validate_for_cli;
use league_service::{
    initialize_logging_with_config, load_configuration, AnalyticsService, ApiResponse,
    ServiceConfig,
};
use league_store::{create_local_repository_with_config, LeagueRepository};

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();

    let cli = Cli::parse();

    // Load configuration
    let mut config = load_configuration(cli.config.as_deref())?;
    if let Some(data_dir) = &cli.data_dir {
        config.store.data_dir = data_dir.clone();
    }
    validate_for_cli(&config)?;

    // Initialize logging
    initialize_logging_with_config(&config.logging)?;
    info!("Starting League Analytics v{}", league_analytics::VERSION);

    let repository = create_local_repository_with_config(config.store.clone())
        .context("Failed to create local repository")?;
    let response = run(repository, &config, &cli.command).await?;

    println!("{}", response.to_json_pretty());
    if !response.is_success() {
        std::process::exit(1);
    }
    Ok(())
}

async fn run<R: LeagueRepository>(
    mut repository: R,
    config: &ServiceConfig,
    command: &Commands,
) -> Result<ApiResponse> {
    repository.initialize().await.context("Failed to initialize repository")?;

    let service = AnalyticsService::new(
        repository,
        config.analytics.clone(),
        Duration::from_millis(config.service.fetch_timeout_ms),
    );
    let handler = CliHandler::new(service);

    Ok(handler.handle_command(command).await)
}
