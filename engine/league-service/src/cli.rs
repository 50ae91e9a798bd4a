//! # Command Line Interface
//!
//! Runs one analytics request against a league and prints the response envelope.

use crate::request::AnalyticsRequest;
use crate::response::ApiResponse;
use crate::service::{AnalyticsService, Operation};
use clap::{Args, Parser, Subcommand};
use league_analytics::playoffs::playoff_round;
use league_analytics::{classify, AnalyticsError, Week};
use league_store::LeagueRepository;
use serde::Serialize;
use std::path::PathBuf;

/// League analytics over stored weekly results
#[derive(Parser, Debug)]
#[command(name = "league-analytics")]
#[command(about = "Standings, head-to-head, streaks and playoff labels for a fantasy league")]
#[command(version)]
pub struct Cli {
    /// Directory holding one sub-directory per league (overrides config)
    #[arg(short, long, global = true)]
    pub data_dir: Option<PathBuf>,

    /// TOML configuration file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Command to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// League and season scope shared by the data commands
#[derive(Args, Debug, Clone)]
pub struct Scope {
    /// League id
    #[arg(short, long)]
    pub league: String,

    /// Season year; omit for every season
    #[arg(short, long)]
    pub season: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Ranked standings with playoff seeds
    Standings {
        #[command(flatten)]
        scope: Scope,
        /// Count playoff weeks toward the record
        #[arg(long)]
        include_playoffs: bool,
    },
    /// Pairwise records
    HeadToHead {
        #[command(flatten)]
        scope: Scope,
        /// Keep pairs where this manager is team1
        #[arg(short, long)]
        manager: Option<String>,
        /// all, regular or playoff
        #[arg(long)]
        matchup_type: Option<String>,
        /// Count each matchup from both teams' side
        #[arg(long)]
        both_sides: bool,
    },
    /// Current and longest streaks
    Streaks {
        #[command(flatten)]
        scope: Scope,
        #[arg(short, long)]
        manager: Option<String>,
        #[arg(long)]
        include_playoffs: bool,
    },
    /// Matchups with round labels and a summary
    Matchups {
        #[command(flatten)]
        scope: Scope,
        #[arg(short, long)]
        manager: Option<String>,
        #[arg(long)]
        matchup_type: Option<String>,
        #[arg(long)]
        playoff_only: bool,
    },
    /// Label a single postseason week
    Classify {
        #[arg(long)]
        week: Week,
        #[arg(long, default_value_t = league_analytics::DEFAULT_PLAYOFF_WEEK_START)]
        playoff_week_start: Week,
        #[arg(long)]
        toilet_bowl: bool,
        /// Explicit round number
        #[arg(long)]
        round: Option<u32>,
    },
}

#[derive(Debug, Serialize)]
struct ClassifyPayload {
    week: Week,
    playoff_week_start: Week,
    is_toilet_bowl: bool,
    round: i64,
    label: String,
}

impl Commands {
    /// Operation and raw parameters for a data command; `None` for `classify`
    fn request_params(&self) -> Option<(Operation, Vec<(&'static str, String)>)> {
        let scope_params = |scope: &Scope| {
            let mut params = vec![("league_id", scope.league.clone())];
            if let Some(season) = &scope.season {
                params.push(("season", season.clone()));
            }
            params
        };
        let optional = |params: &mut Vec<(&'static str, String)>, key, value: &Option<String>| {
            if let Some(value) = value {
                params.push((key, value.clone()));
            }
        };

        match self {
            Commands::Standings { scope, include_playoffs } => {
                let mut params = scope_params(scope);
                params.push(("include_playoffs", include_playoffs.to_string()));
                Some((Operation::Standings, params))
            }
            Commands::HeadToHead { scope, manager, matchup_type, both_sides } => {
                let mut params = scope_params(scope);
                optional(&mut params, "manager_id", manager);
                optional(&mut params, "matchup_type", matchup_type);
                if *both_sides {
                    params.push(("perspective", "both_sides".to_string()));
                }
                Some((Operation::HeadToHead, params))
            }
            Commands::Streaks { scope, manager, include_playoffs } => {
                let mut params = scope_params(scope);
                optional(&mut params, "manager_id", manager);
                params.push(("include_playoffs", include_playoffs.to_string()));
                Some((Operation::Streaks, params))
            }
            Commands::Matchups { scope, manager, matchup_type, playoff_only } => {
                let mut params = scope_params(scope);
                optional(&mut params, "manager_id", manager);
                optional(&mut params, "matchup_type", matchup_type);
                params.push(("playoff_only", playoff_only.to_string()));
                Some((Operation::Matchups, params))
            }
            Commands::Classify { .. } => None,
        }
    }
}

/// CLI handler
pub struct CliHandler<R: LeagueRepository> {
    service: AnalyticsService<R>,
}

impl<R: LeagueRepository> CliHandler<R> {
    pub fn new(service: AnalyticsService<R>) -> Self {
        Self { service }
    }

    /// Handle CLI commands
    pub async fn handle_command(&self, command: &Commands) -> ApiResponse {
        if let Commands::Classify { week, playoff_week_start, toilet_bowl, round } = command {
            return classify_response(*week, *playoff_week_start, *toilet_bowl, *round);
        }

        let Some((operation, params)) = command.request_params() else {
            return ApiResponse::from_error(&AnalyticsError::validation("command", "unsupported").into());
        };

        match AnalyticsRequest::from_params(params) {
            Ok(request) => self.service.handle(operation, &request).await,
            Err(err) => ApiResponse::from_error(&err.into()),
        }
    }
}

fn classify_response(week: Week, playoff_week_start: Week, toilet_bowl: bool, round: Option<u32>) -> ApiResponse {
    if week == 0 || playoff_week_start == 0 {
        return ApiResponse::from_error(
            &AnalyticsError::validation("week", "weeks start at 1").into(),
        );
    }
    ApiResponse::ok(&ClassifyPayload {
        week,
        playoff_week_start,
        is_toilet_bowl: toilet_bowl,
        round: playoff_round(week, playoff_week_start, round),
        label: classify(week, playoff_week_start, toilet_bowl, round),
    })
}
