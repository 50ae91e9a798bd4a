//! Request handling: fetch rows, run the engine, build payloads

use crate::error::{Result, ServiceError};
use crate::request::AnalyticsRequest;
use crate::response::ApiResponse;
use chrono::{DateTime, Utc};
use league_analytics::ingestion::IngestReport;
use league_analytics::{
    seed_playoffs, AnalyticsConfig, HeadToHeadCalculator, HeadToHeadRecord, ManagerDirectory,
    ManagerStreaks, MatchupSummary, MatchupView, Perspective, PlayoffBracketClassifier,
    PlayoffSchedule, PlayoffSeed, Season, StandingsAggregator, StandingsRow, StreakEngine,
    StreakRecordHolder,
};
use league_store::LeagueRepository;
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::time::Duration;
use tracing::info;

/// Standings response payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StandingsPayload {
    pub league_id: String,
    pub standings: Vec<StandingsRow>,
    pub seasons: Vec<Season>,
    pub include_playoffs: bool,
    /// Empty when playoff weeks are included
    pub playoff_seeds: Vec<PlayoffSeed>,
    pub no_data: bool,
    /// Malformed matchup groups dropped from the requested season(s)
    pub skipped_groups: usize,
    pub warnings: Vec<String>,
    pub generated_at: DateTime<Utc>,
}

/// Head-to-head response payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HeadToHeadPayload {
    pub league_id: String,
    pub records: Vec<HeadToHeadRecord>,
    pub perspective: Perspective,
    pub no_data: bool,
    /// Malformed matchup groups dropped from the requested season(s)
    pub skipped_groups: usize,
    pub warnings: Vec<String>,
    pub generated_at: DateTime<Utc>,
}

/// Streaks response payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StreaksPayload {
    pub league_id: String,
    pub season: Option<Season>,
    pub streaks: Vec<ManagerStreaks>,
    pub records: Vec<StreakRecordHolder>,
    pub no_data: bool,
    /// Malformed matchup groups dropped from the requested season(s)
    pub skipped_groups: usize,
    pub warnings: Vec<String>,
    pub generated_at: DateTime<Utc>,
}

/// Matchups response payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchupsPayload {
    pub league_id: String,
    pub matchups: Vec<MatchupView>,
    pub summary: MatchupSummary,
    pub no_data: bool,
    /// Malformed matchup groups dropped from the requested season(s)
    pub skipped_groups: usize,
    pub warnings: Vec<String>,
    pub generated_at: DateTime<Utc>,
}

/// Per-league context every request resolves before running the engine
struct LeagueContext {
    schedule: PlayoffSchedule,
    directory: ManagerDirectory,
    report: IngestReport,
}

impl LeagueContext {
    /// Skipped-group count and warnings limited to the requested season
    fn scoped_report(&self, season: Option<Season>) -> (usize, Vec<String>) {
        let scoped = self.report.for_season(season);
        (scoped.skipped_groups(), scoped.warnings())
    }
}

/// Hosts the engine over an injected repository
pub struct AnalyticsService<R: LeagueRepository> {
    repository: R,
    config: AnalyticsConfig,
    fetch_timeout: Duration,
}

impl<R: LeagueRepository> AnalyticsService<R> {
    pub fn new(repository: R, config: AnalyticsConfig, fetch_timeout: Duration) -> Self {
        Self { repository, config, fetch_timeout }
    }

    pub fn repository(&self) -> &R {
        &self.repository
    }

    /// Ranked standings, with playoff seeds for regular-season requests
    pub async fn standings(&self, request: &AnalyticsRequest) -> Result<StandingsPayload> {
        info!(league_id = %request.league_id, season = ?request.season, "Computing standings");
        let context = self.context(&request.league_id).await?;
        let rows = self
            .fetch("weekly_scores", self.repository.weekly_scores(&request.row_query()))
            .await?;

        let report = StandingsAggregator::new(&context.schedule)
            .with_directory(&context.directory)
            .aggregate(&rows, &request.standings_query())?;
        let playoff_seeds = if report.include_playoffs {
            Vec::new()
        } else {
            seed_playoffs(&report, &context.schedule)?
        };

        let (skipped_groups, warnings) = context.scoped_report(request.season);
        Ok(StandingsPayload {
            league_id: request.league_id.clone(),
            standings: report.rows,
            seasons: report.seasons,
            include_playoffs: report.include_playoffs,
            playoff_seeds,
            no_data: report.no_data,
            skipped_groups,
            warnings,
            generated_at: Utc::now(),
        })
    }

    /// Pairwise records
    pub async fn head_to_head(&self, request: &AnalyticsRequest) -> Result<HeadToHeadPayload> {
        info!(league_id = %request.league_id, season = ?request.season, "Computing head-to-head");
        let context = self.context(&request.league_id).await?;
        let matchups =
            self.fetch("matchups", self.repository.matchups(&request.row_query())).await?;

        let report = HeadToHeadCalculator::new()
            .with_directory(&context.directory)
            .calculate(&matchups, &request.head_to_head_query())?;

        let (skipped_groups, warnings) = context.scoped_report(request.season);
        Ok(HeadToHeadPayload {
            league_id: request.league_id.clone(),
            records: report.records,
            perspective: report.perspective,
            no_data: report.no_data,
            skipped_groups,
            warnings,
            generated_at: Utc::now(),
        })
    }

    /// Current and longest streaks plus league-wide record holders
    pub async fn streaks(&self, request: &AnalyticsRequest) -> Result<StreaksPayload> {
        info!(league_id = %request.league_id, season = ?request.season, "Computing streaks");
        let context = self.context(&request.league_id).await?;
        let rows = self
            .fetch("weekly_scores", self.repository.weekly_scores(&request.row_query()))
            .await?;

        let report = StreakEngine::new(&context.schedule)
            .with_directory(&context.directory)
            .report(&rows, &request.streak_query());

        let (skipped_groups, warnings) = context.scoped_report(request.season);
        Ok(StreaksPayload {
            league_id: request.league_id.clone(),
            season: report.season,
            streaks: report.managers,
            records: report.records,
            no_data: report.no_data,
            skipped_groups,
            warnings,
            generated_at: Utc::now(),
        })
    }

    /// Labelled matchups with a summary
    pub async fn matchups(&self, request: &AnalyticsRequest) -> Result<MatchupsPayload> {
        info!(league_id = %request.league_id, season = ?request.season, "Listing matchups");
        let context = self.context(&request.league_id).await?;
        let matchups =
            self.fetch("matchups", self.repository.matchups(&request.row_query())).await?;

        let report = PlayoffBracketClassifier::new(&context.schedule)
            .with_thresholds(self.config.matchups.clone())
            .with_directory(&context.directory)
            .report(&matchups, &request.matchup_filter())?;

        let (skipped_groups, warnings) = context.scoped_report(request.season);
        Ok(MatchupsPayload {
            league_id: request.league_id.clone(),
            matchups: report.matchups,
            summary: report.summary,
            no_data: report.no_data,
            skipped_groups,
            warnings,
            generated_at: Utc::now(),
        })
    }

    /// Run one operation and wrap the outcome in the response envelope
    pub async fn handle(&self, operation: Operation, request: &AnalyticsRequest) -> ApiResponse {
        match operation {
            Operation::Standings => ApiResponse::from_result(&self.standings(request).await),
            Operation::HeadToHead => ApiResponse::from_result(&self.head_to_head(request).await),
            Operation::Streaks => ApiResponse::from_result(&self.streaks(request).await),
            Operation::Matchups => ApiResponse::from_result(&self.matchups(request).await),
        }
    }

    async fn context(&self, league_id: &str) -> Result<LeagueContext> {
        let seasons = self.fetch("season_settings", self.repository.season_settings(league_id)).await?;
        let managers = self.fetch("managers", self.repository.managers(league_id)).await?;
        let report = self.fetch("ingest_report", self.repository.ingest_report(league_id)).await?;

        Ok(LeagueContext {
            schedule: self.config.schedule(seasons),
            directory: ManagerDirectory::new(&managers),
            report,
        })
    }

    /// Await a repository call under the fetch timeout; no retries
    async fn fetch<T>(
        &self,
        operation: &str,
        call: impl Future<Output = league_store::Result<T>>,
    ) -> Result<T> {
        match tokio::time::timeout(self.fetch_timeout, call).await {
            Ok(result) => Ok(result?),
            Err(_) => Err(ServiceError::timeout(operation, self.fetch_timeout.as_millis() as u64)),
        }
    }
}

/// The four request kinds the service answers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Standings,
    HeadToHead,
    Streaks,
    Matchups,
}
