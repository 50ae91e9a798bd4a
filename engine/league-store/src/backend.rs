//! Repository trait and implementations

use crate::config::{
    validate_league_id, StoreConfig, MANAGERS_FILE, MATCHUPS_FILE, SEASONS_FILE, TEAM_WEEKS_FILE,
    WEEKLY_SCORES_FILE,
};
use crate::error::{Result, StoreError};
use league_analytics::ingestion::{
    self, DerivedWeeks, IngestReport, RawManager, RawMatchupRow, RawSeasonSettings,
    RawTeamWeekRow, RawWeeklyScoreRow,
};
use league_analytics::{
    AnalyticsError, ManagerIdentity, MatchupRecord, Season, SeasonPlayoffConfig, TeamWeekScore,
    Week, WeeklyScoreRecord,
};
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::RwLock;

/// Row scope for a fetch
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RowQuery {
    pub league_id: String,
    /// Absent means every season
    pub season: Option<Season>,
    pub week: Option<Week>,
}

impl RowQuery {
    /// All rows for one league
    pub fn league(league_id: impl Into<String>) -> Self {
        Self { league_id: league_id.into(), ..Default::default() }
    }

    pub fn with_season(mut self, season: Option<Season>) -> Self {
        self.season = season;
        self
    }

    pub fn with_week(mut self, week: Option<Week>) -> Self {
        self.week = week;
        self
    }

    fn matches(&self, season: Season, week: Week) -> bool {
        self.season.map_or(true, |s| s == season) && self.week.map_or(true, |w| w == week)
    }
}

/// Everything the engine needs for one league, already validated
#[derive(Debug, Clone, Default)]
pub struct LeagueData {
    pub weekly_scores: Vec<WeeklyScoreRecord>,
    pub matchups: Vec<MatchupRecord>,
    pub seasons: Vec<SeasonPlayoffConfig>,
    pub managers: Vec<ManagerIdentity>,
    pub report: IngestReport,
}

impl LeagueData {
    /// Build league data from raw per-team scores
    pub fn from_team_weeks(scores: &[TeamWeekScore]) -> Result<Self> {
        let DerivedWeeks { weekly_scores, matchups, report } =
            ingestion::derive_week_results(scores)?;
        Ok(Self { weekly_scores, matchups, report, ..Default::default() })
    }
}

/// Abstract trait for league row sources
#[async_trait::async_trait]
pub trait LeagueRepository: Send + Sync {
    /// Initialize the repository
    async fn initialize(&mut self) -> Result<()>;

    /// Weekly score rows in scope
    async fn weekly_scores(&self, query: &RowQuery) -> Result<Vec<WeeklyScoreRecord>>;

    /// Matchup rows in scope
    async fn matchups(&self, query: &RowQuery) -> Result<Vec<MatchupRecord>>;

    /// Per-season playoff settings; empty when the league has none stored
    async fn season_settings(&self, league_id: &str) -> Result<Vec<SeasonPlayoffConfig>>;

    /// Manager identities; empty when the league has none stored
    async fn managers(&self, league_id: &str) -> Result<Vec<ManagerIdentity>>;

    /// Anomalies absorbed while ingesting the league's rows
    async fn ingest_report(&self, league_id: &str) -> Result<IngestReport>;

    /// Get the configuration
    fn config(&self) -> &StoreConfig;
}

/// Local JSON-file repository.
///
/// Each league lives in `<data_dir>/<league_id>/` with `weekly_scores.json`
/// (or `team_weeks.json`), `matchups.json`, `seasons.json` and `managers.json`.
pub struct LocalRepository {
    config: StoreConfig,
    initialized: bool,
}

impl LocalRepository {
    /// Create a new local repository
    pub fn new(config: StoreConfig) -> Result<Self> {
        config.validate().map_err(StoreError::config)?;
        Ok(Self { config, initialized: false })
    }

    /// Create a new local repository with default config
    pub fn with_default_config(data_dir: impl Into<PathBuf>) -> Result<Self> {
        Self::new(StoreConfig::new(data_dir))
    }

    /// Get the data directory
    pub fn data_dir(&self) -> &PathBuf {
        &self.config.data_dir
    }

    fn ensure_initialized(&self) -> Result<()> {
        if !self.initialized {
            return Err(StoreError::invalid_operation("League repository not initialized"));
        }
        Ok(())
    }

    async fn league_dir(&self, league_id: &str) -> Result<PathBuf> {
        self.ensure_initialized()?;
        validate_league_id(league_id)
            .map_err(|message| AnalyticsError::validation("league_id", message))?;

        let dir = self.config.league_dir(league_id);
        if !tokio::fs::try_exists(&dir).await? {
            return Err(StoreError::league_not_found(league_id));
        }
        Ok(dir)
    }

    /// Weekly scores and matchups, deriving them from per-team rows when needed
    async fn load_weeks(&self, league_id: &str) -> Result<DerivedWeeks> {
        let dir = self.league_dir(league_id).await?;

        let stored_matchups = match read_rows::<RawMatchupRow>(&dir.join(MATCHUPS_FILE)).await? {
            Some(rows) => Some(ingestion::parse_matchups(&rows)?),
            None => None,
        };

        if let Some(rows) = read_rows::<RawWeeklyScoreRow>(&dir.join(WEEKLY_SCORES_FILE)).await? {
            return Ok(DerivedWeeks {
                weekly_scores: ingestion::parse_weekly_scores(&rows)?,
                matchups: stored_matchups.unwrap_or_default(),
                report: IngestReport::default(),
            });
        }

        if let Some(rows) = read_rows::<RawTeamWeekRow>(&dir.join(TEAM_WEEKS_FILE)).await? {
            let scores = ingestion::parse_team_weeks(&rows)?;
            let mut derived = ingestion::derive_week_results(&scores)?;
            if let Some(matchups) = stored_matchups {
                derived.matchups = matchups;
            }
            return Ok(derived);
        }

        tracing::debug!("League {} has no weekly rows", league_id);
        Ok(DerivedWeeks { matchups: stored_matchups.unwrap_or_default(), ..Default::default() })
    }
}

/// Read a JSON array of rows; `None` when the file does not exist
async fn read_rows<T: DeserializeOwned>(path: &Path) -> Result<Option<Vec<T>>> {
    match tokio::fs::read_to_string(path).await {
        Ok(text) => Ok(Some(serde_json::from_str(&text)?)),
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(err) => Err(StoreError::Io(err)),
    }
}

#[async_trait::async_trait]
impl LeagueRepository for LocalRepository {
    async fn initialize(&mut self) -> Result<()> {
        if self.initialized {
            return Ok(());
        }

        // Ensure data directory exists
        tokio::fs::create_dir_all(&self.config.data_dir).await?;

        self.initialized = true;

        tracing::info!("Local league repository initialized at: {:?}", self.config.data_dir);

        Ok(())
    }

    async fn weekly_scores(&self, query: &RowQuery) -> Result<Vec<WeeklyScoreRecord>> {
        let weeks = self.load_weeks(&query.league_id).await?;
        let rows: Vec<WeeklyScoreRecord> =
            weeks.weekly_scores.into_iter().filter(|r| query.matches(r.season, r.week)).collect();
        tracing::debug!("Loaded {} weekly score rows for league {}", rows.len(), query.league_id);
        Ok(rows)
    }

    async fn matchups(&self, query: &RowQuery) -> Result<Vec<MatchupRecord>> {
        let weeks = self.load_weeks(&query.league_id).await?;
        let rows: Vec<MatchupRecord> =
            weeks.matchups.into_iter().filter(|m| query.matches(m.season, m.week)).collect();
        tracing::debug!("Loaded {} matchup rows for league {}", rows.len(), query.league_id);
        Ok(rows)
    }

    async fn season_settings(&self, league_id: &str) -> Result<Vec<SeasonPlayoffConfig>> {
        let dir = self.league_dir(league_id).await?;
        match read_rows::<RawSeasonSettings>(&dir.join(SEASONS_FILE)).await? {
            Some(rows) => Ok(ingestion::parse_season_settings(&rows)?),
            None => Ok(Vec::new()),
        }
    }

    async fn managers(&self, league_id: &str) -> Result<Vec<ManagerIdentity>> {
        let dir = self.league_dir(league_id).await?;
        match read_rows::<RawManager>(&dir.join(MANAGERS_FILE)).await? {
            Some(rows) => Ok(ingestion::parse_managers(&rows)?),
            None => Ok(Vec::new()),
        }
    }

    async fn ingest_report(&self, league_id: &str) -> Result<IngestReport> {
        Ok(self.load_weeks(league_id).await?.report)
    }

    fn config(&self) -> &StoreConfig {
        &self.config
    }
}

/// In-memory repository (for tests and embedding callers)
pub struct InMemoryRepository {
    config: StoreConfig,
    leagues: Arc<RwLock<HashMap<String, LeagueData>>>,
    initialized: bool,
}

impl InMemoryRepository {
    /// Create a new in-memory repository
    pub fn new(config: StoreConfig) -> Self {
        Self { config, leagues: Arc::new(RwLock::new(HashMap::new())), initialized: false }
    }

    /// Create a new in-memory repository with default config
    pub fn with_default_config() -> Self {
        Self::new(StoreConfig::default())
    }

    /// Replace a league's rows
    pub async fn insert_league(&self, league_id: impl Into<String>, data: LeagueData) {
        self.leagues.write().await.insert(league_id.into(), data);
    }

    async fn with_league<T>(&self, league_id: &str, f: impl FnOnce(&LeagueData) -> T) -> Result<T> {
        if !self.initialized {
            return Err(StoreError::invalid_operation("League repository not initialized"));
        }
        let leagues = self.leagues.read().await;
        leagues.get(league_id).map(f).ok_or_else(|| StoreError::league_not_found(league_id))
    }
}

#[async_trait::async_trait]
impl LeagueRepository for InMemoryRepository {
    async fn initialize(&mut self) -> Result<()> {
        if self.initialized {
            return Ok(());
        }

        self.initialized = true;

        tracing::info!("In-memory league repository initialized");

        Ok(())
    }

    async fn weekly_scores(&self, query: &RowQuery) -> Result<Vec<WeeklyScoreRecord>> {
        self.with_league(&query.league_id, |data| {
            data.weekly_scores.iter().filter(|r| query.matches(r.season, r.week)).cloned().collect()
        })
        .await
    }

    async fn matchups(&self, query: &RowQuery) -> Result<Vec<MatchupRecord>> {
        self.with_league(&query.league_id, |data| {
            data.matchups.iter().filter(|m| query.matches(m.season, m.week)).cloned().collect()
        })
        .await
    }

    async fn season_settings(&self, league_id: &str) -> Result<Vec<SeasonPlayoffConfig>> {
        self.with_league(league_id, |data| data.seasons.clone()).await
    }

    async fn managers(&self, league_id: &str) -> Result<Vec<ManagerIdentity>> {
        self.with_league(league_id, |data| data.managers.clone()).await
    }

    async fn ingest_report(&self, league_id: &str) -> Result<IngestReport> {
        self.with_league(league_id, |data| data.report.clone()).await
    }

    fn config(&self) -> &StoreConfig {
        &self.config
    }
}
