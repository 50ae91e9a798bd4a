//! # League Analytics
//!
//! Aggregation and streak detection over fantasy-league weekly results.
//!
//! The engine turns a flat, already-fetched set of weekly rows into ranked
//! standings, directional head-to-head tables, current and longest streaks, and
//! playoff round labels. Every component is a pure, synchronous fold over the rows
//! it is handed: nothing here talks to a data source or keeps state between calls.
//!
//! ## Components
//!
//! - **models**: strict row types and the tri-state [`WeekOutcome`]
//! - **standings**: [`StandingsAggregator`]
//! - **head_to_head**: [`HeadToHeadCalculator`]
//! - **streaks**: [`StreakEngine`]
//! - **playoffs**: [`classify`] and [`PlayoffBracketClassifier`]
//! - **ingestion**: parsing loosely-typed rows into the strict types, and deriving
//!   median / all-play / h2h results from raw per-team scores

pub mod config;
pub mod error;
pub mod head_to_head;
pub mod ingestion;
pub mod models;
pub mod playoffs;
pub mod rounding;
pub mod standings;
pub mod streaks;

// Re-export main types for easy usage
pub use config::{AnalyticsConfig, MatchupThresholds, PlayoffDefaults};
pub use error::{AnalyticsError, Result};
pub use head_to_head::{
    HeadToHeadCalculator, HeadToHeadQuery, HeadToHeadRecord, HeadToHeadReport, MatchupType,
    Perspective,
};
pub use ingestion::{DerivedWeeks, IngestReport, SkippedGroup};
pub use models::{
    ManagerDirectory, ManagerId, ManagerIdentity, MatchupRecord, PlayoffSchedule, Season,
    SeasonPlayoffConfig, TeamWeekScore, Week, WeekOutcome, WeeklyScoreRecord,
};
pub use playoffs::{
    classify, MatchupFilter, MatchupReport, MatchupSummary, MatchupView, PlayoffBracketClassifier,
};
pub use standings::{
    seed_playoffs, PlayoffSeed, StandingsAggregator, StandingsQuery, StandingsReport, StandingsRow,
};
pub use streaks::{
    CurrentStreak, LongestStreak, LongestStreaks, ManagerStreaks, StreakEngine, StreakKind,
    StreakQuery, StreakRecordHolder, StreakReport, StreakType,
};

/// Current version of the engine
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Playoff start week used when a season has no configured value
pub const DEFAULT_PLAYOFF_WEEK_START: Week = 15;

/// Number of playoff seeds used when a season has no configured value
pub const DEFAULT_PLAYOFF_TEAMS: u32 = 6;

/// Largest single-week score accepted from raw rows
pub const MAX_WEEKLY_POINTS: i64 = 100_000;

/// Largest per-week all-play count accepted from raw rows
pub const MAX_ALL_PLAY_OPPONENTS: u32 = 1_000;

/// Label used when a manager has no usable name
pub const UNKNOWN_MANAGER_LABEL: &str = "Unknown";
