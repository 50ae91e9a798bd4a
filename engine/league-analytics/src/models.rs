//! # League Records
//!
//! Strict row types consumed by every analytics component. Rows reach these types
//! through [`crate::ingestion`], which is the only place loosely-typed input is
//! accepted.

use crate::error::Result;
use crate::rounding;
use crate::{DEFAULT_PLAYOFF_TEAMS, DEFAULT_PLAYOFF_WEEK_START, UNKNOWN_MANAGER_LABEL};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

pub type ManagerId = String;
pub type Season = i32;
pub type Week = u32;

/// Outcome of one weekly comparison (head-to-head or median)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WeekOutcome {
    Win,
    Loss,
    /// Bye, tie, or a week that has not been resolved
    #[default]
    NoResult,
}

impl WeekOutcome {
    /// Convert a nullable win flag as stored by upstream sources
    pub fn from_nullable(flag: Option<bool>) -> Self {
        match flag {
            Some(true) => Self::Win,
            Some(false) => Self::Loss,
            None => Self::NoResult,
        }
    }

    /// Compare a score against an opponent score; equal scores are unresolved
    pub fn from_scores(points: Decimal, other: Decimal) -> Self {
        match points.cmp(&other) {
            std::cmp::Ordering::Greater => Self::Win,
            std::cmp::Ordering::Less => Self::Loss,
            std::cmp::Ordering::Equal => Self::NoResult,
        }
    }

    pub fn is_decided(self) -> bool {
        !matches!(self, Self::NoResult)
    }
}

/// One manager's result for one week of one season
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeeklyScoreRecord {
    pub manager_id: ManagerId,
    pub season: Season,
    pub week: Week,
    pub points_for: Decimal,
    pub points_against: Decimal,
    pub h2h_result: WeekOutcome,
    pub median_result: WeekOutcome,
    pub all_play_wins: u32,
    pub all_play_losses: u32,
}

impl WeeklyScoreRecord {
    /// Chronological sort key
    pub fn chronology(&self) -> (Season, Week) {
        (self.season, self.week)
    }
}

/// One head-to-head pairing for one week, carrying both sides
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchupRecord {
    pub season: Season,
    pub week: Week,
    pub matchup_id: u32,
    pub team1_manager_id: ManagerId,
    pub team1_points: Decimal,
    pub team2_manager_id: ManagerId,
    pub team2_points: Decimal,
    pub winner_manager_id: Option<ManagerId>,
    pub is_playoff: bool,
    pub is_toilet_bowl: bool,
    pub playoff_round: Option<u32>,
}

impl MatchupRecord {
    /// Absolute point difference between the two sides
    pub fn point_differential(&self) -> Result<Decimal> {
        Ok(rounding::checked_margin("point_differential", self.team1_points, self.team2_points)?.abs())
    }

    pub fn involves(&self, manager_id: &str) -> bool {
        self.team1_manager_id == manager_id || self.team2_manager_id == manager_id
    }

    /// The same matchup seen from team2's side
    pub fn mirrored(&self) -> Self {
        Self {
            team1_manager_id: self.team2_manager_id.clone(),
            team1_points: self.team2_points,
            team2_manager_id: self.team1_manager_id.clone(),
            team2_points: self.team1_points,
            ..self.clone()
        }
    }
}

/// One team's raw score for one week, before median / all-play / h2h derivation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeamWeekScore {
    pub manager_id: ManagerId,
    pub season: Season,
    pub week: Week,
    /// Absent for a bye week
    pub matchup_id: Option<u32>,
    pub points: Decimal,
    pub is_playoff: bool,
    pub is_toilet_bowl: bool,
    pub playoff_round: Option<u32>,
}

/// Per-season playoff settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeasonPlayoffConfig {
    pub season: Season,
    pub playoff_week_start: Option<Week>,
    pub playoff_teams: Option<u32>,
}

/// Playoff settings for every season of a league, with fallbacks for seasons that
/// have none configured
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayoffSchedule {
    default_week_start: Week,
    default_playoff_teams: u32,
    seasons: HashMap<Season, SeasonPlayoffConfig>,
}

impl Default for PlayoffSchedule {
    fn default() -> Self {
        Self::with_defaults(DEFAULT_PLAYOFF_WEEK_START, DEFAULT_PLAYOFF_TEAMS, Vec::new())
    }
}

impl PlayoffSchedule {
    /// Build a schedule using the standard fallbacks
    pub fn new(configs: impl IntoIterator<Item = SeasonPlayoffConfig>) -> Self {
        Self::with_defaults(DEFAULT_PLAYOFF_WEEK_START, DEFAULT_PLAYOFF_TEAMS, configs)
    }

    /// Build a schedule with custom fallbacks
    pub fn with_defaults(
        default_week_start: Week,
        default_playoff_teams: u32,
        configs: impl IntoIterator<Item = SeasonPlayoffConfig>,
    ) -> Self {
        let seasons = configs.into_iter().map(|c| (c.season, c)).collect();
        Self { default_week_start, default_playoff_teams, seasons }
    }

    pub fn playoff_week_start(&self, season: Season) -> Week {
        self.seasons
            .get(&season)
            .and_then(|c| c.playoff_week_start)
            .unwrap_or(self.default_week_start)
    }

    pub fn playoff_teams(&self, season: Season) -> u32 {
        self.seasons
            .get(&season)
            .and_then(|c| c.playoff_teams)
            .unwrap_or(self.default_playoff_teams)
    }

    pub fn is_playoff_week(&self, season: Season, week: Week) -> bool {
        week >= self.playoff_week_start(season)
    }
}

/// Manager identity as known to the league
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManagerIdentity {
    pub id: ManagerId,
    pub nickname: Option<String>,
    pub display_name: Option<String>,
    pub username: Option<String>,
}

impl ManagerIdentity {
    /// Nickname, then display name, then username
    pub fn label(&self) -> String {
        [&self.nickname, &self.display_name, &self.username]
            .into_iter()
            .flatten()
            .map(|s| s.trim())
            .find(|s| !s.is_empty())
            .unwrap_or(UNKNOWN_MANAGER_LABEL)
            .to_string()
    }
}

/// Label lookup for managers; unknown ids resolve to "Unknown"
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ManagerDirectory {
    labels: HashMap<ManagerId, String>,
}

impl ManagerDirectory {
    pub fn new(identities: &[ManagerIdentity]) -> Self {
        let labels = identities.iter().map(|m| (m.id.clone(), m.label())).collect();
        Self { labels }
    }

    pub fn label(&self, manager_id: &str) -> &str {
        self.labels.get(manager_id).map(String::as_str).unwrap_or(UNKNOWN_MANAGER_LABEL)
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}

/// Resolve a label through an optional directory
pub(crate) fn label_for(directory: Option<&ManagerDirectory>, manager_id: &str) -> String {
    directory.map(|d| d.label(manager_id)).unwrap_or(UNKNOWN_MANAGER_LABEL).to_string()
}
