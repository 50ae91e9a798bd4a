//! # Row Ingestion
//!
//! The boundary where loosely-typed rows from a store or sync job become the strict
//! record types in [`crate::models`]. Numbers may arrive as JSON numbers or strings,
//! manager ids as strings or integers, and weekly results as nullable booleans.
//!
//! Also derives median, all-play and head-to-head results from raw per-team
//! weekly scores for sources that do not precompute them.

use crate::error::{AnalyticsError, Result};
use crate::models::{
    ManagerIdentity, MatchupRecord, SeasonPlayoffConfig, TeamWeekScore, WeekOutcome,
    WeeklyScoreRecord,
};
use crate::models::{ManagerId, Season, Week};
use crate::{MAX_ALL_PLAY_OPPONENTS, MAX_WEEKLY_POINTS};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::str::FromStr;
use tracing::{debug, warn};

/// Weekly score row as stored upstream
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RawWeeklyScoreRow {
    #[serde(alias = "managerId")]
    pub manager_id: Option<Value>,
    pub season: Option<Value>,
    pub week: Option<Value>,
    #[serde(alias = "pointsFor")]
    pub points_for: Option<Value>,
    #[serde(alias = "pointsAgainst")]
    pub points_against: Option<Value>,
    /// `true` win, `false` loss, `null` no result
    #[serde(alias = "h2hWin")]
    pub h2h_win: Option<bool>,
    #[serde(alias = "medianWin")]
    pub median_win: Option<bool>,
    #[serde(alias = "allPlayWins")]
    pub all_play_wins: Option<Value>,
    #[serde(alias = "allPlayLosses")]
    pub all_play_losses: Option<Value>,
}

/// Matchup row as stored upstream
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RawMatchupRow {
    pub season: Option<Value>,
    pub week: Option<Value>,
    #[serde(alias = "matchupId")]
    pub matchup_id: Option<Value>,
    #[serde(alias = "team1ManagerId")]
    pub team1_manager_id: Option<Value>,
    #[serde(alias = "team1Points")]
    pub team1_points: Option<Value>,
    #[serde(alias = "team2ManagerId")]
    pub team2_manager_id: Option<Value>,
    #[serde(alias = "team2Points")]
    pub team2_points: Option<Value>,
    #[serde(alias = "winnerManagerId")]
    pub winner_manager_id: Option<Value>,
    #[serde(alias = "isPlayoff")]
    pub is_playoff: Option<bool>,
    #[serde(alias = "isToiletBowl")]
    pub is_toilet_bowl: Option<bool>,
    #[serde(alias = "playoffRound")]
    pub playoff_round: Option<Value>,
}

/// One team's raw weekly score
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RawTeamWeekRow {
    #[serde(alias = "managerId")]
    pub manager_id: Option<Value>,
    pub season: Option<Value>,
    pub week: Option<Value>,
    #[serde(alias = "matchupId")]
    pub matchup_id: Option<Value>,
    pub points: Option<Value>,
    #[serde(alias = "isPlayoff")]
    pub is_playoff: Option<bool>,
    #[serde(alias = "isToiletBowl")]
    pub is_toilet_bowl: Option<bool>,
    #[serde(alias = "playoffRound")]
    pub playoff_round: Option<Value>,
}

/// Per-season league settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RawSeasonSettings {
    pub season: Option<Value>,
    #[serde(alias = "playoffWeekStart")]
    pub playoff_week_start: Option<Value>,
    #[serde(alias = "playoffTeams")]
    pub playoff_teams: Option<Value>,
}

/// Manager row
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RawManager {
    #[serde(alias = "user_id", alias = "userId")]
    pub id: Option<Value>,
    pub nickname: Option<String>,
    #[serde(alias = "displayName")]
    pub display_name: Option<String>,
    pub username: Option<String>,
}

/// A matchup group that did not resolve to exactly two sides
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkippedGroup {
    pub season: Season,
    pub week: Week,
    pub matchup_id: u32,
    pub sides: usize,
}

impl SkippedGroup {
    pub fn to_error(self) -> AnalyticsError {
        AnalyticsError::DataIntegrity {
            season: self.season,
            week: self.week,
            matchup_id: self.matchup_id,
            sides: self.sides,
        }
    }
}

/// Anomalies absorbed during ingestion
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IngestReport {
    pub skipped: Vec<SkippedGroup>,
}

impl IngestReport {
    pub fn is_clean(&self) -> bool {
        self.skipped.is_empty()
    }

    pub fn skipped_groups(&self) -> usize {
        self.skipped.len()
    }

    /// One human-readable line per skipped group
    pub fn warnings(&self) -> Vec<String> {
        self.skipped.iter().map(|group| group.to_error().to_string()).collect()
    }

    /// The part of the report that touches `season`; `None` keeps everything
    pub fn for_season(&self, season: Option<Season>) -> IngestReport {
        IngestReport {
            skipped: self
                .skipped
                .iter()
                .filter(|group| season.map_or(true, |s| s == group.season))
                .copied()
                .collect(),
        }
    }
}

/// Weekly scores and matchups derived from raw per-team rows
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DerivedWeeks {
    pub weekly_scores: Vec<WeeklyScoreRecord>,
    pub matchups: Vec<MatchupRecord>,
    pub report: IngestReport,
}

// ---------------------------------------------------------------------------
// Field parsing
// ---------------------------------------------------------------------------

fn require<'v>(field: &str, value: &'v Option<Value>) -> Result<&'v Value> {
    match value {
        Some(Value::Null) | None => Err(AnalyticsError::validation(field, "missing value")),
        Some(v) => Ok(v),
    }
}

fn parse_id(field: &str, value: &Value) -> Result<ManagerId> {
    let id = match value {
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        other => return Err(AnalyticsError::validation(field, format!("expected an id, got {other}"))),
    };
    if id.is_empty() {
        return Err(AnalyticsError::validation(field, "empty id"));
    }
    Ok(id)
}

fn parse_integer(field: &str, value: &Value) -> Result<i64> {
    let parsed = match value {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse::<i64>().ok(),
        _ => None,
    };
    parsed.ok_or_else(|| AnalyticsError::validation(field, format!("expected an integer, got {value}")))
}

fn parse_decimal(field: &str, value: &Value) -> Result<Decimal> {
    let text = match value {
        Value::Number(n) => n.to_string(),
        Value::String(s) => s.trim().to_string(),
        _ => String::new(),
    };
    Decimal::from_str(&text)
        .or_else(|_| Decimal::from_scientific(&text))
        .map_err(|_| AnalyticsError::validation(field, format!("expected a number, got {value}")))
}

fn parse_points(field: &str, value: &Value) -> Result<Decimal> {
    let points = parse_decimal(field, value)?;
    if points.is_sign_negative() && !points.is_zero() {
        return Err(AnalyticsError::validation(field, format!("points must be non-negative, got {points}")));
    }
    if points > Decimal::from(MAX_WEEKLY_POINTS) {
        return Err(AnalyticsError::validation(
            field,
            format!("points must be at most {MAX_WEEKLY_POINTS}, got {points}"),
        ));
    }
    Ok(points)
}

fn parse_season(field: &str, value: &Value) -> Result<Season> {
    let season = parse_integer(field, value)?;
    if season <= 0 || season > i64::from(i32::MAX) {
        return Err(AnalyticsError::validation(field, format!("season out of range: {season}")));
    }
    Ok(season as Season)
}

fn parse_week(field: &str, value: &Value) -> Result<Week> {
    let week = parse_integer(field, value)?;
    if week < 1 || week > i64::from(u32::MAX) {
        return Err(AnalyticsError::validation(field, format!("week must be at least 1, got {week}")));
    }
    Ok(week as Week)
}

fn parse_u32(field: &str, value: &Value) -> Result<u32> {
    let count = parse_integer(field, value)?;
    u32::try_from(count).map_err(|_| AnalyticsError::validation(field, format!("out of range: {count}")))
}

fn parse_count(field: &str, value: &Option<Value>) -> Result<u32> {
    let count = parse_optional_u32(field, value)?.unwrap_or(0);
    if count > MAX_ALL_PLAY_OPPONENTS {
        return Err(AnalyticsError::validation(
            field,
            format!("count must be at most {MAX_ALL_PLAY_OPPONENTS}, got {count}"),
        ));
    }
    Ok(count)
}

fn parse_optional_u32(field: &str, value: &Option<Value>) -> Result<Option<u32>> {
    match value {
        None | Some(Value::Null) => Ok(None),
        Some(v) => parse_u32(field, v).map(Some),
    }
}

// ---------------------------------------------------------------------------
// Row parsing
// ---------------------------------------------------------------------------

/// Validate weekly score rows; `(manager, season, week)` must be unique
pub fn parse_weekly_scores(rows: &[RawWeeklyScoreRow]) -> Result<Vec<WeeklyScoreRecord>> {
    let mut seen: HashSet<(ManagerId, Season, Week)> = HashSet::new();
    let mut records = Vec::with_capacity(rows.len());

    for (index, row) in rows.iter().enumerate() {
        let field = |name: &str| format!("weekly_scores[{index}].{name}");
        let record = WeeklyScoreRecord {
            manager_id: parse_id(&field("manager_id"), require(&field("manager_id"), &row.manager_id)?)?,
            season: parse_season(&field("season"), require(&field("season"), &row.season)?)?,
            week: parse_week(&field("week"), require(&field("week"), &row.week)?)?,
            points_for: parse_points(&field("points_for"), require(&field("points_for"), &row.points_for)?)?,
            points_against: match &row.points_against {
                None | Some(Value::Null) => Decimal::ZERO,
                Some(v) => parse_points(&field("points_against"), v)?,
            },
            h2h_result: WeekOutcome::from_nullable(row.h2h_win),
            median_result: WeekOutcome::from_nullable(row.median_win),
            all_play_wins: parse_count(&field("all_play_wins"), &row.all_play_wins)?,
            all_play_losses: parse_count(&field("all_play_losses"), &row.all_play_losses)?,
        };

        if !seen.insert((record.manager_id.clone(), record.season, record.week)) {
            return Err(AnalyticsError::validation(
                field("week"),
                format!(
                    "duplicate row for manager {} season {} week {}",
                    record.manager_id, record.season, record.week
                ),
            ));
        }
        records.push(record);
    }

    debug!(rows = records.len(), "Parsed weekly score rows");
    Ok(records)
}

/// Validate matchup rows
pub fn parse_matchups(rows: &[RawMatchupRow]) -> Result<Vec<MatchupRecord>> {
    rows.iter()
        .enumerate()
        .map(|(index, row)| {
            let field = |name: &str| format!("matchups[{index}].{name}");
            let team1 = parse_id(&field("team1_manager_id"), require(&field("team1_manager_id"), &row.team1_manager_id)?)?;
            let team2 = parse_id(&field("team2_manager_id"), require(&field("team2_manager_id"), &row.team2_manager_id)?)?;
            if team1 == team2 {
                return Err(AnalyticsError::validation(
                    field("team2_manager_id"),
                    format!("manager {team1} cannot play themselves"),
                ));
            }

            let winner = match &row.winner_manager_id {
                None | Some(Value::Null) => None,
                Some(v) => {
                    let winner = parse_id(&field("winner_manager_id"), v)?;
                    if winner != team1 && winner != team2 {
                        return Err(AnalyticsError::validation(
                            field("winner_manager_id"),
                            format!("winner {winner} is not one of {team1}, {team2}"),
                        ));
                    }
                    Some(winner)
                }
            };

            Ok(MatchupRecord {
                season: parse_season(&field("season"), require(&field("season"), &row.season)?)?,
                week: parse_week(&field("week"), require(&field("week"), &row.week)?)?,
                matchup_id: parse_u32(&field("matchup_id"), require(&field("matchup_id"), &row.matchup_id)?)?,
                team1_points: parse_points(&field("team1_points"), require(&field("team1_points"), &row.team1_points)?)?,
                team2_points: parse_points(&field("team2_points"), require(&field("team2_points"), &row.team2_points)?)?,
                team1_manager_id: team1,
                team2_manager_id: team2,
                winner_manager_id: winner,
                is_playoff: row.is_playoff.unwrap_or(false),
                is_toilet_bowl: row.is_toilet_bowl.unwrap_or(false),
                playoff_round: parse_optional_u32(&field("playoff_round"), &row.playoff_round)?,
            })
        })
        .collect()
}

/// Validate raw per-team weekly rows
pub fn parse_team_weeks(rows: &[RawTeamWeekRow]) -> Result<Vec<TeamWeekScore>> {
    rows.iter()
        .enumerate()
        .map(|(index, row)| {
            let field = |name: &str| format!("team_weeks[{index}].{name}");
            Ok(TeamWeekScore {
                manager_id: parse_id(&field("manager_id"), require(&field("manager_id"), &row.manager_id)?)?,
                season: parse_season(&field("season"), require(&field("season"), &row.season)?)?,
                week: parse_week(&field("week"), require(&field("week"), &row.week)?)?,
                matchup_id: parse_optional_u32(&field("matchup_id"), &row.matchup_id)?,
                points: parse_points(&field("points"), require(&field("points"), &row.points)?)?,
                is_playoff: row.is_playoff.unwrap_or(false),
                is_toilet_bowl: row.is_toilet_bowl.unwrap_or(false),
                playoff_round: parse_optional_u32(&field("playoff_round"), &row.playoff_round)?,
            })
        })
        .collect()
}

/// Validate per-season settings; a missing playoff start is left to the schedule default
pub fn parse_season_settings(rows: &[RawSeasonSettings]) -> Result<Vec<SeasonPlayoffConfig>> {
    rows.iter()
        .enumerate()
        .map(|(index, row)| {
            let field = |name: &str| format!("seasons[{index}].{name}");
            let playoff_week_start = match &row.playoff_week_start {
                None | Some(Value::Null) => None,
                Some(v) => Some(parse_week(&field("playoff_week_start"), v)?),
            };
            Ok(SeasonPlayoffConfig {
                season: parse_season(&field("season"), require(&field("season"), &row.season)?)?,
                playoff_week_start,
                playoff_teams: parse_optional_u32(&field("playoff_teams"), &row.playoff_teams)?,
            })
        })
        .collect()
}

/// Validate manager rows
pub fn parse_managers(rows: &[RawManager]) -> Result<Vec<ManagerIdentity>> {
    rows.iter()
        .enumerate()
        .map(|(index, row)| {
            let field = format!("managers[{index}].id");
            Ok(ManagerIdentity {
                id: parse_id(&field, require(&field, &row.id)?)?,
                nickname: row.nickname.clone(),
                display_name: row.display_name.clone(),
                username: row.username.clone(),
            })
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Result derivation
// ---------------------------------------------------------------------------

/// Median of a week's scores; mean of the middle two for an even count
pub fn weekly_median(points: &[Decimal]) -> Option<Decimal> {
    if points.is_empty() {
        return None;
    }
    let mut sorted = points.to_vec();
    sorted.sort();
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        let (low, high) = (sorted[mid - 1], sorted[mid]);
        let two = Decimal::from(2);
        // Same-sign extremes overflow the sum but not the gap
        Some(low.checked_add(high).map_or_else(|| low + (high - low) / two, |sum| sum / two))
    } else {
        Some(sorted[mid])
    }
}

/// Wins and losses against every score in `field`; equal scores count for neither
pub fn all_play_record(points: Decimal, field: &[Decimal]) -> (u32, u32) {
    field.iter().fold((0, 0), |(wins, losses), other| match points.cmp(other) {
        std::cmp::Ordering::Greater => (wins + 1, losses),
        std::cmp::Ordering::Less => (wins, losses + 1),
        std::cmp::Ordering::Equal => (wins, losses),
    })
}

/// Derive weekly results and matchups from raw per-team scores.
///
/// Matchup groups with other than two sides are skipped and counted; their teams
/// keep a `NoResult` head-to-head outcome, as do teams on a bye.
pub fn derive_week_results(scores: &[TeamWeekScore]) -> Result<DerivedWeeks> {
    let mut weeks: BTreeMap<(Season, Week), Vec<&TeamWeekScore>> = BTreeMap::new();
    let mut seen: HashSet<(&str, Season, Week)> = HashSet::new();

    for score in scores {
        if !seen.insert((score.manager_id.as_str(), score.season, score.week)) {
            return Err(AnalyticsError::validation(
                "team_weeks",
                format!(
                    "duplicate row for manager {} season {} week {}",
                    score.manager_id, score.season, score.week
                ),
            ));
        }
        weeks.entry((score.season, score.week)).or_default().push(score);
    }

    let mut derived = DerivedWeeks::default();
    for ((season, week), teams) in weeks {
        derive_week(season, week, &teams, &mut derived);
    }

    debug!(
        weekly_scores = derived.weekly_scores.len(),
        matchups = derived.matchups.len(),
        skipped_groups = derived.report.skipped_groups(),
        "Derived weekly results from team scores"
    );
    Ok(derived)
}

fn derive_week(season: Season, week: Week, teams: &[&TeamWeekScore], derived: &mut DerivedWeeks) {
    let field: Vec<Decimal> = teams.iter().map(|t| t.points).collect();
    let median = weekly_median(&field).unwrap_or_default();

    // Group by matchup id in first-seen order
    let mut groups: Vec<(u32, Vec<usize>)> = Vec::new();
    let mut group_index: HashMap<u32, usize> = HashMap::new();
    for (index, team) in teams.iter().enumerate() {
        let Some(matchup_id) = team.matchup_id else { continue };
        let slot = *group_index.entry(matchup_id).or_insert_with(|| {
            groups.push((matchup_id, Vec::new()));
            groups.len() - 1
        });
        groups[slot].1.push(index);
    }

    // Opponent index for every team in a well-formed pair
    let mut opponents: HashMap<usize, usize> = HashMap::new();
    for (matchup_id, members) in &groups {
        if let &[first, second] = members.as_slice() {
            opponents.insert(first, second);
            opponents.insert(second, first);

            let (team1, team2) = (teams[first], teams[second]);
            let winner = match WeekOutcome::from_scores(team1.points, team2.points) {
                WeekOutcome::Win => Some(team1.manager_id.clone()),
                WeekOutcome::Loss => Some(team2.manager_id.clone()),
                WeekOutcome::NoResult => None,
            };
            derived.matchups.push(MatchupRecord {
                season,
                week,
                matchup_id: *matchup_id,
                team1_manager_id: team1.manager_id.clone(),
                team1_points: team1.points,
                team2_manager_id: team2.manager_id.clone(),
                team2_points: team2.points,
                winner_manager_id: winner,
                is_playoff: team1.is_playoff,
                is_toilet_bowl: team1.is_toilet_bowl,
                playoff_round: team1.playoff_round,
            });
        } else {
            let group = SkippedGroup { season, week, matchup_id: *matchup_id, sides: members.len() };
            warn!("Skipping malformed matchup group: {}", group.to_error());
            derived.report.skipped.push(group);
        }
    }

    for (index, team) in teams.iter().enumerate() {
        let (h2h_result, points_against) = match opponents.get(&index) {
            Some(&opponent) => {
                let other = teams[opponent].points;
                (WeekOutcome::from_scores(team.points, other), other)
            }
            None => (WeekOutcome::NoResult, Decimal::ZERO),
        };
        let median_result = if team.points > median { WeekOutcome::Win } else { WeekOutcome::Loss };
        let (all_play_wins, all_play_losses) = all_play_record(team.points, &field);

        derived.weekly_scores.push(WeeklyScoreRecord {
            manager_id: team.manager_id.clone(),
            season,
            week,
            points_for: team.points,
            points_against,
            h2h_result,
            median_result,
            all_play_wins,
            all_play_losses,
        });
    }
}
