//! # Streaks
//!
//! Current and longest win/loss streaks under three win definitions:
//!
//! - `h2h`: the weekly head-to-head result
//! - `median`: the weekly result against the league median
//! - `combined`: both signals interleaved, median before h2h within a week
//!
//! Unresolved weeks are dropped from the sequence rather than breaking it. Runs are
//! not cut at season boundaries, so a longest streak may span the turn of a season;
//! its `season` is the season it started in.

use crate::models::{
    label_for, ManagerDirectory, ManagerId, PlayoffSchedule, Season, Week, WeekOutcome,
    WeeklyScoreRecord,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::debug;

/// Which weekly signal defines a win
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StreakKind {
    H2h,
    Median,
    Combined,
}

impl StreakKind {
    pub const ALL: [StreakKind; 3] = [StreakKind::H2h, StreakKind::Median, StreakKind::Combined];
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StreakType {
    Win,
    Loss,
}

impl StreakType {
    fn outcome(self) -> WeekOutcome {
        match self {
            Self::Win => WeekOutcome::Win,
            Self::Loss => WeekOutcome::Loss,
        }
    }
}

/// The run a manager is currently on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrentStreak {
    pub streak_type: StreakType,
    pub length: u32,
}

impl CurrentStreak {
    /// Positive for a win streak, negative for a loss streak
    pub fn signed_length(&self) -> i64 {
        match self.streak_type {
            StreakType::Win => i64::from(self.length),
            StreakType::Loss => -i64::from(self.length),
        }
    }
}

/// The longest run of one outcome, with where it started and ended
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LongestStreak {
    pub kind: StreakKind,
    pub streak_type: StreakType,
    pub length: u32,
    /// Season the run started in
    pub season: Season,
    pub start_season: Season,
    pub start_week: Week,
    pub end_season: Season,
    pub end_week: Week,
}

/// The six longest-streak figures for one manager
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LongestStreaks {
    pub h2h_win: Option<LongestStreak>,
    pub h2h_loss: Option<LongestStreak>,
    pub median_win: Option<LongestStreak>,
    pub median_loss: Option<LongestStreak>,
    pub combined_win: Option<LongestStreak>,
    pub combined_loss: Option<LongestStreak>,
}

impl LongestStreaks {
    pub fn get(&self, kind: StreakKind, streak_type: StreakType) -> Option<&LongestStreak> {
        match (kind, streak_type) {
            (StreakKind::H2h, StreakType::Win) => self.h2h_win.as_ref(),
            (StreakKind::H2h, StreakType::Loss) => self.h2h_loss.as_ref(),
            (StreakKind::Median, StreakType::Win) => self.median_win.as_ref(),
            (StreakKind::Median, StreakType::Loss) => self.median_loss.as_ref(),
            (StreakKind::Combined, StreakType::Win) => self.combined_win.as_ref(),
            (StreakKind::Combined, StreakType::Loss) => self.combined_loss.as_ref(),
        }
    }

    fn compute(history: &[&WeeklyScoreRecord]) -> Self {
        let longest = |kind, streak_type| longest_streak(history, kind, streak_type);
        Self {
            h2h_win: longest(StreakKind::H2h, StreakType::Win),
            h2h_loss: longest(StreakKind::H2h, StreakType::Loss),
            median_win: longest(StreakKind::Median, StreakType::Win),
            median_loss: longest(StreakKind::Median, StreakType::Loss),
            combined_win: longest(StreakKind::Combined, StreakType::Win),
            combined_loss: longest(StreakKind::Combined, StreakType::Loss),
        }
    }
}

/// Streak figures for one manager
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManagerStreaks {
    pub manager_id: ManagerId,
    pub manager_label: String,
    pub current_h2h: Option<CurrentStreak>,
    pub current_median: Option<CurrentStreak>,
    pub current_combined: Option<CurrentStreak>,
    pub longest: LongestStreaks,
}

/// League-wide holder of one longest-streak category
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreakRecordHolder {
    pub manager_id: ManagerId,
    pub manager_label: String,
    pub streak: LongestStreak,
}

/// Filters for a streak request
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreakQuery {
    pub season: Option<Season>,
    pub manager_id: Option<ManagerId>,
    pub include_playoffs: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreakReport {
    pub managers: Vec<ManagerStreaks>,
    pub records: Vec<StreakRecordHolder>,
    pub season: Option<Season>,
    pub no_data: bool,
}

/// One resolved outcome in a flattened history
#[derive(Debug, Clone, Copy)]
struct Mark {
    season: Season,
    week: Week,
    outcome: WeekOutcome,
}

/// Flatten a history into resolved outcomes, newest first when `newest_first`
fn outcome_sequence(history: &[&WeeklyScoreRecord], kind: StreakKind, newest_first: bool) -> Vec<Mark> {
    let mut ordered: Vec<&WeeklyScoreRecord> = history.to_vec();
    ordered.sort_by_key(|r| r.chronology());
    if newest_first {
        ordered.reverse();
    }

    let mut marks = Vec::with_capacity(ordered.len() * 2);
    for record in ordered {
        let signals = match kind {
            StreakKind::H2h => [Some(record.h2h_result), None],
            StreakKind::Median => [Some(record.median_result), None],
            StreakKind::Combined => [Some(record.median_result), Some(record.h2h_result)],
        };
        marks.extend(
            signals
                .into_iter()
                .flatten()
                .filter(|o| o.is_decided())
                .map(|outcome| Mark { season: record.season, week: record.week, outcome }),
        );
    }
    marks
}

/// Leading run of identical outcomes, most recent week first
pub fn current_streak(history: &[&WeeklyScoreRecord], kind: StreakKind) -> Option<CurrentStreak> {
    let marks = outcome_sequence(history, kind, true);
    let first = marks.first()?.outcome;
    let length = marks.iter().take_while(|m| m.outcome == first).count() as u32;
    let streak_type = if first == WeekOutcome::Win { StreakType::Win } else { StreakType::Loss };
    Some(CurrentStreak { streak_type, length })
}

/// Longest run of `streak_type`; the earliest run wins ties
pub fn longest_streak(
    history: &[&WeeklyScoreRecord],
    kind: StreakKind,
    streak_type: StreakType,
) -> Option<LongestStreak> {
    let target = streak_type.outcome();
    let marks = outcome_sequence(history, kind, false);

    let mut best: Option<LongestStreak> = None;
    let mut run_start: Option<Mark> = None;
    let mut run_length = 0u32;

    for mark in marks {
        if mark.outcome != target {
            run_start = None;
            run_length = 0;
            continue;
        }

        let start = *run_start.get_or_insert(mark);
        run_length += 1;

        if best.as_ref().map_or(true, |b| run_length > b.length) {
            best = Some(LongestStreak {
                kind,
                streak_type,
                length: run_length,
                season: start.season,
                start_season: start.season,
                start_week: start.week,
                end_season: mark.season,
                end_week: mark.week,
            });
        }
    }
    best
}

/// Streak engine
#[derive(Debug, Clone, Copy)]
pub struct StreakEngine<'a> {
    schedule: &'a PlayoffSchedule,
    directory: Option<&'a ManagerDirectory>,
}

impl<'a> StreakEngine<'a> {
    pub fn new(schedule: &'a PlayoffSchedule) -> Self {
        Self { schedule, directory: None }
    }

    pub fn with_directory(mut self, directory: &'a ManagerDirectory) -> Self {
        self.directory = Some(directory);
        self
    }

    /// Streaks for one manager's (already filtered) history
    pub fn manager_streaks(&self, manager_id: &str, history: &[&WeeklyScoreRecord]) -> ManagerStreaks {
        ManagerStreaks {
            manager_id: manager_id.to_string(),
            manager_label: label_for(self.directory, manager_id),
            current_h2h: current_streak(history, StreakKind::H2h),
            current_median: current_streak(history, StreakKind::Median),
            current_combined: current_streak(history, StreakKind::Combined),
            longest: LongestStreaks::compute(history),
        }
    }

    /// Streaks for every manager in the rows, plus league-wide record holders
    pub fn report(&self, records: &[WeeklyScoreRecord], query: &StreakQuery) -> StreakReport {
        let mut order: Vec<&str> = Vec::new();
        let mut histories: HashMap<&str, Vec<&WeeklyScoreRecord>> = HashMap::new();

        for record in records.iter().filter(|r| self.keeps(r, query)) {
            histories
                .entry(record.manager_id.as_str())
                .or_insert_with(|| {
                    order.push(record.manager_id.as_str());
                    Vec::new()
                })
                .push(record);
        }

        let mut managers: Vec<ManagerStreaks> =
            order.iter().map(|id| self.manager_streaks(id, &histories[id])).collect();

        debug!(managers = managers.len(), season = ?query.season, "Computed manager streaks");

        let holders = record_holders(&managers);

        match query.season {
            None => managers.sort_by_key(|m| {
                std::cmp::Reverse(m.longest.combined_win.as_ref().map_or(0, |s| s.length))
            }),
            Some(_) => managers.sort_by_key(|m| {
                std::cmp::Reverse(m.current_combined.map_or(0, |s| s.signed_length()))
            }),
        }

        StreakReport { no_data: managers.is_empty(), managers, records: holders, season: query.season }
    }

    fn keeps(&self, record: &WeeklyScoreRecord, query: &StreakQuery) -> bool {
        if query.season.is_some_and(|s| s != record.season) {
            return false;
        }
        if query.manager_id.as_ref().is_some_and(|m| *m != record.manager_id) {
            return false;
        }
        query.include_playoffs || !self.schedule.is_playoff_week(record.season, record.week)
    }
}

/// Greatest length per category; the first manager wins ties
fn record_holders(managers: &[ManagerStreaks]) -> Vec<StreakRecordHolder> {
    let mut holders = Vec::new();
    for kind in StreakKind::ALL {
        for streak_type in [StreakType::Win, StreakType::Loss] {
            let mut best: Option<(&ManagerStreaks, &LongestStreak)> = None;
            for manager in managers {
                let Some(streak) = manager.longest.get(kind, streak_type) else { continue };
                if best.map_or(true, |(_, b)| streak.length > b.length) {
                    best = Some((manager, streak));
                }
            }
            if let Some((manager, streak)) = best {
                holders.push(StreakRecordHolder {
                    manager_id: manager.manager_id.clone(),
                    manager_label: manager.manager_label.clone(),
                    streak: streak.clone(),
                });
            }
        }
    }
    holders
}
