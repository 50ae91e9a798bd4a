//! # Playoff Brackets
//!
//! Round labels for playoff and toilet-bowl matchups, and a summary of a filtered
//! matchup set (close games, blowouts, average differential).

use crate::config::MatchupThresholds;
use crate::error::Result;
use crate::head_to_head::MatchupType;
use crate::models::{label_for, ManagerDirectory, ManagerId, MatchupRecord, PlayoffSchedule, Season, Week};
use crate::rounding;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

pub const REGULAR_SEASON_LABEL: &str = "Regular Season";

/// Round number: the override if present, else the offset from the playoff start week
pub fn playoff_round(week: Week, playoff_week_start: Week, playoff_round_override: Option<u32>) -> i64 {
    match playoff_round_override {
        Some(round) => i64::from(round),
        None => i64::from(week) - i64::from(playoff_week_start) + 1,
    }
}

/// Human-readable label for a postseason matchup
pub fn classify(
    week: Week,
    playoff_week_start: Week,
    is_toilet_bowl: bool,
    playoff_round_override: Option<u32>,
) -> String {
    let round = playoff_round(week, playoff_week_start, playoff_round_override);
    match (is_toilet_bowl, round) {
        (true, 1) => "Toilet Bowl Rd 1".to_string(),
        (true, 2) => "Toilet Bowl Rd 2".to_string(),
        (true, 3) => "Toilet Bowl Final".to_string(),
        (true, n) => format!("Toilet Bowl Rd {n}"),
        (false, 1) => "Playoff Quarterfinal".to_string(),
        (false, 2) => "Playoff Semifinal".to_string(),
        (false, 3) => "Championship".to_string(),
        (false, n) => format!("Playoff Rd {n}"),
    }
}

/// A matchup with its derived label and margins
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchupView {
    pub season: Season,
    pub week: Week,
    pub matchup_id: u32,
    pub team1_manager_id: ManagerId,
    pub team1_label: String,
    pub team1_points: Decimal,
    pub team2_manager_id: ManagerId,
    pub team2_label: String,
    pub team2_points: Decimal,
    pub winner_manager_id: Option<ManagerId>,
    pub round_label: String,
    pub point_differential: Decimal,
    pub is_playoff: bool,
    pub is_toilet_bowl: bool,
    pub is_close_game: bool,
    pub is_blowout: bool,
}

/// Counts and extremes over a matchup set
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MatchupSummary {
    pub total_matchups: u32,
    pub regular_season_count: u32,
    /// Winners-bracket playoff games (toilet bowl excluded)
    pub playoff_count: u32,
    pub toilet_bowl_count: u32,
    pub close_game_count: u32,
    pub blowout_count: u32,
    pub avg_point_differential: Decimal,
    pub biggest_blowout: Option<MatchupView>,
    pub closest_game: Option<MatchupView>,
}

/// Filters for a matchup listing
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchupFilter {
    pub season: Option<Season>,
    /// Keep matchups this manager played on either side
    pub manager_id: Option<ManagerId>,
    pub matchup_type: MatchupType,
}

impl MatchupFilter {
    fn matches(&self, matchup: &MatchupRecord) -> bool {
        self.season.map_or(true, |s| s == matchup.season)
            && self.manager_id.as_deref().map_or(true, |m| matchup.involves(m))
            && self.matchup_type.matches(matchup)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchupReport {
    pub matchups: Vec<MatchupView>,
    pub summary: MatchupSummary,
    pub no_data: bool,
}

/// Labels matchups against a league's playoff schedule
#[derive(Debug, Clone)]
pub struct PlayoffBracketClassifier<'a> {
    schedule: &'a PlayoffSchedule,
    thresholds: MatchupThresholds,
    directory: Option<&'a ManagerDirectory>,
}

impl<'a> PlayoffBracketClassifier<'a> {
    pub fn new(schedule: &'a PlayoffSchedule) -> Self {
        Self { schedule, thresholds: MatchupThresholds::default(), directory: None }
    }

    pub fn with_thresholds(mut self, thresholds: MatchupThresholds) -> Self {
        self.thresholds = thresholds;
        self
    }

    pub fn with_directory(mut self, directory: &'a ManagerDirectory) -> Self {
        self.directory = Some(directory);
        self
    }

    /// Round label, or "Regular Season" for non-playoff matchups
    pub fn label(&self, matchup: &MatchupRecord) -> String {
        if !matchup.is_playoff {
            return REGULAR_SEASON_LABEL.to_string();
        }
        classify(
            matchup.week,
            self.schedule.playoff_week_start(matchup.season),
            matchup.is_toilet_bowl,
            matchup.playoff_round,
        )
    }

    pub fn view(&self, matchup: &MatchupRecord) -> Result<MatchupView> {
        let differential = matchup.point_differential()?;
        Ok(MatchupView {
            season: matchup.season,
            week: matchup.week,
            matchup_id: matchup.matchup_id,
            team1_manager_id: matchup.team1_manager_id.clone(),
            team1_label: label_for(self.directory, &matchup.team1_manager_id),
            team1_points: matchup.team1_points,
            team2_manager_id: matchup.team2_manager_id.clone(),
            team2_label: label_for(self.directory, &matchup.team2_manager_id),
            team2_points: matchup.team2_points,
            winner_manager_id: matchup.winner_manager_id.clone(),
            round_label: self.label(matchup),
            point_differential: rounding::points(differential),
            is_playoff: matchup.is_playoff,
            is_toilet_bowl: matchup.is_toilet_bowl,
            is_close_game: self.thresholds.is_close(differential),
            is_blowout: self.thresholds.is_blowout(differential),
        })
    }

    /// Label every matching matchup and summarise the set
    pub fn report(&self, matchups: &[MatchupRecord], filter: &MatchupFilter) -> Result<MatchupReport> {
        let views = matchups
            .iter()
            .filter(|m| filter.matches(m))
            .map(|m| self.view(m))
            .collect::<Result<Vec<MatchupView>>>()?;
        let summary = summarize(&views)?;
        Ok(MatchupReport { no_data: views.is_empty(), matchups: views, summary })
    }
}

/// Summary over already-labelled matchups; the first one seen wins ties
pub fn summarize(views: &[MatchupView]) -> Result<MatchupSummary> {
    let mut summary = MatchupSummary::default();
    let mut total_differential = Decimal::ZERO;
    let mut biggest: Option<&MatchupView> = None;
    let mut closest: Option<&MatchupView> = None;

    for view in views {
        summary.total_matchups += 1;
        if view.is_toilet_bowl {
            summary.toilet_bowl_count += 1;
        } else if view.is_playoff {
            summary.playoff_count += 1;
        } else {
            summary.regular_season_count += 1;
        }
        if view.is_close_game {
            summary.close_game_count += 1;
        }
        if view.is_blowout {
            summary.blowout_count += 1;
        }
        total_differential =
            rounding::checked_points("point_differential", total_differential, view.point_differential)?;

        if biggest.map_or(true, |b| view.point_differential > b.point_differential) {
            biggest = Some(view);
        }
        if closest.map_or(true, |c| view.point_differential < c.point_differential) {
            closest = Some(view);
        }
    }

    summary.avg_point_differential = rounding::average(total_differential, views.len());
    summary.biggest_blowout = biggest.cloned();
    summary.closest_game = closest.cloned();
    Ok(summary)
}
