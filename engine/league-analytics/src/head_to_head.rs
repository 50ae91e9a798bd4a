//! # Head-to-Head
//!
//! Pairwise records accumulated from matchup rows.
//!
//! Pairs are keyed by `(team1, team2)` exactly as stored, so a matchup where A is
//! team1 against B never touches the (B, A) pair. Callers that want a manager's
//! record to include games stored from the other side must ask for
//! [`Perspective::BothSides`] explicitly.

use crate::error::{AnalyticsError, Result};
use crate::models::{label_for, ManagerDirectory, ManagerId, MatchupRecord};
use crate::rounding;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::collections::HashMap;
use std::str::FromStr;
use tracing::debug;

/// Which matchups a request covers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchupType {
    #[default]
    All,
    Regular,
    Playoff,
}

impl MatchupType {
    pub fn matches(self, matchup: &MatchupRecord) -> bool {
        match self {
            Self::All => true,
            Self::Regular => !matchup.is_playoff,
            Self::Playoff => matchup.is_playoff,
        }
    }
}

impl FromStr for MatchupType {
    type Err = AnalyticsError;

    fn from_str(value: &str) -> std::result::Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "all" => Ok(Self::All),
            "regular" => Ok(Self::Regular),
            "playoff" | "playoffs" => Ok(Self::Playoff),
            other => Err(AnalyticsError::validation(
                "matchup_type",
                format!("expected one of all, regular, playoff; got '{other}'"),
            )),
        }
    }
}

/// Side(s) of each stored matchup that are accumulated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Perspective {
    /// Only team1's view of each stored row
    #[default]
    Stored,
    /// Each row counted once from each team's view
    BothSides,
}

impl FromStr for Perspective {
    type Err = AnalyticsError;

    fn from_str(value: &str) -> std::result::Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "stored" => Ok(Self::Stored),
            "both_sides" | "both" => Ok(Self::BothSides),
            other => Err(AnalyticsError::validation(
                "perspective",
                format!("expected stored or both_sides; got '{other}'"),
            )),
        }
    }
}

/// Filters for a head-to-head request
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeadToHeadQuery {
    /// Keep only pairs where this manager is team1
    pub manager_id: Option<ManagerId>,
    pub matchup_type: MatchupType,
    pub perspective: Perspective,
}

/// Record of one manager (team1) against one opponent (team2)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeadToHeadRecord {
    pub manager_id: ManagerId,
    pub manager_label: String,
    pub opponent_id: ManagerId,
    pub opponent_label: String,
    pub matchup_count: u32,
    pub wins: u32,
    pub losses: u32,
    pub total_points_for: Decimal,
    pub total_points_against: Decimal,
    pub win_pct: Decimal,
    pub avg_margin: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeadToHeadReport {
    pub records: Vec<HeadToHeadRecord>,
    pub perspective: Perspective,
    pub no_data: bool,
}

#[derive(Debug, Default)]
struct PairTally {
    matchup_count: u32,
    wins: u32,
    losses: u32,
    points_for: Decimal,
    points_against: Decimal,
}

impl PairTally {
    fn fold(&mut self, matchup: &MatchupRecord) -> Result<()> {
        self.matchup_count += 1;
        // Ties and unplayed games have no winner and count against team1
        if matchup.winner_manager_id.as_deref() == Some(matchup.team1_manager_id.as_str()) {
            self.wins += 1;
        } else {
            self.losses += 1;
        }
        self.points_for = rounding::checked_points("team1_points", self.points_for, matchup.team1_points)?;
        self.points_against =
            rounding::checked_points("team2_points", self.points_against, matchup.team2_points)?;
        Ok(())
    }
}

/// Head-to-head calculator
#[derive(Debug, Clone, Copy, Default)]
pub struct HeadToHeadCalculator<'a> {
    directory: Option<&'a ManagerDirectory>,
}

impl<'a> HeadToHeadCalculator<'a> {
    pub fn new() -> Self {
        Self { directory: None }
    }

    pub fn with_directory(mut self, directory: &'a ManagerDirectory) -> Self {
        self.directory = Some(directory);
        self
    }

    /// Build pairwise records for the filtered matchups
    pub fn calculate(&self, matchups: &[MatchupRecord], query: &HeadToHeadQuery) -> Result<HeadToHeadReport> {
        let mut order: Vec<(ManagerId, ManagerId)> = Vec::new();
        let mut tallies: HashMap<(ManagerId, ManagerId), PairTally> = HashMap::new();

        let sides = matchups
            .iter()
            .filter(|m| query.matchup_type.matches(m))
            .flat_map(|m| views(m, query.perspective));

        for side in sides {
            let key = (side.team1_manager_id.clone(), side.team2_manager_id.clone());
            let tally = tallies.entry(key.clone()).or_insert_with(|| {
                order.push(key);
                PairTally::default()
            });
            tally.fold(&side)?;
        }

        debug!(pairs = order.len(), perspective = ?query.perspective, "Accumulated head-to-head pairs");

        let mut records: Vec<HeadToHeadRecord> = order
            .into_iter()
            .filter(|(manager, _)| query.manager_id.as_ref().map_or(true, |m| m == manager))
            .map(|key| {
                let tally = &tallies[&key];
                self.build_record(key.0, key.1, tally)
            })
            .collect::<Result<_>>()?;

        records.sort_by(|a, b| b.win_pct.cmp(&a.win_pct).then_with(|| b.wins.cmp(&a.wins)));

        Ok(HeadToHeadReport { no_data: records.is_empty(), records, perspective: query.perspective })
    }

    /// Record for a single ordered pair, if any stored matchup has that orientation
    pub fn pair(
        &self,
        matchups: &[MatchupRecord],
        manager_id: &str,
        opponent_id: &str,
        matchup_type: MatchupType,
    ) -> Result<Option<HeadToHeadRecord>> {
        let query = HeadToHeadQuery {
            manager_id: Some(manager_id.to_string()),
            matchup_type,
            perspective: Perspective::Stored,
        };
        let report = self.calculate(matchups, &query)?;
        Ok(report.records.into_iter().find(|r| r.opponent_id == opponent_id))
    }

    fn build_record(
        &self,
        manager_id: ManagerId,
        opponent_id: ManagerId,
        tally: &PairTally,
    ) -> Result<HeadToHeadRecord> {
        let margin = rounding::checked_margin("avg_margin", tally.points_for, tally.points_against)?;
        Ok(HeadToHeadRecord {
            manager_label: label_for(self.directory, &manager_id),
            opponent_label: label_for(self.directory, &opponent_id),
            manager_id,
            opponent_id,
            matchup_count: tally.matchup_count,
            wins: tally.wins,
            losses: tally.losses,
            total_points_for: rounding::points(tally.points_for),
            total_points_against: rounding::points(tally.points_against),
            win_pct: rounding::win_percentage(tally.wins, tally.wins + tally.losses),
            avg_margin: rounding::average(margin, tally.matchup_count as usize),
        })
    }
}

fn views(matchup: &MatchupRecord, perspective: Perspective) -> Vec<Cow<'_, MatchupRecord>> {
    match perspective {
        Perspective::Stored => vec![Cow::Borrowed(matchup)],
        Perspective::BothSides => vec![Cow::Borrowed(matchup), Cow::Owned(matchup.mirrored())],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn matchup(team1: &str, p1: Decimal, team2: &str, p2: Decimal, winner: Option<&str>) -> MatchupRecord {
        MatchupRecord {
            season: 2023,
            week: 1,
            matchup_id: 1,
            team1_manager_id: team1.to_string(),
            team1_points: p1,
            team2_manager_id: team2.to_string(),
            team2_points: p2,
            winner_manager_id: winner.map(String::from),
            is_playoff: false,
            is_toilet_bowl: false,
            playoff_round: None,
        }
    }

    #[test]
    fn test_pairs_are_directional() {
        let matchups = vec![matchup("A", dec!(120), "B", dec!(100), Some("A"))];
        let calculator = HeadToHeadCalculator::new();

        let ab = calculator.pair(&matchups, "A", "B", MatchupType::All).unwrap().unwrap();
        assert_eq!((ab.matchup_count, ab.wins, ab.losses), (1, 1, 0));

        assert!(calculator.pair(&matchups, "B", "A", MatchupType::All).unwrap().is_none());
    }

    #[test]
    fn test_win_pct_and_margin() {
        let matchups = vec![
            matchup("A", dec!(120), "B", dec!(100), Some("A")),
            matchup("A", dec!(90.5), "B", dec!(101.25), Some("B")),
            matchup("A", dec!(110), "B", dec!(99.99), Some("A")),
        ];

        let report = HeadToHeadCalculator::new().calculate(&matchups, &HeadToHeadQuery::default()).unwrap();
        let record = &report.records[0];
        assert_eq!((record.wins, record.losses), (2, 1));
        assert_eq!(record.win_pct, dec!(66.7));
        assert_eq!(record.total_points_for, dec!(320.5));
        assert_eq!(record.total_points_against, dec!(301.24));
        // (320.5 - 301.24) / 3 = 6.42
        assert_eq!(record.avg_margin, dec!(6.42));
    }

    #[test]
    fn test_tie_without_winner_counts_as_loss() {
        let matchups = vec![matchup("A", dec!(100), "B", dec!(100), None)];
        let report = HeadToHeadCalculator::new().calculate(&matchups, &HeadToHeadQuery::default()).unwrap();
        assert_eq!((report.records[0].wins, report.records[0].losses), (0, 1));
        assert_eq!(report.records[0].win_pct, Decimal::ZERO);
    }

    #[test]
    fn test_sorted_by_win_pct_then_wins() {
        let matchups = vec![
            matchup("C", dec!(90), "D", dec!(100), Some("D")),
            matchup("A", dec!(120), "B", dec!(100), Some("A")),
            matchup("E", dec!(120), "F", dec!(100), Some("E")),
            matchup("E", dec!(120), "F", dec!(100), Some("E")),
        ];

        let report = HeadToHeadCalculator::new().calculate(&matchups, &HeadToHeadQuery::default()).unwrap();
        let pairs: Vec<(&str, &str)> = report
            .records
            .iter()
            .map(|r| (r.manager_id.as_str(), r.opponent_id.as_str()))
            .collect();
        assert_eq!(pairs, vec![("E", "F"), ("A", "B"), ("C", "D")]);
    }

    #[test]
    fn test_manager_filter_keeps_team1_pairs_only() {
        let matchups = vec![
            matchup("A", dec!(120), "B", dec!(100), Some("A")),
            matchup("B", dec!(120), "A", dec!(100), Some("B")),
            matchup("C", dec!(120), "B", dec!(100), Some("C")),
        ];
        let query = HeadToHeadQuery { manager_id: Some("B".to_string()), ..Default::default() };

        let report = HeadToHeadCalculator::new().calculate(&matchups, &query).unwrap();
        assert_eq!(report.records.len(), 1);
        assert_eq!(report.records[0].opponent_id, "A");
    }

    #[test]
    fn test_matchup_type_filter() {
        let mut playoff = matchup("A", dec!(120), "B", dec!(100), Some("A"));
        playoff.is_playoff = true;
        let matchups = vec![playoff, matchup("A", dec!(80), "B", dec!(100), Some("B"))];
        let calculator = HeadToHeadCalculator::new();

        let regular = calculator.pair(&matchups, "A", "B", MatchupType::Regular).unwrap().unwrap();
        assert_eq!((regular.wins, regular.losses), (0, 1));
        let playoffs = calculator.pair(&matchups, "A", "B", MatchupType::Playoff).unwrap().unwrap();
        assert_eq!((playoffs.wins, playoffs.losses), (1, 0));
    }

    #[test]
    fn test_both_sides_perspective_mirrors_rows() {
        let matchups = vec![matchup("A", dec!(120), "B", dec!(100), Some("A"))];
        let query = HeadToHeadQuery { perspective: Perspective::BothSides, ..Default::default() };

        let report = HeadToHeadCalculator::new().calculate(&matchups, &query).unwrap();
        assert_eq!(report.records.len(), 2);
        let ba = report.records.iter().find(|r| r.manager_id == "B").unwrap();
        assert_eq!((ba.wins, ba.losses), (0, 1));
        assert_eq!(ba.total_points_for, dec!(100));
        assert_eq!(ba.avg_margin, dec!(-20));
    }

    #[test]
    fn test_matchup_type_parse() {
        assert_eq!("Regular".parse::<MatchupType>().unwrap(), MatchupType::Regular);
        assert_eq!("playoffs".parse::<MatchupType>().unwrap(), MatchupType::Playoff);
        assert!(matches!("weekly".parse::<MatchupType>(), Err(AnalyticsError::Validation { .. })));
    }

    #[test]
    fn test_perspective_parse() {
        assert_eq!("both".parse::<Perspective>().unwrap(), Perspective::BothSides);
        assert_eq!("Stored".parse::<Perspective>().unwrap(), Perspective::Stored);
        assert!("mirror".parse::<Perspective>().is_err());
    }

    #[test]
    fn test_empty_input_reports_no_data() {
        let report = HeadToHeadCalculator::new().calculate(&[], &HeadToHeadQuery::default()).unwrap();
        assert!(report.no_data);
    }

    #[test]
    fn test_calculation_is_repeatable() {
        let matchups = vec![
            matchup("A", dec!(120), "B", dec!(100), Some("A")),
            matchup("B", dec!(95.5), "A", dec!(101.25), Some("A")),
            matchup("C", dec!(88), "A", dec!(88), None),
        ];
        let calculator = HeadToHeadCalculator::new();
        let query = HeadToHeadQuery { perspective: Perspective::BothSides, ..Default::default() };

        let first = calculator.calculate(&matchups, &query).unwrap();
        let second = calculator.calculate(&matchups, &query).unwrap();
        assert_eq!(first, second);
        assert_eq!(
            serde_json::to_string(&first).unwrap(),
            serde_json::to_string(&second).unwrap()
        );
    }

    #[test]
    fn test_oversized_points_are_rejected_not_panicking() {
        let huge = Decimal::MAX / dec!(2) + Decimal::ONE;
        let matchups = vec![
            matchup("A", huge, "B", dec!(100), Some("A")),
            matchup("A", huge, "B", dec!(100), Some("A")),
        ];

        let result = HeadToHeadCalculator::new().calculate(&matchups, &HeadToHeadQuery::default());
        assert!(matches!(result, Err(AnalyticsError::Validation { field, .. }) if field == "team1_points"));
    }

    #[test]
    fn test_margin_overflow_is_rejected() {
        let matchups = vec![matchup("A", Decimal::MAX, "B", -Decimal::MAX, Some("A"))];
        let result = HeadToHeadCalculator::new().calculate(&matchups, &HeadToHeadQuery::default());
        assert!(matches!(result, Err(AnalyticsError::Validation { field, .. }) if field == "avg_margin"));
    }
}
