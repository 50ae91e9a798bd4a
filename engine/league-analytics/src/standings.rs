//! # Standings
//!
//! Folds weekly score rows into per-manager, per-season records and ranks them.
//!
//! Primary order is combined wins (h2h + median) descending, then points for
//! descending; anything still tied keeps the order in which the manager/season was
//! first seen. Points for, points against and all-play wins each get an
//! independent rank that does not reorder the rows.

use crate::error::{AnalyticsError, Result};
use crate::models::{
    label_for, ManagerDirectory, ManagerId, PlayoffSchedule, Season, WeekOutcome,
    WeeklyScoreRecord,
};
use crate::rounding;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};
use tracing::debug;

/// Row filters for a standings request
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StandingsQuery {
    /// Restrict to one season; `None` means every season
    pub season: Option<Season>,
    /// Keep weeks at or after the season's playoff start
    pub include_playoffs: bool,
}

/// One manager's record for one season
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StandingsRow {
    pub manager_id: ManagerId,
    pub manager_label: String,
    pub season: Season,
    /// Rank across every row in the report
    pub rank: u32,
    /// Rank among rows of the same season
    pub season_rank: u32,
    pub h2h_wins: u32,
    pub h2h_losses: u32,
    pub median_wins: u32,
    pub median_losses: u32,
    pub combined_wins: u32,
    pub combined_losses: u32,
    pub combined_win_pct: Decimal,
    pub all_play_wins: u32,
    pub all_play_losses: u32,
    pub points_for: Decimal,
    pub points_against: Decimal,
    pub avg_points_per_week: Decimal,
    pub weeks_played: u32,
    pub points_for_rank: u32,
    pub points_against_rank: u32,
    pub all_play_rank: u32,
}

/// Ordered standings plus the scope they cover
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StandingsReport {
    pub rows: Vec<StandingsRow>,
    pub seasons: Vec<Season>,
    pub include_playoffs: bool,
    pub no_data: bool,
}

/// Running totals for one (manager, season) group
#[derive(Debug, Default)]
struct Tally {
    h2h_wins: u32,
    h2h_losses: u32,
    median_wins: u32,
    median_losses: u32,
    all_play_wins: u32,
    all_play_losses: u32,
    points_for: Decimal,
    points_against: Decimal,
    weeks_played: u32,
}

impl Tally {
    fn fold(&mut self, record: &WeeklyScoreRecord) -> Result<()> {
        match record.h2h_result {
            WeekOutcome::Win => self.h2h_wins += 1,
            WeekOutcome::Loss => self.h2h_losses += 1,
            WeekOutcome::NoResult => {}
        }
        match record.median_result {
            WeekOutcome::Win => self.median_wins += 1,
            WeekOutcome::Loss => self.median_losses += 1,
            WeekOutcome::NoResult => {}
        }
        self.all_play_wins = rounding::checked_count("all_play_wins", self.all_play_wins, record.all_play_wins)?;
        self.all_play_losses =
            rounding::checked_count("all_play_losses", self.all_play_losses, record.all_play_losses)?;
        self.points_for = rounding::checked_points("points_for", self.points_for, record.points_for)?;
        self.points_against =
            rounding::checked_points("points_against", self.points_against, record.points_against)?;
        self.weeks_played += 1;
        Ok(())
    }

    fn combined_wins(&self) -> u32 {
        self.h2h_wins + self.median_wins
    }

    fn combined_losses(&self) -> u32 {
        self.h2h_losses + self.median_losses
    }
}

/// Standings aggregator
#[derive(Debug, Clone, Copy)]
pub struct StandingsAggregator<'a> {
    schedule: &'a PlayoffSchedule,
    directory: Option<&'a ManagerDirectory>,
}

impl<'a> StandingsAggregator<'a> {
    pub fn new(schedule: &'a PlayoffSchedule) -> Self {
        Self { schedule, directory: None }
    }

    /// Attach manager labels to the output rows
    pub fn with_directory(mut self, directory: &'a ManagerDirectory) -> Self {
        self.directory = Some(directory);
        self
    }

    /// Build standings for the filtered rows
    pub fn aggregate(&self, records: &[WeeklyScoreRecord], query: &StandingsQuery) -> Result<StandingsReport> {
        let mut order: Vec<(ManagerId, Season)> = Vec::new();
        let mut tallies: HashMap<(ManagerId, Season), Tally> = HashMap::new();

        let filtered = records.iter().filter(|r| self.keeps(r, query));
        for record in filtered {
            let key = (record.manager_id.clone(), record.season);
            let tally = tallies.entry(key.clone()).or_insert_with(|| {
                order.push(key);
                Tally::default()
            });
            tally.fold(record)?;
        }

        debug!(groups = order.len(), season = ?query.season, "Folded weekly scores into standings groups");

        let mut groups: Vec<((ManagerId, Season), Tally)> = order
            .into_iter()
            .map(|key| {
                let tally = tallies.remove(&key).unwrap_or_default();
                (key, tally)
            })
            .collect();

        // Unrounded totals order the rows; stable sort keeps first-encountered order for full ties
        groups.sort_by(|(_, a), (_, b)| {
            b.combined_wins().cmp(&a.combined_wins()).then_with(|| b.points_for.cmp(&a.points_for))
        });

        let rows = self.ranked_rows(groups);
        let seasons: Vec<Season> =
            rows.iter().map(|r| r.season).collect::<BTreeSet<_>>().into_iter().collect();

        Ok(StandingsReport {
            no_data: rows.is_empty(),
            rows,
            seasons,
            include_playoffs: query.include_playoffs,
        })
    }

    fn keeps(&self, record: &WeeklyScoreRecord, query: &StandingsQuery) -> bool {
        if query.season.is_some_and(|s| s != record.season) {
            return false;
        }
        query.include_playoffs || !self.schedule.is_playoff_week(record.season, record.week)
    }

    /// Rows for groups already in primary order, with global, per-season and secondary ranks
    fn ranked_rows(&self, groups: Vec<((ManagerId, Season), Tally)>) -> Vec<StandingsRow> {
        let pf = secondary_ranks(&groups, |(_, a), (_, b)| b.points_for.cmp(&a.points_for));
        let pa = secondary_ranks(&groups, |(_, a), (_, b)| b.points_against.cmp(&a.points_against));
        let all_play = secondary_ranks(&groups, |(_, a), (_, b)| b.all_play_wins.cmp(&a.all_play_wins));

        let mut per_season: HashMap<Season, u32> = HashMap::new();
        groups
            .into_iter()
            .enumerate()
            .map(|(index, ((manager_id, season), tally))| {
                let counter = per_season.entry(season).or_insert(0);
                *counter += 1;
                StandingsRow {
                    rank: index as u32 + 1,
                    season_rank: *counter,
                    points_for_rank: pf[index],
                    points_against_rank: pa[index],
                    all_play_rank: all_play[index],
                    ..self.build_row(manager_id, season, &tally)
                }
            })
            .collect()
    }

    fn build_row(&self, manager_id: ManagerId, season: Season, tally: &Tally) -> StandingsRow {
        let combined_wins = tally.combined_wins();
        let combined_losses = tally.combined_losses();
        StandingsRow {
            manager_label: label_for(self.directory, &manager_id),
            manager_id,
            season,
            rank: 0,
            season_rank: 0,
            h2h_wins: tally.h2h_wins,
            h2h_losses: tally.h2h_losses,
            median_wins: tally.median_wins,
            median_losses: tally.median_losses,
            combined_wins,
            combined_losses,
            combined_win_pct: rounding::win_percentage(combined_wins, combined_wins + combined_losses),
            all_play_wins: tally.all_play_wins,
            all_play_losses: tally.all_play_losses,
            points_for: rounding::points(tally.points_for),
            points_against: rounding::points(tally.points_against),
            avg_points_per_week: rounding::average(tally.points_for, tally.weeks_played as usize),
            weeks_played: tally.weeks_played,
            points_for_rank: 0,
            points_against_rank: 0,
            all_play_rank: 0,
        }
    }
}

/// Rank of each item under `compare`, ties resolved by current position
fn secondary_ranks<T, F>(items: &[T], compare: F) -> Vec<u32>
where
    F: Fn(&T, &T) -> std::cmp::Ordering,
{
    let mut indices: Vec<usize> = (0..items.len()).collect();
    indices.sort_by(|&a, &b| compare(&items[a], &items[b]));

    let mut ranks = vec![0; items.len()];
    for (position, index) in indices.into_iter().enumerate() {
        ranks[index] = position as u32 + 1;
    }
    ranks
}

/// A playoff entry derived from regular-season standings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayoffSeed {
    pub season: Season,
    pub seed: u32,
    pub manager_id: ManagerId,
    pub manager_label: String,
}

/// Assign playoff seeds from a regular-season report, `playoff_teams` per season
pub fn seed_playoffs(report: &StandingsReport, schedule: &PlayoffSchedule) -> Result<Vec<PlayoffSeed>> {
    if report.include_playoffs {
        return Err(AnalyticsError::validation(
            "include_playoffs",
            "seeds are determined by regular-season standings only",
        ));
    }

    let mut seeds: Vec<PlayoffSeed> = report
        .rows
        .iter()
        .filter(|row| row.season_rank <= schedule.playoff_teams(row.season))
        .map(|row| PlayoffSeed {
            season: row.season,
            seed: row.season_rank,
            manager_id: row.manager_id.clone(),
            manager_label: row.manager_label.clone(),
        })
        .collect();
    seeds.sort_by_key(|s| (s.season, s.seed));
    Ok(seeds)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ManagerIdentity, SeasonPlayoffConfig};
    use rust_decimal_macros::dec;

    fn record(
        manager: &str,
        season: Season,
        week: u32,
        points_for: Decimal,
        h2h: WeekOutcome,
        median: WeekOutcome,
    ) -> WeeklyScoreRecord {
        WeeklyScoreRecord {
            manager_id: manager.to_string(),
            season,
            week,
            points_for,
            points_against: dec!(100),
            h2h_result: h2h,
            median_result: median,
            all_play_wins: 0,
            all_play_losses: 0,
        }
    }

    fn week_one() -> Vec<WeeklyScoreRecord> {
        use WeekOutcome::*;
        vec![
            WeeklyScoreRecord { all_play_wins: 3, ..record("A", 2023, 1, dec!(120.5), Win, Win) },
            WeeklyScoreRecord { all_play_wins: 1, all_play_losses: 2, ..record("B", 2023, 1, dec!(98.0), Loss, Loss) },
            WeeklyScoreRecord { all_play_wins: 2, all_play_losses: 1, ..record("C", 2023, 1, dec!(110.0), Win, Win) },
            WeeklyScoreRecord { all_play_losses: 3, ..record("D", 2023, 1, dec!(85.25), Loss, Loss) },
        ]
    }

    #[test]
    fn test_combined_wins_tie_broken_by_points_for() {
        let schedule = PlayoffSchedule::default();
        let mut records = week_one();
        // C listed first so only the points tie-break can put A ahead
        records.swap(0, 2);

        let report = StandingsAggregator::new(&schedule).aggregate(&records, &StandingsQuery::default()).unwrap();

        let ids: Vec<&str> = report.rows.iter().map(|r| r.manager_id.as_str()).collect();
        assert_eq!(ids, vec!["A", "C", "B", "D"]);
        assert_eq!(report.rows[0].combined_wins, 2);
        assert_eq!(report.rows[0].points_for, dec!(120.5));
        assert_eq!(report.rows[1].combined_wins, 2);
        assert_eq!(report.rows[1].points_for, dec!(110.0));
    }

    #[test]
    fn test_points_tie_break_uses_unrounded_totals() {
        use WeekOutcome::*;
        let schedule = PlayoffSchedule::default();
        // Both round to 100.00; C is seen first
        let records = vec![
            WeeklyScoreRecord { points_against: dec!(90.004), ..record("C", 2023, 1, dec!(100.001), Win, Win) },
            WeeklyScoreRecord { points_against: dec!(90.001), ..record("A", 2023, 1, dec!(100.004), Win, Win) },
        ];

        let report = StandingsAggregator::new(&schedule).aggregate(&records, &StandingsQuery::default()).unwrap();
        let ids: Vec<&str> = report.rows.iter().map(|r| r.manager_id.as_str()).collect();
        assert_eq!(ids, vec!["A", "C"]);
        assert_eq!(report.rows[0].points_for, dec!(100.00));
        assert_eq!(report.rows[1].points_for, dec!(100.00));
        assert_eq!(report.rows[0].points_for_rank, 1);
        assert_eq!(report.rows[1].points_for_rank, 2);
        // C conceded more before rounding
        assert_eq!(report.rows[1].points_against_rank, 1);
        assert_eq!(report.rows[0].points_against_rank, 2);
    }

    #[test]
    fn test_oversized_points_are_rejected_not_panicking() {
        use WeekOutcome::*;
        let schedule = PlayoffSchedule::default();
        let huge = Decimal::MAX / dec!(2) + Decimal::ONE;
        let records = vec![record("A", 2023, 1, huge, Win, Win), record("A", 2023, 2, huge, Win, Win)];

        let result = StandingsAggregator::new(&schedule)
            .aggregate(&records, &StandingsQuery { season: None, include_playoffs: true });
        assert!(matches!(result, Err(AnalyticsError::Validation { field, .. }) if field == "points_for"));
    }

    #[test]
    fn test_all_play_count_overflow_is_rejected() {
        use WeekOutcome::*;
        let schedule = PlayoffSchedule::default();
        let records = vec![
            WeeklyScoreRecord { all_play_wins: u32::MAX, ..record("A", 2023, 1, dec!(100), Win, Win) },
            WeeklyScoreRecord { all_play_wins: 1, ..record("A", 2023, 2, dec!(100), Win, Win) },
        ];

        let result = StandingsAggregator::new(&schedule).aggregate(&records, &StandingsQuery::default());
        assert!(matches!(result, Err(AnalyticsError::Validation { field, .. }) if field == "all_play_wins"));
    }

    #[test]
    fn test_full_tie_keeps_first_encountered_order() {
        use WeekOutcome::*;
        let schedule = PlayoffSchedule::default();
        let records = vec![
            record("X", 2023, 1, dec!(100), Win, Loss),
            record("Y", 2023, 1, dec!(100), Win, Loss),
        ];

        let report = StandingsAggregator::new(&schedule).aggregate(&records, &StandingsQuery::default()).unwrap();
        assert_eq!(report.rows[0].manager_id, "X");
        assert_eq!(report.rows[1].manager_id, "Y");
        assert_eq!(report.rows[1].points_for_rank, 2);
    }

    #[test]
    fn test_no_result_weeks_count_as_played_but_not_decided() {
        use WeekOutcome::*;
        let schedule = PlayoffSchedule::default();
        let records = vec![
            record("A", 2023, 1, dec!(100), Win, Win),
            record("A", 2023, 2, dec!(90), NoResult, Loss),
            record("A", 2023, 3, dec!(80), Loss, NoResult),
        ];

        let report = StandingsAggregator::new(&schedule).aggregate(&records, &StandingsQuery::default()).unwrap();
        let row = &report.rows[0];
        assert_eq!((row.h2h_wins, row.h2h_losses), (1, 1));
        assert_eq!((row.median_wins, row.median_losses), (1, 1));
        assert_eq!((row.combined_wins, row.combined_losses), (2, 2));
        assert_eq!(row.combined_win_pct, dec!(50.0));
        assert_eq!(row.weeks_played, 3);
        assert_eq!(row.points_for, dec!(270));
        assert_eq!(row.points_against, dec!(300));
        assert_eq!(row.avg_points_per_week, dec!(90));
    }

    #[test]
    fn test_secondary_ranks_do_not_reorder() {
        let schedule = PlayoffSchedule::default();
        let mut records = week_one();
        records[3].points_against = dec!(150);

        let report = StandingsAggregator::new(&schedule).aggregate(&records, &StandingsQuery::default()).unwrap();
        let by_id: HashMap<&str, &StandingsRow> =
            report.rows.iter().map(|r| (r.manager_id.as_str(), r)).collect();

        assert_eq!(by_id["A"].rank, 1);
        assert_eq!(by_id["A"].points_for_rank, 1);
        assert_eq!(by_id["A"].all_play_rank, 1);
        assert_eq!(by_id["D"].rank, 4);
        assert_eq!(by_id["D"].points_against_rank, 1);
        assert_eq!(by_id["D"].all_play_rank, 4);
        assert_eq!(by_id["B"].points_for_rank, 3);
        assert_eq!(by_id["C"].all_play_rank, 2);
    }

    #[test]
    fn test_playoff_weeks_filtered_per_season() {
        use WeekOutcome::*;
        let schedule = PlayoffSchedule::new(vec![SeasonPlayoffConfig {
            season: 2022,
            playoff_week_start: Some(14),
            playoff_teams: None,
        }]);
        let records = vec![
            record("A", 2022, 13, dec!(100), Win, Win),
            record("A", 2022, 14, dec!(100), Win, Win),
            record("A", 2023, 14, dec!(100), Win, Win),
            record("A", 2023, 15, dec!(100), Win, Win),
        ];

        let aggregator = StandingsAggregator::new(&schedule);
        let regular = aggregator.aggregate(&records, &StandingsQuery::default()).unwrap();
        let weeks: Vec<(Season, u32)> = regular.rows.iter().map(|r| (r.season, r.weeks_played)).collect();
        assert_eq!(weeks, vec![(2022, 1), (2023, 1)]);

        let all = aggregator.aggregate(&records, &StandingsQuery { season: None, include_playoffs: true }).unwrap();
        assert!(all.rows.iter().all(|r| r.weeks_played == 2));
    }

    #[test]
    fn test_season_rank_within_multi_season_report() {
        use WeekOutcome::*;
        let schedule = PlayoffSchedule::default();
        let records = vec![
            record("A", 2022, 1, dec!(100), Win, Win),
            record("B", 2022, 1, dec!(90), Loss, Loss),
            record("A", 2023, 1, dec!(80), Loss, Loss),
            record("B", 2023, 1, dec!(70), Win, Loss),
        ];

        let report = StandingsAggregator::new(&schedule).aggregate(&records, &StandingsQuery::default()).unwrap();
        let summary: Vec<(&str, Season, u32, u32)> = report
            .rows
            .iter()
            .map(|r| (r.manager_id.as_str(), r.season, r.rank, r.season_rank))
            .collect();
        assert_eq!(
            summary,
            vec![("A", 2022, 1, 1), ("B", 2023, 2, 1), ("B", 2022, 3, 2), ("A", 2023, 4, 2)]
        );
        assert_eq!(report.seasons, vec![2022, 2023]);
    }

    #[test]
    fn test_season_filter_and_empty_scope() {
        let schedule = PlayoffSchedule::default();
        let report = StandingsAggregator::new(&schedule)
            .aggregate(&week_one(), &StandingsQuery { season: Some(2019), include_playoffs: false })
            .unwrap();
        assert!(report.no_data);
        assert!(report.rows.is_empty());
        assert!(report.seasons.is_empty());
    }

    #[test]
    fn test_labels_resolved_through_directory() {
        let schedule = PlayoffSchedule::default();
        let directory = ManagerDirectory::new(&[ManagerIdentity {
            id: "A".to_string(),
            nickname: None,
            display_name: Some("Alpha".to_string()),
            username: None,
        }]);

        let report = StandingsAggregator::new(&schedule)
            .with_directory(&directory)
            .aggregate(&week_one(), &StandingsQuery::default())
            .unwrap();
        assert_eq!(report.rows[0].manager_label, "Alpha");
        assert_eq!(report.rows[1].manager_label, "Unknown");
    }

    #[test]
    fn test_aggregation_is_deterministic() {
        let schedule = PlayoffSchedule::default();
        let aggregator = StandingsAggregator::new(&schedule);
        let records = week_one();

        let first = aggregator.aggregate(&records, &StandingsQuery::default()).unwrap();
        let second = aggregator.aggregate(&records, &StandingsQuery::default()).unwrap();
        assert_eq!(first, second);
        assert_eq!(
            serde_json::to_string(&first).unwrap(),
            serde_json::to_string(&second).unwrap()
        );
    }

    #[test]
    fn test_seed_playoffs() {
        let schedule = PlayoffSchedule::new(vec![SeasonPlayoffConfig {
            season: 2023,
            playoff_week_start: None,
            playoff_teams: Some(2),
        }]);
        let report = StandingsAggregator::new(&schedule).aggregate(&week_one(), &StandingsQuery::default()).unwrap();

        let seeds = seed_playoffs(&report, &schedule).unwrap();
        let ids: Vec<(&str, u32)> = seeds.iter().map(|s| (s.manager_id.as_str(), s.seed)).collect();
        assert_eq!(ids, vec![("A", 1), ("C", 2)]);
    }

    #[test]
    fn test_seed_playoffs_rejects_playoff_inclusive_report() {
        let schedule = PlayoffSchedule::default();
        let report = StandingsAggregator::new(&schedule)
            .aggregate(&week_one(), &StandingsQuery { season: None, include_playoffs: true })
            .unwrap();
        assert!(matches!(seed_playoffs(&report, &schedule), Err(AnalyticsError::Validation { .. })));
    }
}
