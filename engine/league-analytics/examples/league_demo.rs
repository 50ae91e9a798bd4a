//! # League Analytics Demo
//!
//! Derives weekly results for a small four-team league and prints standings,
//! head-to-head records, streaks and matchup labels.

use league_analytics::ingestion::derive_week_results;
use league_analytics::{
    AnalyticsConfig, HeadToHeadCalculator, HeadToHeadQuery, MatchupFilter,
    PlayoffBracketClassifier, StandingsAggregator, StandingsQuery, StreakEngine, StreakQuery,
    TeamWeekScore,
};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

fn team(manager: &str, week: u32, matchup_id: u32, points: Decimal) -> TeamWeekScore {
    TeamWeekScore {
        manager_id: manager.to_string(),
        season: 2023,
        week,
        matchup_id: Some(matchup_id),
        points,
        is_playoff: week >= 15,
        is_toilet_bowl: false,
        playoff_round: None,
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();

    let scores = vec![
        team("alice", 1, 1, dec!(120.5)),
        team("bob", 1, 1, dec!(98.0)),
        team("carol", 1, 2, dec!(110.0)),
        team("dave", 1, 2, dec!(85.25)),
        team("alice", 2, 1, dec!(101.0)),
        team("carol", 2, 1, dec!(133.4)),
        team("bob", 2, 2, dec!(92.7)),
        team("dave", 2, 2, dec!(140.1)),
        team("carol", 15, 1, dec!(125.0)),
        team("dave", 15, 1, dec!(70.5)),
    ];
    let derived = derive_week_results(&scores)?;

    let config = AnalyticsConfig::default();
    let schedule = config.schedule(Vec::new());

    println!("Standings (regular season)");
    let standings = StandingsAggregator::new(&schedule)
        .aggregate(&derived.weekly_scores, &StandingsQuery::default())?;
    for row in &standings.rows {
        println!(
            "  {:>2}. {:<6} {}-{} combined  PF {}  all-play {}-{}",
            row.rank,
            row.manager_id,
            row.combined_wins,
            row.combined_losses,
            row.points_for,
            row.all_play_wins,
            row.all_play_losses
        );
    }

    println!("Head-to-head");
    let h2h = HeadToHeadCalculator::new()
        .calculate(&derived.matchups, &HeadToHeadQuery::default())?;
    for record in &h2h.records {
        println!(
            "  {} vs {}: {}-{} ({}%)",
            record.manager_id, record.opponent_id, record.wins, record.losses, record.win_pct
        );
    }

    println!("Current combined streaks");
    let streaks = StreakEngine::new(&schedule).report(&derived.weekly_scores, &StreakQuery::default());
    for manager in &streaks.managers {
        if let Some(current) = manager.current_combined {
            println!("  {}: {:+}", manager.manager_id, current.signed_length());
        }
    }

    println!("Matchups");
    let matchups = PlayoffBracketClassifier::new(&schedule)
        .with_thresholds(config.matchups.clone())
        .report(&derived.matchups, &MatchupFilter::default())?;
    for view in &matchups.matchups {
        println!(
            "  {} wk{}: {} {} - {} {} [{}]",
            view.season,
            view.week,
            view.team1_manager_id,
            view.team1_points,
            view.team2_manager_id,
            view.team2_points,
            view.round_label
        );
    }

    Ok(())
}
