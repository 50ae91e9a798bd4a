//! Request parameters and their validation

use league_analytics::{
    AnalyticsError, HeadToHeadQuery, ManagerId, MatchupFilter, MatchupType, Perspective, Result,
    Season, StandingsQuery, StreakQuery,
};
use league_store::config::validate_league_id;
use league_store::RowQuery;
use serde::{Deserialize, Serialize};

/// A validated analytics request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalyticsRequest {
    pub league_id: String,
    /// `None` means every season
    pub season: Option<Season>,
    pub manager_id: Option<ManagerId>,
    pub matchup_type: MatchupType,
    /// Standings and streaks leave playoff weeks out unless asked
    pub include_playoffs: bool,
    pub perspective: Perspective,
}

impl AnalyticsRequest {
    pub fn new(league_id: impl Into<String>) -> Self {
        Self {
            league_id: league_id.into(),
            season: None,
            manager_id: None,
            matchup_type: MatchupType::All,
            include_playoffs: false,
            perspective: Perspective::Stored,
        }
    }

    /// Build a request from string parameters.
    ///
    /// Keys may be camelCase (`leagueId`) or snake_case (`league_id`); unknown
    /// keys are ignored.
    pub fn from_params<I, K, V>(params: I) -> Result<Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut league_id = None;
        let mut request = Self::new(String::new());
        let mut playoff_only = false;
        let mut explicit_type = None;

        for (key, value) in params {
            let value = value.as_ref().trim();
            match snake_case(key.as_ref()).as_str() {
                "league_id" => league_id = Some(value.to_string()),
                "season" => request.season = parse_season(value)?,
                "manager_id" => {
                    request.manager_id = (!value.is_empty()).then(|| value.to_string())
                }
                "matchup_type" if !value.is_empty() => explicit_type = Some(value.parse::<MatchupType>()?),
                "playoff_only" => playoff_only = parse_flag("playoff_only", value)?,
                "include_playoffs" => request.include_playoffs = parse_flag("include_playoffs", value)?,
                "perspective" if !value.is_empty() => request.perspective = value.parse()?,
                other => tracing::debug!("Ignoring request parameter: {}", other),
            }
        }

        request.league_id = league_id
            .filter(|id| !id.is_empty())
            .ok_or_else(|| AnalyticsError::validation("league_id", "is required"))?;
        validate_league_id(&request.league_id)
            .map_err(|message| AnalyticsError::validation("league_id", message))?;

        request.matchup_type = match (playoff_only, explicit_type) {
            (true, Some(MatchupType::Regular)) => {
                return Err(AnalyticsError::validation(
                    "playoff_only",
                    "conflicts with matchup_type=regular",
                ))
            }
            (true, _) => MatchupType::Playoff,
            (false, explicit) => explicit.unwrap_or_default(),
        };

        Ok(request)
    }

    /// Rows the request needs from the store
    pub fn row_query(&self) -> RowQuery {
        RowQuery::league(self.league_id.clone()).with_season(self.season)
    }

    pub fn standings_query(&self) -> StandingsQuery {
        StandingsQuery { season: self.season, include_playoffs: self.include_playoffs }
    }

    pub fn head_to_head_query(&self) -> HeadToHeadQuery {
        HeadToHeadQuery {
            manager_id: self.manager_id.clone(),
            matchup_type: self.matchup_type,
            perspective: self.perspective,
        }
    }

    pub fn streak_query(&self) -> StreakQuery {
        StreakQuery {
            season: self.season,
            manager_id: self.manager_id.clone(),
            include_playoffs: self.include_playoffs,
        }
    }

    pub fn matchup_filter(&self) -> MatchupFilter {
        MatchupFilter {
            season: self.season,
            manager_id: self.manager_id.clone(),
            matchup_type: self.matchup_type,
        }
    }
}

fn snake_case(key: &str) -> String {
    let mut out = String::with_capacity(key.len() + 4);
    for c in key.trim().chars() {
        if c.is_ascii_uppercase() {
            out.push('_');
            out.push(c.to_ascii_lowercase());
        } else {
            out.push(c);
        }
    }
    out
}

fn parse_season(value: &str) -> Result<Option<Season>> {
    if value.is_empty() || value.eq_ignore_ascii_case("all") {
        return Ok(None);
    }
    match value.parse::<Season>() {
        Ok(season) if season > 0 => Ok(Some(season)),
        _ => Err(AnalyticsError::validation(
            "season",
            format!("expected a numeric season, got '{value}'"),
        )),
    }
}

fn parse_flag(field: &str, value: &str) -> Result<bool> {
    match value.to_ascii_lowercase().as_str() {
        "" | "false" | "0" | "no" => Ok(false),
        "true" | "1" | "yes" => Ok(true),
        _ => Err(AnalyticsError::validation(field, format!("expected a boolean, got '{value}'"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_camel_and_snake_keys() {
        let request = AnalyticsRequest::from_params([
            ("leagueId", "abc"),
            ("season", "2023"),
            ("managerId", "u1"),
            ("include_playoffs", "true"),
        ])
        .unwrap();

        assert_eq!(request.league_id, "abc");
        assert_eq!(request.season, Some(2023));
        assert_eq!(request.manager_id.as_deref(), Some("u1"));
        assert!(request.include_playoffs);
        assert_eq!(request.matchup_type, MatchupType::All);
        assert_eq!(request.perspective, Perspective::Stored);
    }

    #[test]
    fn test_defaults() {
        let request = AnalyticsRequest::from_params([("league_id", "abc"), ("season", "all")]).unwrap();
        assert_eq!(request, AnalyticsRequest::new("abc"));
        assert_eq!(request.row_query(), RowQuery::league("abc"));
    }

    #[test]
    fn test_league_id_required() {
        let err = AnalyticsRequest::from_params([("season", "2023")]).unwrap_err();
        assert_eq!(err.to_string(), "Validation error: league_id: is required");
        assert!(AnalyticsRequest::from_params([("leagueId", "../x")]).is_err());
    }

    #[test]
    fn test_non_numeric_season_rejected() {
        let err = AnalyticsRequest::from_params([("leagueId", "abc"), ("season", "last")]).unwrap_err();
        assert_eq!(err.status_code(), 400);
        assert!(AnalyticsRequest::from_params([("leagueId", "abc"), ("season", "-4")]).is_err());
    }

    #[test]
    fn test_playoff_only_sets_matchup_type() {
        let request =
            AnalyticsRequest::from_params([("leagueId", "abc"), ("playoffOnly", "1")]).unwrap();
        assert_eq!(request.matchup_type, MatchupType::Playoff);
        assert_eq!(request.matchup_filter().matchup_type, MatchupType::Playoff);

        let conflict = AnalyticsRequest::from_params([
            ("leagueId", "abc"),
            ("playoffOnly", "true"),
            ("matchupType", "regular"),
        ]);
        assert!(conflict.is_err());
    }

    #[test]
    fn test_bad_flag_and_type_rejected() {
        assert!(AnalyticsRequest::from_params([("leagueId", "abc"), ("includePlayoffs", "maybe")]).is_err());
        assert!(AnalyticsRequest::from_params([("leagueId", "abc"), ("matchupType", "weekly")]).is_err());
    }

    #[test]
    fn test_queries_carry_filters() {
        let request = AnalyticsRequest::from_params([
            ("leagueId", "abc"),
            ("season", "2022"),
            ("managerId", "u2"),
            ("perspective", "both_sides"),
        ])
        .unwrap();

        assert_eq!(request.standings_query(), StandingsQuery { season: Some(2022), include_playoffs: false });
        assert_eq!(request.head_to_head_query().perspective, Perspective::BothSides);
        assert_eq!(request.streak_query().manager_id.as_deref(), Some("u2"));
        assert_eq!(request.row_query().season, Some(2022));
    }
}
