//! Rounding and summing helpers shared by every report.
//!
//! Points and margins are reported to 2 decimal places, percentages to 1.
//! Running totals go through the checked sums so oversized input surfaces as a
//! validation error instead of an arithmetic panic.

use crate::error::{AnalyticsError, Result};
use rust_decimal::{Decimal, RoundingStrategy};

/// Round a points figure to 2 decimal places (half away from zero)
pub fn points(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Round a percentage to 1 decimal place (half away from zero)
pub fn percent(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(1, RoundingStrategy::MidpointAwayFromZero)
}

/// `part / whole * 100` rounded to 1 dp, or 0 when `whole` is 0
pub fn win_percentage(wins: u32, decided: u32) -> Decimal {
    if decided == 0 {
        return Decimal::ZERO;
    }
    percent(Decimal::from(wins) * Decimal::ONE_HUNDRED / Decimal::from(decided))
}

/// `total / count` rounded to 2 dp, or 0 when `count` is 0
pub fn average(total: Decimal, count: usize) -> Decimal {
    if count == 0 {
        return Decimal::ZERO;
    }
    points(total / Decimal::from(count as u64))
}

/// `total + value`, or a validation error naming `field` on overflow
pub fn checked_points(field: &str, total: Decimal, value: Decimal) -> Result<Decimal> {
    total
        .checked_add(value)
        .ok_or_else(|| AnalyticsError::validation(field, format!("total overflowed adding {value}")))
}

/// `total - value`, or a validation error naming `field` on overflow
pub fn checked_margin(field: &str, total: Decimal, value: Decimal) -> Result<Decimal> {
    total
        .checked_sub(value)
        .ok_or_else(|| AnalyticsError::validation(field, format!("margin overflowed subtracting {value}")))
}

/// `total + value` for counters
pub fn checked_count(field: &str, total: u32, value: u32) -> Result<u32> {
    total
        .checked_add(value)
        .ok_or_else(|| AnalyticsError::validation(field, format!("count overflowed adding {value}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_points_round_half_away_from_zero() {
        assert_eq!(points(dec!(104.125)), dec!(104.13));
        assert_eq!(points(dec!(-3.005)), dec!(-3.01));
        assert_eq!(points(dec!(98)), dec!(98));
    }

    #[test]
    fn test_win_percentage() {
        assert_eq!(win_percentage(2, 3), dec!(66.7));
        assert_eq!(win_percentage(1, 8), dec!(12.5));
        assert_eq!(win_percentage(0, 0), Decimal::ZERO);
    }

    #[test]
    fn test_average() {
        assert_eq!(average(dec!(413.75), 4), dec!(103.44));
        assert_eq!(average(dec!(10), 0), Decimal::ZERO);
    }

    #[test]
    fn test_checked_sums_report_overflow() {
        assert_eq!(checked_points("points_for", dec!(1.5), dec!(2.25)).unwrap(), dec!(3.75));
        assert!(matches!(
            checked_points("points_for", Decimal::MAX, Decimal::ONE),
            Err(AnalyticsError::Validation { field, .. }) if field == "points_for"
        ));
        assert!(checked_margin("margin", Decimal::MIN, Decimal::ONE).is_err());
        assert_eq!(checked_count("all_play_wins", 3, 4).unwrap(), 7);
        assert!(checked_count("all_play_wins", u32::MAX, 1).is_err());
    }
}
