//! Calendar helpers for month-based projections.

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Number of days in the given month (leap years honoured).
pub fn days_in_month(year: i32, month: u32) -> u32 {
    let (next_year, next_month) = next_month(year, month);
    match (
        NaiveDate::from_ymd_opt(year, month, 1),
        NaiveDate::from_ymd_opt(next_year, next_month, 1),
    ) {
        (Some(first), Some(next_first)) => (next_first - first).num_days() as u32,
        // Out-of-range months never reach here from a valid `DateTime`.
        _ => 30,
    }
}

/// Share of the current month still ahead of `now`.
///
/// Counted in whole days: the first day of a month has zero days elapsed and
/// yields `1.0`; on the 16th of a 30-day month (15 days elapsed) it is `0.5`.
pub fn month_fraction_remaining(now: DateTime<Utc>) -> f64 {
    let date = now.date_naive();
    let total = days_in_month(date.year(), date.month());
    let elapsed = date.day0();
    f64::from(total - elapsed) / f64::from(total)
}

/// One entry of the month axis shown above the projection columns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthLabel {
    pub year: i32,
    pub month: u32,
    /// Short display label, e.g. `"Oct 2026"`.
    pub label: String,
}

/// Calendar months starting at the month containing `now`.
pub fn month_axis(now: DateTime<Utc>, horizon: usize) -> Vec<MonthLabel> {
    let date = now.date_naive();
    let (mut year, mut month) = (date.year(), date.month());
    let mut axis = Vec::with_capacity(horizon);

    for _ in 0..horizon {
        let label = NaiveDate::from_ymd_opt(year, month, 1)
            .map(|d| d.format("%b %Y").to_string())
            .unwrap_or_default();
        axis.push(MonthLabel { year, month, label });
        (year, month) = next_month(year, month);
    }

    axis
}

fn next_month(year: i32, month: u32) -> (i32, u32) {
    if month >= 12 { (year + 1, 1) } else { (year, month + 1) }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn utc(y: i32, m: u32, d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, 9, 30, 0).unwrap()
    }

    #[test]
    fn days_in_month_handles_leap_years() {
        assert_eq!(days_in_month(2026, 2), 28);
        assert_eq!(days_in_month(2028, 2), 29);
        assert_eq!(days_in_month(2026, 9), 30);
        assert_eq!(days_in_month(2026, 12), 31);
    }

    #[test]
    fn first_day_of_month_has_full_fraction() {
        assert_eq!(month_fraction_remaining(utc(2026, 9, 1)), 1.0);
        assert_eq!(month_fraction_remaining(utc(2026, 2, 1)), 1.0);
    }

    #[test]
    fn fraction_counts_elapsed_whole_days() {
        assert_eq!(month_fraction_remaining(utc(2026, 9, 16)), 0.5);
        assert_eq!(month_fraction_remaining(utc(2026, 9, 30)), 1.0 / 30.0);
    }

    #[test]
    fn fraction_never_increases_through_the_month() {
        let mut previous = f64::INFINITY;
        for day in 1..=31 {
            let fraction = month_fraction_remaining(utc(2026, 10, day));
            assert!(fraction <= previous, "day {day}: {fraction} > {previous}");
            assert!(fraction > 0.0);
            previous = fraction;
        }
    }

    #[test]
    fn month_axis_crosses_year_boundary() {
        let axis = month_axis(utc(2026, 10, 18), 6);
        let labels: Vec<&str> = axis.iter().map(|m| m.label.as_str()).collect();

        assert_eq!(
            labels,
            vec!["Oct 2026", "Nov 2026", "Dec 2026", "Jan 2027", "Feb 2027", "Mar 2027"]
        );
        assert_eq!((axis[3].year, axis[3].month), (2027, 1));
    }

    #[test]
    fn empty_horizon_yields_empty_axis() {
        assert!(month_axis(utc(2026, 10, 18), 0).is_empty());
    }
}
