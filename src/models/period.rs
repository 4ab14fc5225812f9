//! Inclusive date windows.
//!
//! This module contains the [`Period`] type shared by subscriptions (active
//! period) and instructor settlements (liquidation window).

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// An inclusive `[start_date, end_date]` window of calendar days.
///
/// # Example
///
/// ```
/// use academia_billing::models::Period;
/// use chrono::NaiveDate;
///
/// let period = Period::new(
///     NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
///     NaiveDate::from_ymd_opt(2025, 1, 31).unwrap(),
/// );
///
/// assert!(period.contains_date(NaiveDate::from_ymd_opt(2025, 1, 1).unwrap())); // start date
/// assert!(period.contains_date(NaiveDate::from_ymd_opt(2025, 1, 31).unwrap())); // end date
/// assert!(!period.contains_date(NaiveDate::from_ymd_opt(2025, 2, 1).unwrap())); // after
/// assert_eq!(period.days(), 31);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Period {
    /// The first day of the window (inclusive).
    pub start_date: NaiveDate,
    /// The last day of the window (inclusive).
    pub end_date: NaiveDate,
}

impl Period {
    /// Creates a new period.
    pub fn new(start_date: NaiveDate, end_date: NaiveDate) -> Self {
        Self {
            start_date,
            end_date,
        }
    }

    /// Checks if a given date falls within this period, both ends included.
    pub fn contains_date(&self, date: NaiveDate) -> bool {
        date >= self.start_date && date <= self.end_date
    }

    /// Number of calendar days covered, counting both ends.
    ///
    /// Never less than 1: a window whose end precedes its start (a
    /// subscription that starts in the future) still counts as one day.
    pub fn days(&self) -> i64 {
        let delta = (self.end_date - self.start_date).num_days() + 1;
        delta.max(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_single_day_period() {
        let period = Period::new(date(2025, 3, 3), date(2025, 3, 3));
        assert_eq!(period.days(), 1);
        assert!(period.contains_date(date(2025, 3, 3)));
    }

    #[test]
    fn test_inverted_period_counts_one_day() {
        let period = Period::new(date(2025, 3, 10), date(2025, 3, 3));
        assert_eq!(period.days(), 1);
        assert!(!period.contains_date(date(2025, 3, 5)));
    }

    #[test]
    fn test_boundaries_are_inclusive() {
        let period = Period::new(date(2025, 1, 1), date(2025, 1, 31));
        assert!(period.contains_date(date(2025, 1, 1)));
        assert!(period.contains_date(date(2025, 1, 31)));
        assert!(!period.contains_date(date(2024, 12, 31)));
        assert!(!period.contains_date(date(2025, 2, 1)));
    }

    #[test]
    fn test_days_spans_leap_february() {
        let period = Period::new(date(2024, 2, 1), date(2024, 2, 29));
        assert_eq!(period.days(), 29);
    }

    #[test]
    fn test_deserialize_period() {
        let json = r#"{"start_date": "2025-01-01", "end_date": "2025-01-15"}"#;
        let period: Period = serde_json::from_str(json).unwrap();
        assert_eq!(period.start_date, date(2025, 1, 1));
        assert_eq!(period.days(), 15);
    }
}
