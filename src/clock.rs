//! Date providers.
//!
//! Open-ended subscriptions are measured up to "today". The calculators never
//! read the system time themselves; callers hand them a [`Clock`].

use chrono::{Local, NaiveDate};

/// Supplies the current calendar date.
pub trait Clock: Send + Sync {
    /// Returns today's date.
    fn today(&self) -> NaiveDate;
}

/// The local wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> NaiveDate {
        Local::now().date_naive()
    }
}

/// A clock pinned to a single date, for tests and replays.
///
/// # Example
///
/// ```
/// use academia_billing::clock::{Clock, FixedClock};
/// use chrono::NaiveDate;
///
/// let clock = FixedClock::new(NaiveDate::from_ymd_opt(2025, 3, 10).unwrap());
/// assert_eq!(clock.today(), NaiveDate::from_ymd_opt(2025, 3, 10).unwrap());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedClock {
    date: NaiveDate,
}

impl FixedClock {
    /// Creates a clock that always reports `date`.
    pub fn new(date: NaiveDate) -> Self {
        Self { date }
    }
}

impl Clock for FixedClock {
    fn today(&self) -> NaiveDate {
        self.date
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_clock_is_stable() {
        let date = NaiveDate::from_ymd_opt(2025, 1, 31).unwrap();
        let clock = FixedClock::new(date);
        assert_eq!(clock.today(), date);
        assert_eq!(clock.today(), date);
    }

    #[test]
    fn test_clocks_are_object_safe() {
        let clocks: Vec<Box<dyn Clock>> = vec![
            Box::new(SystemClock),
            Box::new(FixedClock::new(NaiveDate::from_ymd_opt(2025, 1, 1).unwrap())),
        ];
        assert_eq!(clocks.len(), 2);
    }
}
