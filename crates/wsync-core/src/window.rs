//! The reconciliation window.

use chrono::{DateTime, Days, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::ValidationError;

/// A half-open `[start, end)` range of instants compared in one run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncWindow {
    start: DateTime<Utc>,
    end: DateTime<Utc>,
}

impl SyncWindow {
    /// Creates a window, rejecting empty or inverted ranges.
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Self, ValidationError> {
        if end <= start {
            return Err(ValidationError::EmptyWindow {
                start: start.to_rfc3339(),
                end: end.to_rfc3339(),
            });
        }
        Ok(Self { start, end })
    }

    /// Whole UTC days around `now`: `days` back and `days` ahead, today included.
    pub fn around(now: DateTime<Utc>, days: u32) -> Self {
        let today = now.date_naive();
        let span = Days::new(u64::from(days));
        let first = today.checked_sub_days(span).unwrap_or(NaiveDate::MIN);
        let last = today.checked_add_days(span).unwrap_or(NaiveDate::MAX);
        let after_last = last.checked_add_days(Days::new(1)).unwrap_or(NaiveDate::MAX);
        Self {
            start: first.and_time(NaiveTime::MIN).and_utc(),
            end: after_last.and_time(NaiveTime::MIN).and_utc(),
        }
    }

    pub const fn start(&self) -> DateTime<Utc> {
        self.start
    }

    pub const fn end(&self) -> DateTime<Utc> {
        self.end
    }

    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        self.start <= instant && instant < self.end
    }

    /// First calendar date touched by the window.
    pub fn first_date(&self) -> NaiveDate {
        self.start.date_naive()
    }

    /// Last calendar date touched by the window (inclusive).
    pub fn last_date(&self) -> NaiveDate {
        let last_instant = self.end - chrono::Duration::nanoseconds(1);
        last_instant.date_naive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use chrono::TimeZone;

    #[test]
    fn around_covers_whole_days_both_ways() {
        let now = Utc.with_ymd_and_hms(2024, 1, 15, 13, 45, 0).unwrap();
        let window = SyncWindow::around(now, 14);
        assert_eq!(
            window.start(),
            Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()
        );
        assert_eq!(
            window.end(),
            Utc.with_ymd_and_hms(2024, 1, 30, 0, 0, 0).unwrap()
        );
        assert_eq!(window.first_date(), NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
        assert_eq!(window.last_date(), NaiveDate::from_ymd_opt(2024, 1, 29).unwrap());
    }

    #[test]
    fn zero_days_is_today_only() {
        let now = Utc.with_ymd_and_hms(2024, 1, 15, 0, 0, 0).unwrap();
        let window = SyncWindow::around(now, 0);
        assert_eq!(window.first_date(), window.last_date());
        assert!(window.contains(now));
    }

    #[test]
    fn window_is_half_open() {
        let start = Utc.with_ymd_and_hms(2024, 1, 15, 0, 0, 0).unwrap();
        let end = Utc.with_ymd_and_hms(2024, 1, 16, 0, 0, 0).unwrap();
        let window = SyncWindow::new(start, end).unwrap();
        assert!(window.contains(start));
        assert!(!window.contains(end));
    }

    #[test]
    fn rejects_inverted_range() {
        let start = Utc.with_ymd_and_hms(2024, 1, 15, 0, 0, 0).unwrap();
        assert!(matches!(
            SyncWindow::new(start, start),
            Err(ValidationError::EmptyWindow { .. })
        ));
    }
}
