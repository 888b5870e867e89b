//! Time source for the attendance workflow.
//!
//! The calendar day is what keys attendance rows, so it is computed in one place.

use chrono::{DateTime, FixedOffset, Local, NaiveDate, Offset, Utc};
use std::sync::Mutex;

pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;

    /// Current calendar date in the attendance time zone.
    fn today(&self) -> NaiveDate;
}

/// Wall clock. Uses a fixed UTC offset when configured, else the host's local zone.
pub struct SystemClock {
    offset: Option<FixedOffset>,
}

impl SystemClock {
    #[must_use]
    pub fn new(utc_offset_minutes: Option<i32>) -> Self {
        Self {
            offset: utc_offset_minutes.and_then(|m| FixedOffset::east_opt(m * 60)),
        }
    }
}

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }

    fn today(&self) -> NaiveDate {
        let now = Utc::now();
        self.offset.map_or_else(
            || now.with_timezone(&Local).date_naive(),
            |offset| now.with_timezone(&offset).date_naive(),
        )
    }
}

/// Manually advanced clock for tests and tooling.
pub struct FixedClock {
    now: Mutex<DateTime<Utc>>,
    offset: FixedOffset,
}

impl FixedClock {
    #[must_use]
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            now: Mutex::new(now),
            offset: Utc.fix(),
        }
    }

    #[must_use]
    pub fn with_offset(mut self, utc_offset_minutes: i32) -> Self {
        if let Some(offset) = FixedOffset::east_opt(utc_offset_minutes * 60) {
            self.offset = offset;
        }
        self
    }

    pub fn set(&self, now: DateTime<Utc>) {
        *self.now.lock().unwrap_or_else(std::sync::PoisonError::into_inner) = now;
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    fn today(&self) -> NaiveDate {
        self.now().with_timezone(&self.offset).date_naive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn fixed_clock_day_follows_offset() {
        // 23:30 UTC is already the next day at UTC+7.
        let at = Utc.with_ymd_and_hms(2025, 3, 1, 23, 30, 0).unwrap();

        let utc = FixedClock::new(at);
        assert_eq!(utc.today(), NaiveDate::from_ymd_opt(2025, 3, 1).unwrap());

        let jakarta = FixedClock::new(at).with_offset(7 * 60);
        assert_eq!(jakarta.today(), NaiveDate::from_ymd_opt(2025, 3, 2).unwrap());
    }

    #[test]
    fn fixed_clock_can_be_moved() {
        let clock = FixedClock::new(Utc.with_ymd_and_hms(2025, 3, 1, 9, 0, 0).unwrap());
        clock.set(Utc.with_ymd_and_hms(2025, 3, 2, 9, 0, 0).unwrap());
        assert_eq!(clock.today(), NaiveDate::from_ymd_opt(2025, 3, 2).unwrap());
    }

    #[test]
    fn system_clock_with_offset() {
        let clock = SystemClock::new(Some(0));
        assert_eq!(clock.today(), Utc::now().date_naive());
    }
}
