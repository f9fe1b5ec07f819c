//! Clock adapter
//!
//! Supplies "today" under a fixed UTC offset so that two updates submitted
//! near midnight are judged against the same day boundary. Streak math
//! never reads the wall clock directly.

use chrono::{FixedOffset, NaiveDate, Utc};

pub trait Clock: Send + Sync {
    fn today(&self) -> NaiveDate;
}

/// Production clock: current date under a fixed offset from UTC
pub struct OffsetClock {
    offset: FixedOffset,
}

impl OffsetClock {
    pub fn new(offset_hours: i32) -> Self {
        let secs = offset_hours.clamp(-12, 14) * 3600;
        let offset = FixedOffset::east_opt(secs).expect("clamped offset is in range");
        Self { offset }
    }
}

impl Clock for OffsetClock {
    fn today(&self) -> NaiveDate {
        Utc::now().with_timezone(&self.offset).date_naive()
    }
}

/// Test clock pinned to one date
pub struct FixedClock {
    date: NaiveDate,
}

impl FixedClock {
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
    fn fixed_clock_returns_pinned_date() {
        let date = NaiveDate::from_ymd_opt(2025, 3, 1).unwrap();
        let clock = FixedClock::new(date);
        assert_eq!(clock.today(), date);
    }

    #[test]
    fn offset_clock_clamps_out_of_range_offsets() {
        // Should not panic even with absurd offsets
        let _ = OffsetClock::new(99);
        let _ = OffsetClock::new(-99);
    }
}
