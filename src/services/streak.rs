//! Streak Tracker
//!
//! Derives the current/longest streak from the sequence of distinct
//! reading-activity dates. Same-day repeats are idempotent, a one-day gap
//! extends the streak, anything longer resets it to 1. Backdated activity
//! is rejected: streaks only advance forward in time.

use chrono::NaiveDate;

use crate::domain::EngineError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreakAdvance {
    pub current: i32,
    pub longest: i32,
    /// Days between the stored last activity and this one (0 = same day)
    pub gap_days: i64,
}

pub fn advance(
    current: i32,
    longest: i32,
    last_activity: Option<NaiveDate>,
    activity_date: NaiveDate,
) -> Result<StreakAdvance, EngineError> {
    let (new_current, gap_days) = match last_activity {
        None => (1, 0),
        Some(last) => {
            let gap = activity_date.signed_duration_since(last).num_days();
            if gap < 0 {
                return Err(EngineError::InvalidActivityDate);
            }
            match gap {
                0 => (current, 0),
                1 => (current + 1, 1),
                n => (1, n),
            }
        }
    };

    Ok(StreakAdvance {
        current: new_current,
        longest: longest.max(new_current),
        gap_days,
    })
}
