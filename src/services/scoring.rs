//! Scoring Engine
//!
//! Computes the 0-100 composite reading score from five independently
//! capped components and maps it to a level tier. Recomputed on every
//! stats mutation, never on a schedule.

use serde::{Deserialize, Serialize};

/// Width of the trailing window used for the daily-consistency component
pub const CONSISTENCY_WINDOW_DAYS: i64 = 7;

/// XP needed per numeric level
const XP_PER_LEVEL: i64 = 1000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Tier {
    Beginner,
    Novice,
    Intermediate,
    Advanced,
    Master,
}

impl Tier {
    pub fn from_score(score: i64) -> Self {
        match score {
            0..=19 => Tier::Beginner,
            20..=39 => Tier::Novice,
            40..=59 => Tier::Intermediate,
            60..=79 => Tier::Advanced,
            _ => Tier::Master,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Tier::Beginner => "Beginner",
            Tier::Novice => "Novice",
            Tier::Intermediate => "Intermediate",
            Tier::Advanced => "Advanced",
            Tier::Master => "Master",
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ScoreInput {
    pub books_completed: i32,
    pub total_pages_read: i64,
    pub total_achievements: i32,
    pub current_streak: i32,
    /// Pages read inside the trailing consistency window
    pub window_pages: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Score {
    pub value: i64,
    pub tier: Tier,
}

/// Five components summed, each capped, max 100 total
pub fn compute_score(input: &ScoreInput) -> Score {
    let books = (3 * input.books_completed as i64).min(30);
    let pages = (input.total_pages_read / 100).min(25);

    let daily_avg = input.window_pages / CONSISTENCY_WINDOW_DAYS;
    let consistency = match daily_avg {
        d if d >= 50 => 20,
        d if d >= 30 => 15,
        d if d >= 20 => 10,
        d if d >= 10 => 5,
        _ => 0,
    };

    let achievements = (2 * input.total_achievements as i64).min(15);

    let streak = match input.current_streak {
        s if s >= 100 => 10,
        s if s >= 30 => 7,
        s if s >= 7 => 5,
        s if s >= 3 => 3,
        s if s >= 1 => 1,
        _ => 0,
    };

    let value = books + pages + consistency + achievements + streak;

    Score {
        value,
        tier: Tier::from_score(value),
    }
}

/// Numeric level is a pure function of XP, never set directly
pub fn level_for_xp(xp: i64) -> i32 {
    (xp / XP_PER_LEVEL + 1).max(1) as i32
}
