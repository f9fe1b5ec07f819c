//! Motivation Selector
//!
//! Picks a celebration or encouragement line from a curated pool, skipping
//! the messages most recently sent to the same user so consecutive events
//! do not read identically. Selection is deterministic under a seeded RNG;
//! production callers pass an entropy-seeded one.

use rand::Rng;

use super::catalog::StreakLevel;

/// How many recent messages of the same type are excluded from selection
pub const RECENT_EXCLUSION: u64 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageType {
    AchievementEarned,
    LevelUp,
    DailyMotivation,
}

impl MessageType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MessageType::AchievementEarned => "achievement_earned",
            MessageType::LevelUp => "level_up",
            MessageType::DailyMotivation => "daily_motivation",
        }
    }
}

#[derive(Debug)]
pub struct MotivationEvent<'a> {
    pub kind: MessageType,
    /// Streak-milestone grouping for achievement events; None uses the
    /// generic pool
    pub streak_level: Option<StreakLevel>,
    /// Achievement title or level label substituted into the template
    pub title: &'a str,
}

const BRONZE_POOL: [&str; 5] = [
    "🥉 Bronze Achievement! You earned: {title}",
    "🌟 Great start! You unlocked: {title}",
    "💪 Building momentum! You achieved: {title}",
    "🎯 On the right track! You earned: {title}",
    "⭐ First steps! You unlocked: {title}",
];

const SILVER_POOL: [&str; 5] = [
    "🥈 Silver Achievement! You earned: {title}",
    "🌟 Impressive progress! You unlocked: {title}",
    "💎 Shining bright! You achieved: {title}",
    "🎊 Excellent work! You earned: {title}",
    "⭐ Rising star! You unlocked: {title}",
];

const GOLD_POOL: [&str; 5] = [
    "🥇 Gold Achievement! You earned: {title}",
    "🏆 Outstanding! You unlocked: {title}",
    "💎 Golden performance! You achieved: {title}",
    "🎉 Exceptional! You earned: {title}",
    "⭐ Elite level! You unlocked: {title}",
];

const DIAMOND_POOL: [&str; 5] = [
    "💎 Diamond Achievement! You earned: {title}",
    "👑 Legendary! You unlocked: {title}",
    "💎 Master level! You achieved: {title}",
    "🎊 Phenomenal! You earned: {title}",
    "⭐ Ultimate achievement! You unlocked: {title}",
];

const GENERIC_POOL: [&str; 5] = [
    "🎉 Congratulations! You earned: {title}",
    "🏆 Amazing work! You just unlocked: {title}",
    "⭐ Fantastic! You achieved: {title}",
    "🎊 Well done! You earned: {title}",
    "🌟 Incredible! You unlocked: {title}",
];

const LEVEL_UP_POOL: [&str; 4] = [
    "🚀 Level up! Welcome to {title}!",
    "⭐ You reached {title}! Keep climbing!",
    "🎉 {title} unlocked! Your reading is paying off!",
    "🏆 New heights: {title}! Impressive progress!",
];

const DAILY_POOL: [&str; 5] = [
    "📚 Every page you read is a step toward your goals!",
    "🌟 Today is a perfect day to start reading!",
    "💫 Your next great adventure awaits in the pages of a book!",
    "🚀 Ready to explore new worlds through reading?",
    "✨ Every book is a new opportunity to grow!",
];

fn pool_for(event: &MotivationEvent) -> &'static [&'static str] {
    match event.kind {
        MessageType::AchievementEarned => match event.streak_level {
            Some(StreakLevel::Bronze) => &BRONZE_POOL,
            Some(StreakLevel::Silver) => &SILVER_POOL,
            Some(StreakLevel::Gold) => &GOLD_POOL,
            Some(StreakLevel::Diamond) => &DIAMOND_POOL,
            None => &GENERIC_POOL,
        },
        MessageType::LevelUp => &LEVEL_UP_POOL,
        MessageType::DailyMotivation => &DAILY_POOL,
    }
}

/// Pick one message for the event, avoiding the most recent messages of
/// the same type. Wraps around to the full pool when every entry was
/// recently used.
pub fn select_message(event: &MotivationEvent, recent: &[String], rng: &mut impl Rng) -> String {
    let rendered: Vec<String> = pool_for(event)
        .iter()
        .map(|template| template.replace("{title}", event.title))
        .collect();

    let novel: Vec<&String> = rendered
        .iter()
        .filter(|candidate| !recent.contains(candidate))
        .collect();

    let candidates: Vec<&String> = if novel.is_empty() {
        rendered.iter().collect()
    } else {
        novel
    };

    candidates[rng.gen_range(0..candidates.len())].clone()
}
