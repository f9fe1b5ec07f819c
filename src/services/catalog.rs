//! Achievement catalog
//!
//! Immutable reference data, built once at startup. Rules are a closed set
//! of categories evaluated by the detector; there is no runtime rule
//! registration.

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category {
    Streak,
    BookCount,
    PageCount,
    Style,
    Community,
}

/// Which scope a definition applies to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScopeFilter {
    Individual,
    League,
    Both,
}

impl ScopeFilter {
    pub fn applies_to(&self, league_scope: bool) -> bool {
        match self {
            ScopeFilter::Both => true,
            ScopeFilter::Individual => !league_scope,
            ScopeFilter::League => league_scope,
        }
    }
}

/// Cosmetic grouping of streak milestones, distinct from the score tier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StreakLevel {
    Bronze,
    Silver,
    Gold,
    Diamond,
}

impl StreakLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            StreakLevel::Bronze => "Bronze",
            StreakLevel::Silver => "Silver",
            StreakLevel::Gold => "Gold",
            StreakLevel::Diamond => "Diamond",
        }
    }
}

pub fn streak_level(days: i64) -> StreakLevel {
    match days {
        d if d <= 30 => StreakLevel::Bronze,
        d if d <= 100 => StreakLevel::Silver,
        d if d <= 250 => StreakLevel::Gold,
        _ => StreakLevel::Diamond,
    }
}

#[derive(Debug, Clone)]
pub struct AchievementDefinition {
    /// Unique key, also the FK stored on earned records
    pub key: String,
    pub category: Category,
    pub threshold: i64,
    pub xp_reward: i64,
    pub title: String,
    pub description: String,
    pub icon: String,
    pub scope: ScopeFilter,
}

pub const STREAK_MILESTONES: [(i64, i64); 14] = [
    (1, 10),
    (3, 25),
    (7, 50),
    (14, 100),
    (21, 150),
    (30, 200),
    (50, 400),
    (75, 600),
    (100, 1000),
    (150, 1500),
    (200, 2000),
    (250, 2500),
    (300, 3000),
    (365, 5000),
];

const BOOK_MILESTONES: [(&str, i64, i64, &str, &str); 5] = [
    ("first_book", 1, 100, "First Book", "Completed your first book"),
    ("book_collector", 5, 300, "Book Collector", "Completed 5 books"),
    ("book_lover", 10, 600, "Book Lover", "Completed 10 books"),
    (
        "book_enthusiast",
        25,
        1500,
        "Book Enthusiast",
        "Completed 25 books",
    ),
    ("book_master", 50, 3000, "Book Master", "Completed 50 books"),
];

const PAGE_MILESTONES: [i64; 4] = [100, 500, 1000, 5000];

const LEAGUE_PAGE_MILESTONES: [i64; 4] = [100, 500, 1000, 2000];

static CATALOG: Lazy<Vec<AchievementDefinition>> = Lazy::new(|| {
    let mut defs = Vec::new();

    for (days, xp) in STREAK_MILESTONES {
        defs.push(AchievementDefinition {
            key: format!("{}_day_streak", days),
            category: Category::Streak,
            threshold: days,
            xp_reward: xp,
            title: format!("{}-Day Streak", days),
            description: format!("Maintained a reading streak for {} days", days),
            icon: "🔥".to_string(),
            scope: ScopeFilter::Both,
        });
    }

    for (key, threshold, xp, title, description) in BOOK_MILESTONES {
        defs.push(AchievementDefinition {
            key: key.to_string(),
            category: Category::BookCount,
            threshold,
            xp_reward: xp,
            title: title.to_string(),
            description: description.to_string(),
            icon: "📚".to_string(),
            scope: ScopeFilter::Both,
        });
    }

    for pages in PAGE_MILESTONES {
        defs.push(AchievementDefinition {
            key: format!("{}_pages", pages),
            category: Category::PageCount,
            threshold: pages,
            xp_reward: pages / 10,
            title: "Page Reader".to_string(),
            description: format!("Read {} pages in total", pages),
            icon: "📄".to_string(),
            scope: ScopeFilter::Individual,
        });
    }

    defs.push(AchievementDefinition {
        key: "speed_reader".to_string(),
        category: Category::Style,
        threshold: 50,
        xp_reward: 100,
        title: "Speed Reader".to_string(),
        description: "Read 50+ pages in a single day".to_string(),
        icon: "⚡".to_string(),
        scope: ScopeFilter::Individual,
    });
    defs.push(AchievementDefinition {
        key: "marathon_reader".to_string(),
        category: Category::Style,
        threshold: 100,
        xp_reward: 200,
        title: "Marathon Reader".to_string(),
        description: "Read 100+ pages in a single day".to_string(),
        icon: "🏃".to_string(),
        scope: ScopeFilter::Individual,
    });

    defs.push(AchievementDefinition {
        key: "community_contributor".to_string(),
        category: Category::Community,
        threshold: 0,
        xp_reward: 100,
        title: "Community Star".to_string(),
        description: "Participated in a reading league".to_string(),
        icon: "🌟".to_string(),
        scope: ScopeFilter::League,
    });
    for pages in LEAGUE_PAGE_MILESTONES {
        defs.push(AchievementDefinition {
            key: format!("league_{}_pages", pages),
            category: Category::Community,
            threshold: pages,
            xp_reward: pages / 5,
            title: format!("League {} Pages", pages),
            description: format!("Read {} pages in this league", pages),
            icon: "🏆".to_string(),
            scope: ScopeFilter::League,
        });
    }
    defs.push(AchievementDefinition {
        key: "weekly_top_reader".to_string(),
        category: Category::Community,
        threshold: 0,
        xp_reward: 150,
        title: "Weekly Top Reader".to_string(),
        description: "Read the most pages in the league this week".to_string(),
        icon: "🥇".to_string(),
        scope: ScopeFilter::League,
    });

    defs
});

pub fn catalog() -> &'static [AchievementDefinition] {
    &CATALOG
}

pub fn find(key: &str) -> Option<&'static AchievementDefinition> {
    CATALOG.iter().find(|d| d.key == key)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn catalog_keys_are_unique() {
        let keys: HashSet<&str> = catalog().iter().map(|d| d.key.as_str()).collect();
        assert_eq!(keys.len(), catalog().len());
    }

    #[test]
    fn streak_levels_group_milestones() {
        assert_eq!(streak_level(1), StreakLevel::Bronze);
        assert_eq!(streak_level(30), StreakLevel::Bronze);
        assert_eq!(streak_level(50), StreakLevel::Silver);
        assert_eq!(streak_level(100), StreakLevel::Silver);
        assert_eq!(streak_level(150), StreakLevel::Gold);
        assert_eq!(streak_level(250), StreakLevel::Gold);
        assert_eq!(streak_level(300), StreakLevel::Diamond);
        assert_eq!(streak_level(365), StreakLevel::Diamond);
    }

    #[test]
    fn find_resolves_known_keys() {
        let def = find("7_day_streak").expect("7_day_streak in catalog");
        assert_eq!(def.threshold, 7);
        assert_eq!(def.xp_reward, 50);
        assert!(find("no_such_key").is_none());
    }

    #[test]
    fn league_definitions_never_apply_to_individual_scope() {
        for def in catalog().iter().filter(|d| d.scope == ScopeFilter::League) {
            assert!(!def.scope.applies_to(false), "{} leaks scope", def.key);
        }
    }
}
