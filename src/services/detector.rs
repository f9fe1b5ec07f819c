//! Achievement Detector
//!
//! Pure function of a before/after stats snapshot plus the set of already
//! earned achievement types. The earned set is an input, never re-queried
//! mid-evaluation, which keeps detection replay-safe: the same snapshots
//! always yield the same achievements.

use std::collections::HashSet;

use super::catalog::{self, AchievementDefinition, Category};

/// The counters a rule predicate can look at
#[derive(Debug, Clone, Copy, Default)]
pub struct StatsSnapshot {
    pub current_streak: i32,
    pub books_completed: i32,
    pub total_pages_read: i64,
}

/// League-specific conditions the engine cannot derive itself; supplied by
/// the caller per update
#[derive(Debug, Clone, Copy, Default)]
pub struct CommunityContext {
    pub weekly_top_reader: bool,
}

#[derive(Debug)]
pub struct DetectionInput<'a> {
    pub before: StatsSnapshot,
    pub after: StatsSnapshot,
    pub league_scope: bool,
    pub earned: &'a HashSet<String>,
    /// Total pages recorded for the activity day, including this update
    pub pages_today: i64,
    pub community: Option<CommunityContext>,
}

pub fn detect(input: &DetectionInput) -> Vec<&'static AchievementDefinition> {
    catalog::catalog()
        .iter()
        .filter(|def| def.scope.applies_to(input.league_scope))
        .filter(|def| !input.earned.contains(&def.key))
        .filter(|def| fires(def, input))
        .collect()
}

fn fires(def: &AchievementDefinition, input: &DetectionInput) -> bool {
    match def.category {
        // Exact match: holding a high streak must not re-fire lower
        // milestones on every subsequent update
        Category::Streak => i64::from(input.after.current_streak) == def.threshold,
        Category::BookCount => crossed(
            i64::from(input.before.books_completed),
            i64::from(input.after.books_completed),
            def.threshold,
        ),
        Category::PageCount => crossed(
            input.before.total_pages_read,
            input.after.total_pages_read,
            def.threshold,
        ),
        Category::Style => input.pages_today >= def.threshold,
        Category::Community => match def.key.as_str() {
            "weekly_top_reader" => input
                .community
                .map(|c| c.weekly_top_reader)
                .unwrap_or(false),
            "community_contributor" => true,
            _ => crossed(
                input.before.total_pages_read,
                input.after.total_pages_read,
                def.threshold,
            ),
        },
    }
}

/// Threshold crossed from below by this update
fn crossed(before: i64, after: i64, threshold: i64) -> bool {
    before < threshold && threshold <= after
}
