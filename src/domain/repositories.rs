//! Repository trait definitions
//!
//! These traits define the contract for data access.
//! Implementations live in the infrastructure layer.

use async_trait::async_trait;
use std::collections::HashSet;

use super::EngineError;
use crate::models::{achievement, league, user_stats};

/// Everything the engine writes for one progress update. Persisted as a
/// single atomic unit: stats row, earned-achievement rows and the per-day
/// session row either all commit or none do.
#[derive(Debug, Clone)]
pub struct ProgressCommit {
    /// None = first event for this (user, scope), insert a fresh row
    pub stats_id: Option<i32>,
    /// Version the stats row had when it was loaded
    pub expected_version: i64,
    pub user_id: i64,
    pub league_id: Option<i32>,
    pub current_streak: i32,
    pub longest_streak: i32,
    pub last_activity_date: String,
    pub books_completed: i32,
    pub total_pages_read: i64,
    pub xp: i64,
    pub level: i32,
    pub total_achievements: i32,
    /// Day the update applies to ('YYYY-MM-DD')
    pub session_date: String,
    /// Total pages for that day after this update
    pub session_pages: i64,
    /// Catalog keys of achievements earned by this update
    pub new_achievements: Vec<String>,
    pub earned_at: String,
}

/// One league member's committed progress, used by the leaderboard ranker
#[derive(Debug, Clone)]
pub struct MemberStanding {
    pub user_id: i64,
    pub pages_read: i64,
    pub books_completed: i32,
    pub joined_at: String,
}

/// Data access for user stats, achievements and reading sessions.
/// Pure storage: no business rules live behind this trait.
#[async_trait]
pub trait StatsRepository: Send + Sync {
    /// Load the stats row for a (user, scope) pair, if one exists
    async fn load_stats(
        &self,
        user_id: i64,
        league_id: Option<i32>,
    ) -> Result<Option<user_stats::Model>, EngineError>;

    /// Set of achievement types already earned for this (user, scope)
    async fn earned_types(
        &self,
        user_id: i64,
        league_id: Option<i32>,
    ) -> Result<HashSet<String>, EngineError>;

    /// Pages already recorded for a single day in this scope
    async fn session_pages_on(
        &self,
        user_id: i64,
        league_id: Option<i32>,
        date: &str,
    ) -> Result<i64, EngineError>;

    /// Sum of pages over a closed date range in this scope
    async fn pages_in_window(
        &self,
        user_id: i64,
        league_id: Option<i32>,
        from: &str,
        to: &str,
    ) -> Result<i64, EngineError>;

    /// Persist one progress update atomically. Fails with
    /// `PersistenceConflict` when the stats row moved past
    /// `expected_version` since it was loaded.
    async fn commit_update(
        &self,
        commit: ProgressCommit,
    ) -> Result<user_stats::Model, EngineError>;

    /// Find an active league by id
    async fn find_league(&self, league_id: i32) -> Result<Option<league::Model>, EngineError>;

    /// Whether the user belongs to the league
    async fn is_member(&self, league_id: i32, user_id: i64) -> Result<bool, EngineError>;

    /// Full member snapshot for ranking: join date plus league-scope counters
    async fn league_standings(
        &self,
        league_id: i32,
    ) -> Result<Vec<MemberStanding>, EngineError>;

    /// Earned achievements for display, most recent first
    async fn achievements_for(
        &self,
        user_id: i64,
        league_id: Option<i32>,
    ) -> Result<Vec<achievement::Model>, EngineError>;

    /// Flag achievements as notified once the caller has delivered them
    async fn mark_notified(
        &self,
        user_id: i64,
        league_id: Option<i32>,
        types: &[String],
    ) -> Result<(), EngineError>;

    /// Most recent message contents of one type, newest first
    async fn recent_messages(
        &self,
        user_id: i64,
        message_type: &str,
        limit: u64,
    ) -> Result<Vec<String>, EngineError>;

    /// Append a delivered message to the audit log
    async fn log_message(
        &self,
        user_id: i64,
        message_type: &str,
        content: &str,
        sent_at: &str,
    ) -> Result<(), EngineError>;
}
