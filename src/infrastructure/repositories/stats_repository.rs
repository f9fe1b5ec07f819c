//! SeaORM implementation of StatsRepository
//!
//! All writes for one progress update go through `commit_update`, which
//! wraps them in a single transaction: a crash between compute and persist
//! leaves state unchanged, so a retried update is safe.

use async_trait::async_trait;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, DatabaseTransaction, EntityTrait,
    QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};
use std::collections::{HashMap, HashSet};

use crate::domain::{EngineError, MemberStanding, ProgressCommit, StatsRepository};
use crate::models::{achievement, league, league_member, motivation_log, reading_session, user_stats};

/// SeaORM-based implementation of StatsRepository
pub struct SeaOrmStatsRepository {
    db: DatabaseConnection,
}

impl SeaOrmStatsRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

fn stats_scope(user_id: i64, league_id: Option<i32>) -> Condition {
    let cond = Condition::all().add(user_stats::Column::UserId.eq(user_id));
    match league_id {
        Some(id) => cond.add(user_stats::Column::LeagueId.eq(id)),
        None => cond.add(user_stats::Column::LeagueId.is_null()),
    }
}

fn achievement_scope(user_id: i64, league_id: Option<i32>) -> Condition {
    let cond = Condition::all().add(achievement::Column::UserId.eq(user_id));
    match league_id {
        Some(id) => cond.add(achievement::Column::LeagueId.eq(id)),
        None => cond.add(achievement::Column::LeagueId.is_null()),
    }
}

fn session_scope(user_id: i64, league_id: Option<i32>) -> Condition {
    let cond = Condition::all().add(reading_session::Column::UserId.eq(user_id));
    match league_id {
        Some(id) => cond.add(reading_session::Column::LeagueId.eq(id)),
        None => cond.add(reading_session::Column::LeagueId.is_null()),
    }
}

async fn upsert_session(
    txn: &DatabaseTransaction,
    commit: &ProgressCommit,
    now: &str,
) -> Result<(), EngineError> {
    let existing = reading_session::Entity::find()
        .filter(session_scope(commit.user_id, commit.league_id))
        .filter(reading_session::Column::SessionDate.eq(commit.session_date.as_str()))
        .one(txn)
        .await?;

    match existing {
        Some(session) => {
            let mut active: reading_session::ActiveModel = session.into();
            active.pages_read = Set(commit.session_pages);
            active.updated_at = Set(now.to_string());
            active.update(txn).await?;
        }
        None => {
            let session = reading_session::ActiveModel {
                user_id: Set(commit.user_id),
                league_id: Set(commit.league_id),
                session_date: Set(commit.session_date.clone()),
                pages_read: Set(commit.session_pages),
                created_at: Set(now.to_string()),
                updated_at: Set(now.to_string()),
                ..Default::default()
            };
            session.insert(txn).await?;
        }
    }

    Ok(())
}

#[async_trait]
impl StatsRepository for SeaOrmStatsRepository {
    async fn load_stats(
        &self,
        user_id: i64,
        league_id: Option<i32>,
    ) -> Result<Option<user_stats::Model>, EngineError> {
        let stats = user_stats::Entity::find()
            .filter(stats_scope(user_id, league_id))
            .one(&self.db)
            .await?;
        Ok(stats)
    }

    async fn earned_types(
        &self,
        user_id: i64,
        league_id: Option<i32>,
    ) -> Result<HashSet<String>, EngineError> {
        let rows = achievement::Entity::find()
            .filter(achievement_scope(user_id, league_id))
            .all(&self.db)
            .await?;
        Ok(rows.into_iter().map(|a| a.achievement_type).collect())
    }

    async fn session_pages_on(
        &self,
        user_id: i64,
        league_id: Option<i32>,
        date: &str,
    ) -> Result<i64, EngineError> {
        let session = reading_session::Entity::find()
            .filter(session_scope(user_id, league_id))
            .filter(reading_session::Column::SessionDate.eq(date))
            .one(&self.db)
            .await?;
        Ok(session.map(|s| s.pages_read).unwrap_or(0))
    }

    async fn pages_in_window(
        &self,
        user_id: i64,
        league_id: Option<i32>,
        from: &str,
        to: &str,
    ) -> Result<i64, EngineError> {
        // The window is at most a handful of rows; summing in memory keeps
        // the query trivial
        let sessions = reading_session::Entity::find()
            .filter(session_scope(user_id, league_id))
            .filter(reading_session::Column::SessionDate.gte(from))
            .filter(reading_session::Column::SessionDate.lte(to))
            .all(&self.db)
            .await?;
        Ok(sessions.iter().map(|s| s.pages_read).sum())
    }

    async fn commit_update(
        &self,
        commit: ProgressCommit,
    ) -> Result<user_stats::Model, EngineError> {
        let now = chrono::Utc::now().to_rfc3339();
        let txn = self.db.begin().await?;

        let stats_id = match commit.stats_id {
            Some(id) => {
                let result = user_stats::Entity::update_many()
                    .col_expr(
                        user_stats::Column::CurrentStreak,
                        Expr::value(commit.current_streak),
                    )
                    .col_expr(
                        user_stats::Column::LongestStreak,
                        Expr::value(commit.longest_streak),
                    )
                    .col_expr(
                        user_stats::Column::LastActivityDate,
                        Expr::value(Some(commit.last_activity_date.clone())),
                    )
                    .col_expr(
                        user_stats::Column::BooksCompleted,
                        Expr::value(commit.books_completed),
                    )
                    .col_expr(
                        user_stats::Column::TotalPagesRead,
                        Expr::value(commit.total_pages_read),
                    )
                    .col_expr(user_stats::Column::Xp, Expr::value(commit.xp))
                    .col_expr(user_stats::Column::Level, Expr::value(commit.level))
                    .col_expr(
                        user_stats::Column::TotalAchievements,
                        Expr::value(commit.total_achievements),
                    )
                    .col_expr(
                        user_stats::Column::Version,
                        Expr::value(commit.expected_version + 1),
                    )
                    .col_expr(user_stats::Column::UpdatedAt, Expr::value(now.clone()))
                    .filter(user_stats::Column::Id.eq(id))
                    .filter(user_stats::Column::Version.eq(commit.expected_version))
                    .exec(&txn)
                    .await?;

                if result.rows_affected == 0 {
                    // Row moved past the loaded version; caller retries
                    // with fresh state
                    return Err(EngineError::PersistenceConflict);
                }
                id
            }
            None => {
                let stats = user_stats::ActiveModel {
                    user_id: Set(commit.user_id),
                    league_id: Set(commit.league_id),
                    current_streak: Set(commit.current_streak),
                    longest_streak: Set(commit.longest_streak),
                    last_activity_date: Set(Some(commit.last_activity_date.clone())),
                    books_completed: Set(commit.books_completed),
                    total_pages_read: Set(commit.total_pages_read),
                    xp: Set(commit.xp),
                    level: Set(commit.level),
                    total_achievements: Set(commit.total_achievements),
                    version: Set(1),
                    created_at: Set(now.clone()),
                    updated_at: Set(now.clone()),
                    ..Default::default()
                };
                match stats.insert(&txn).await {
                    Ok(model) => model.id,
                    // The unique scope index is the backstop against two
                    // first-events racing; surface it as a conflict so the
                    // retry sees the inserted row
                    Err(e) if e.to_string().contains("UNIQUE") => {
                        return Err(EngineError::PersistenceConflict);
                    }
                    Err(e) => return Err(e.into()),
                }
            }
        };

        for achievement_type in &commit.new_achievements {
            let earned = achievement::ActiveModel {
                user_id: Set(commit.user_id),
                league_id: Set(commit.league_id),
                achievement_type: Set(achievement_type.clone()),
                earned_at: Set(commit.earned_at.clone()),
                notified: Set(false),
                ..Default::default()
            };
            earned.insert(&txn).await?;
        }

        upsert_session(&txn, &commit, &now).await?;

        let model = user_stats::Entity::find_by_id(stats_id)
            .one(&txn)
            .await?
            .ok_or_else(|| EngineError::Database("stats row vanished mid-commit".to_string()))?;

        txn.commit().await?;
        Ok(model)
    }

    async fn find_league(&self, league_id: i32) -> Result<Option<league::Model>, EngineError> {
        let league = league::Entity::find_by_id(league_id).one(&self.db).await?;
        Ok(league)
    }

    async fn is_member(&self, league_id: i32, user_id: i64) -> Result<bool, EngineError> {
        let member = league_member::Entity::find()
            .filter(league_member::Column::LeagueId.eq(league_id))
            .filter(league_member::Column::UserId.eq(user_id))
            .one(&self.db)
            .await?;
        Ok(member.is_some())
    }

    async fn league_standings(
        &self,
        league_id: i32,
    ) -> Result<Vec<MemberStanding>, EngineError> {
        let members = league_member::Entity::find()
            .filter(league_member::Column::LeagueId.eq(league_id))
            .all(&self.db)
            .await?;

        let stats = user_stats::Entity::find()
            .filter(user_stats::Column::LeagueId.eq(league_id))
            .all(&self.db)
            .await?;

        let by_user: HashMap<i64, &user_stats::Model> =
            stats.iter().map(|s| (s.user_id, s)).collect();

        Ok(members
            .into_iter()
            .map(|member| {
                let stats = by_user.get(&member.user_id);
                MemberStanding {
                    user_id: member.user_id,
                    pages_read: stats.map(|s| s.total_pages_read).unwrap_or(0),
                    books_completed: stats.map(|s| s.books_completed).unwrap_or(0),
                    joined_at: member.joined_at,
                }
            })
            .collect())
    }

    async fn achievements_for(
        &self,
        user_id: i64,
        league_id: Option<i32>,
    ) -> Result<Vec<achievement::Model>, EngineError> {
        let rows = achievement::Entity::find()
            .filter(achievement_scope(user_id, league_id))
            .order_by_desc(achievement::Column::EarnedAt)
            .all(&self.db)
            .await?;
        Ok(rows)
    }

    async fn mark_notified(
        &self,
        user_id: i64,
        league_id: Option<i32>,
        types: &[String],
    ) -> Result<(), EngineError> {
        if types.is_empty() {
            return Ok(());
        }
        achievement::Entity::update_many()
            .col_expr(achievement::Column::Notified, Expr::value(true))
            .filter(achievement_scope(user_id, league_id))
            .filter(achievement::Column::AchievementType.is_in(types.iter().map(String::as_str)))
            .exec(&self.db)
            .await?;
        Ok(())
    }

    async fn recent_messages(
        &self,
        user_id: i64,
        message_type: &str,
        limit: u64,
    ) -> Result<Vec<String>, EngineError> {
        let rows = motivation_log::Entity::find()
            .filter(motivation_log::Column::UserId.eq(user_id))
            .filter(motivation_log::Column::MessageType.eq(message_type))
            .order_by_desc(motivation_log::Column::Id)
            .limit(limit)
            .all(&self.db)
            .await?;
        Ok(rows.into_iter().map(|m| m.content).collect())
    }

    async fn log_message(
        &self,
        user_id: i64,
        message_type: &str,
        content: &str,
        sent_at: &str,
    ) -> Result<(), EngineError> {
        let entry = motivation_log::ActiveModel {
            user_id: Set(user_id),
            message_type: Set(message_type.to_string()),
            content: Set(content.to_string()),
            sent_at: Set(sent_at.to_string()),
            ..Default::default()
        };
        entry.insert(&self.db).await?;
        Ok(())
    }
}
