use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "user_stats")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub user_id: i64,
    /// NULL = individual scope, otherwise the league this row belongs to
    pub league_id: Option<i32>,
    pub current_streak: i32,
    pub longest_streak: i32,
    pub last_activity_date: Option<String>, // 'YYYY-MM-DD'
    pub books_completed: i32,
    pub total_pages_read: i64,
    pub xp: i64,
    pub level: i32,
    pub total_achievements: i32,
    /// Optimistic-concurrency counter, bumped on every committed update
    pub version: i64,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
