use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// One row per (user, scope, calendar day). Same-day updates accumulate
/// pages into the existing row instead of inserting a second one.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "reading_sessions")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub user_id: i64,
    pub league_id: Option<i32>,
    pub session_date: String, // 'YYYY-MM-DD'
    pub pages_read: i64,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
