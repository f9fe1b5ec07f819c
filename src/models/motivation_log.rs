use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Audit log of motivational messages handed to the caller. Read back only
/// to avoid repeating the most recent messages of the same type.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "motivation_log")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub user_id: i64,
    pub message_type: String,
    pub content: String,
    pub sent_at: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
