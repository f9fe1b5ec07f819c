use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "leagues")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub name: String,
    pub goal_pages: i64,
    pub goal_books: i32,
    pub track: String, // 'pages' or 'books'
    pub status: String, // 'active', 'completed', 'cancelled'
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::league_member::Entity")]
    LeagueMember,
}

impl Related<super::league_member::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::LeagueMember.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
