//! `SeaORM` Entity for action_items table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::sea_orm_active_enums::{ActionItemPriority, ActionItemStatus};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "action_items")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub relationship_id: Uuid,
    pub session_id: Option<Uuid>,
    pub owner_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub status: ActionItemStatus,
    pub priority: ActionItemPriority,
    pub due_date: Option<DateTimeWithTimeZone>,
    pub completed_at: Option<DateTimeWithTimeZone>,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::mentoring_relationships::Entity",
        from = "Column::RelationshipId",
        to = "super::mentoring_relationships::Column::Id"
    )]
    MentoringRelationships,
    #[sea_orm(
        belongs_to = "super::mentoring_sessions::Entity",
        from = "Column::SessionId",
        to = "super::mentoring_sessions::Column::Id"
    )]
    MentoringSessions,
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::OwnerId",
        to = "super::users::Column::Id"
    )]
    Users,
}

impl Related<super::mentoring_relationships::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::MentoringRelationships.def()
    }
}

impl Related<super::mentoring_sessions::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::MentoringSessions.def()
    }
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Users.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
