//! `SeaORM` Entity for mentoring_sessions table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::sea_orm_active_enums::SessionStatus;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "mentoring_sessions")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub relationship_id: Uuid,
    pub scheduled_date: Date,
    pub scheduled_time: Option<Time>,
    pub duration_minutes: i32,
    pub status: SessionStatus,
    pub created_by: Uuid,
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
    #[sea_orm(has_one = "super::session_preps::Entity")]
    SessionPreps,
    #[sea_orm(has_many = "super::session_notes::Entity")]
    SessionNotes,
    #[sea_orm(has_many = "super::action_items::Entity")]
    ActionItems,
}

impl Related<super::mentoring_relationships::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::MentoringRelationships.def()
    }
}

impl Related<super::session_preps::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::SessionPreps.def()
    }
}

impl Related<super::session_notes::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::SessionNotes.def()
    }
}

impl Related<super::action_items::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ActionItems.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
