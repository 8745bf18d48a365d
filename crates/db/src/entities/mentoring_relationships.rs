//! `SeaORM` Entity for mentoring_relationships table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::sea_orm_active_enums::RelationshipStatus;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "mentoring_relationships")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    /// Fixed at creation; relationships never move between tenants.
    pub tenant_id: Uuid,
    pub mentor_id: Uuid,
    pub mentee_id: Uuid,
    pub relationship_type: String,
    pub status: RelationshipStatus,
    pub started_at: DateTimeWithTimeZone,
    pub ended_at: Option<DateTimeWithTimeZone>,
    pub created_by: Uuid,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::tenants::Entity",
        from = "Column::TenantId",
        to = "super::tenants::Column::Id"
    )]
    Tenants,
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::MentorId",
        to = "super::users::Column::Id"
    )]
    Mentor,
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::MenteeId",
        to = "super::users::Column::Id"
    )]
    Mentee,
    #[sea_orm(has_many = "super::mentoring_sessions::Entity")]
    MentoringSessions,
    #[sea_orm(has_many = "super::action_items::Entity")]
    ActionItems,
}

impl Related<super::tenants::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Tenants.def()
    }
}

impl Related<super::mentoring_sessions::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::MentoringSessions.def()
    }
}

impl Related<super::action_items::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ActionItems.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
