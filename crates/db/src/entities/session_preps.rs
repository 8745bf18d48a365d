//! `SeaORM` Entity for session_preps table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "session_preps")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    /// One prep per session, enforced by a unique constraint.
    #[sea_orm(unique)]
    pub session_id: Uuid,
    pub user_id: Uuid,
    pub wins: Option<String>,
    pub challenges: Option<String>,
    pub topics_to_discuss: Option<String>,
    pub questions_for_mentor: Option<String>,
    pub submitted_at: DateTimeWithTimeZone,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::mentoring_sessions::Entity",
        from = "Column::SessionId",
        to = "super::mentoring_sessions::Column::Id"
    )]
    MentoringSessions,
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::UserId",
        to = "super::users::Column::Id"
    )]
    Users,
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
