//! `SeaORM` active enums mirroring the PostgreSQL enum types.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Role a user holds within a program enrollment.
#[derive(Debug, Clone, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "enrollment_role")]
#[serde(rename_all = "snake_case")]
pub enum EnrollmentRole {
    /// Program participant.
    #[sea_orm(string_value = "learner")]
    Learner,
    /// Mentors learners within the program.
    #[sea_orm(string_value = "mentor")]
    Mentor,
    /// Oversees the program's mentors.
    #[sea_orm(string_value = "facilitator")]
    Facilitator,
}

/// Lifecycle status of a program enrollment.
#[derive(Debug, Clone, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "enrollment_status")]
#[serde(rename_all = "snake_case")]
pub enum EnrollmentStatus {
    /// Counted for scoping.
    #[sea_orm(string_value = "active")]
    Active,
    /// Finished the program.
    #[sea_orm(string_value = "completed")]
    Completed,
    /// Left the program early.
    #[sea_orm(string_value = "withdrawn")]
    Withdrawn,
}

/// Lifecycle status of a program.
#[derive(Debug, Clone, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "program_status")]
#[serde(rename_all = "snake_case")]
pub enum ProgramStatus {
    /// Open for enrollments.
    #[sea_orm(string_value = "active")]
    Active,
    /// Closed; retained for history.
    #[sea_orm(string_value = "archived")]
    Archived,
}

/// Lifecycle status of a mentoring relationship.
///
/// Relationships are never hard-deleted; ending one sets the status to
/// `ended` and stamps `ended_at`.
#[derive(Debug, Clone, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "relationship_status")]
#[serde(rename_all = "snake_case")]
pub enum RelationshipStatus {
    /// Standing pairing.
    #[sea_orm(string_value = "active")]
    Active,
    /// Soft-terminated.
    #[sea_orm(string_value = "ended")]
    Ended,
}

/// Status of a mentoring session.
#[derive(Debug, Clone, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "session_status")]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    /// Booked, prep not started.
    #[sea_orm(string_value = "scheduled")]
    Scheduled,
    /// Mentee has started but not submitted prep.
    #[sea_orm(string_value = "prep_in_progress")]
    PrepInProgress,
    /// Prep submitted; session ready to run.
    #[sea_orm(string_value = "ready")]
    Ready,
    /// Currently running.
    #[sea_orm(string_value = "in_progress")]
    InProgress,
    /// Finished.
    #[sea_orm(string_value = "completed")]
    Completed,
    /// Cancelled before completion.
    #[sea_orm(string_value = "cancelled")]
    Cancelled,
    /// A participant did not show up.
    #[sea_orm(string_value = "no_show")]
    NoShow,
}

impl SessionStatus {
    /// Position in the normal forward flow. Terminal states share the top
    /// rank so no transition can leave them.
    #[must_use]
    pub const fn rank(&self) -> u8 {
        match self {
            Self::Scheduled => 0,
            Self::PrepInProgress => 1,
            Self::Ready => 2,
            Self::InProgress => 3,
            Self::Completed | Self::Cancelled | Self::NoShow => 4,
        }
    }

    /// Returns true for states no transition may leave.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Cancelled | Self::NoShow)
    }

    /// Returns true if the session still counts as upcoming.
    #[must_use]
    pub const fn is_upcoming(&self) -> bool {
        matches!(self, Self::Scheduled | Self::PrepInProgress | Self::Ready)
    }
}

/// Visibility of a session note.
#[derive(Debug, Clone, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "note_visibility")]
#[serde(rename_all = "snake_case")]
pub enum NoteVisibility {
    /// Visible to the author only.
    #[sea_orm(string_value = "private")]
    Private,
    /// Visible to everyone with scope on the relationship.
    #[sea_orm(string_value = "shared")]
    Shared,
}

/// Status of an action item.
#[derive(Debug, Clone, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "action_item_status")]
#[serde(rename_all = "snake_case")]
pub enum ActionItemStatus {
    /// Not started.
    #[sea_orm(string_value = "pending")]
    Pending,
    /// Being worked on.
    #[sea_orm(string_value = "in_progress")]
    InProgress,
    /// Done; `completed_at` is stamped on transition.
    #[sea_orm(string_value = "completed")]
    Completed,
    /// Abandoned.
    #[sea_orm(string_value = "cancelled")]
    Cancelled,
}

impl ActionItemStatus {
    /// Returns true while the item still needs work.
    #[must_use]
    pub const fn is_open(&self) -> bool {
        matches!(self, Self::Pending | Self::InProgress)
    }
}

/// Priority of an action item.
#[derive(Debug, Clone, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "action_item_priority")]
#[serde(rename_all = "snake_case")]
pub enum ActionItemPriority {
    /// Low priority.
    #[sea_orm(string_value = "low")]
    Low,
    /// Default priority.
    #[sea_orm(string_value = "medium")]
    Medium,
    /// High priority.
    #[sea_orm(string_value = "high")]
    High,
}
