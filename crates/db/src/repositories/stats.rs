//! Mentoring statistics repository.
//!
//! Read-only rollups over the resolved scope. Stateless and side-effect
//! free; one computation per request.

use chrono::Utc;
use sea_orm::{ColumnTrait, DatabaseConnection, DbErr, EntityTrait, PaginatorTrait, QueryFilter};
use serde::Serialize;
use uuid::Uuid;

use crate::entities::{
    action_items, mentoring_relationships, mentoring_sessions,
    sea_orm_active_enums::{ActionItemStatus, RelationshipStatus, SessionStatus},
};
use crate::scope::RelationshipScope;

/// Rollup counts for the resolved scope.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MentoringStats {
    /// All relationships in scope.
    pub total_relationships: u64,
    /// Relationships in scope with status `active`.
    pub active_relationships: u64,
    /// Sessions in scope with an upcoming status.
    pub upcoming_sessions: u64,
    /// Sessions in scope with status `completed`.
    pub completed_sessions: u64,
    /// Action items in scope with an open status.
    pub open_action_items: u64,
    /// Open action items past their due timestamp.
    pub overdue_action_items: u64,
}

/// Repository for scope-restricted statistics.
#[derive(Debug, Clone)]
pub struct StatsRepository {
    db: DatabaseConnection,
}

impl StatsRepository {
    /// Creates a new stats repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Computes the rollup for a tenant and resolved scope.
    ///
    /// An empty restricted scope short-circuits to all zeros without
    /// querying any store.
    ///
    /// # Errors
    ///
    /// Returns an error if a database query fails.
    pub async fn compute(
        &self,
        tenant_id: Uuid,
        scope: &RelationshipScope,
    ) -> Result<MentoringStats, DbErr> {
        if scope.is_empty() {
            return Ok(MentoringStats::default());
        }

        let relationships = mentoring_relationships::Entity::find()
            .filter(mentoring_relationships::Column::TenantId.eq(tenant_id));
        let total_relationships = scope
            .apply(relationships.clone(), mentoring_relationships::Column::Id)
            .count(&self.db)
            .await?;
        let active_relationships = scope
            .apply(relationships, mentoring_relationships::Column::Id)
            .filter(mentoring_relationships::Column::Status.eq(RelationshipStatus::Active))
            .count(&self.db)
            .await?;

        let sessions = mentoring_sessions::Entity::find()
            .inner_join(mentoring_relationships::Entity)
            .filter(mentoring_relationships::Column::TenantId.eq(tenant_id));
        let upcoming_sessions = scope
            .apply(sessions.clone(), mentoring_sessions::Column::RelationshipId)
            .filter(mentoring_sessions::Column::Status.is_in([
                SessionStatus::Scheduled,
                SessionStatus::PrepInProgress,
                SessionStatus::Ready,
            ]))
            .count(&self.db)
            .await?;
        let completed_sessions = scope
            .apply(sessions, mentoring_sessions::Column::RelationshipId)
            .filter(mentoring_sessions::Column::Status.eq(SessionStatus::Completed))
            .count(&self.db)
            .await?;

        let open_items = action_items::Entity::find()
            .inner_join(mentoring_relationships::Entity)
            .filter(mentoring_relationships::Column::TenantId.eq(tenant_id))
            .filter(action_items::Column::Status.is_in([
                ActionItemStatus::Pending,
                ActionItemStatus::InProgress,
            ]));
        let open_action_items = scope
            .apply(open_items.clone(), action_items::Column::RelationshipId)
            .count(&self.db)
            .await?;
        let overdue_action_items = scope
            .apply(open_items, action_items::Column::RelationshipId)
            .filter(action_items::Column::DueDate.lt(Utc::now()))
            .count(&self.db)
            .await?;

        Ok(MentoringStats {
            total_relationships,
            active_relationships,
            upcoming_sessions,
            completed_sessions,
            open_action_items,
            overdue_action_items,
        })
    }
}
