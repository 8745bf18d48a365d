//! Mentoring session repository.

use chrono::{NaiveDate, NaiveTime, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter, QueryOrder,
    Set,
};
use uuid::Uuid;

use crate::entities::{
    mentoring_relationships, mentoring_sessions, sea_orm_active_enums::SessionStatus,
};
use crate::scope::RelationshipScope;

/// Error types for session operations.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// Session does not resolve within the caller's tenant and scope.
    #[error("Session not found: {0}")]
    NotFound(Uuid),

    /// Parent relationship does not resolve within the tenant and scope.
    #[error("Relationship not found: {0}")]
    RelationshipNotFound(Uuid),

    /// Status may only move forward in the normal flow; terminal states are
    /// immutable.
    #[error("Invalid session status transition: {from:?} -> {to:?}")]
    InvalidTransition {
        /// Current status.
        from: SessionStatus,
        /// Requested status.
        to: SessionStatus,
    },

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

/// Filters for listing sessions.
#[derive(Debug, Clone, Default)]
pub struct SessionFilter {
    /// Restrict to one relationship. ANDed with the resolved scope, so a
    /// caller cannot widen its visibility by supplying a foreign id.
    pub relationship_id: Option<Uuid>,
    /// Restrict to one status.
    pub status: Option<SessionStatus>,
}

/// Input for creating a session.
#[derive(Debug, Clone)]
pub struct CreateSessionInput {
    /// Parent relationship id.
    pub relationship_id: Uuid,
    /// Scheduled date.
    pub scheduled_date: NaiveDate,
    /// Scheduled time, if fixed.
    pub scheduled_time: Option<NaiveTime>,
    /// Planned duration in minutes.
    pub duration_minutes: i32,
    /// Creating user id.
    pub created_by: Uuid,
}

/// Input for updating a session.
#[derive(Debug, Clone, Default)]
pub struct UpdateSessionInput {
    /// New scheduled date.
    pub scheduled_date: Option<NaiveDate>,
    /// New scheduled time.
    pub scheduled_time: Option<Option<NaiveTime>>,
    /// New duration in minutes.
    pub duration_minutes: Option<i32>,
    /// New status; validated against the forward-only flow.
    pub status: Option<SessionStatus>,
}

/// Repository for mentoring sessions.
#[derive(Debug, Clone)]
pub struct SessionRepository {
    db: DatabaseConnection,
}

impl SessionRepository {
    /// Creates a new session repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Lists sessions visible under the scope, newest scheduled first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list(
        &self,
        tenant_id: Uuid,
        scope: &RelationshipScope,
        filter: SessionFilter,
    ) -> Result<Vec<mentoring_sessions::Model>, DbErr> {
        if scope.is_empty() {
            return Ok(Vec::new());
        }

        let mut query = mentoring_sessions::Entity::find()
            .inner_join(mentoring_relationships::Entity)
            .filter(mentoring_relationships::Column::TenantId.eq(tenant_id));

        query = scope.apply(query, mentoring_sessions::Column::RelationshipId);

        if let Some(relationship_id) = filter.relationship_id {
            query = query.filter(mentoring_sessions::Column::RelationshipId.eq(relationship_id));
        }
        if let Some(status) = filter.status {
            query = query.filter(mentoring_sessions::Column::Status.eq(status));
        }

        query
            .order_by_desc(mentoring_sessions::Column::ScheduledDate)
            .all(&self.db)
            .await
    }

    /// Finds a session and its parent relationship within the tenant and
    /// scope. Cross-tenant and out-of-scope ids resolve to `None`.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find_scoped(
        &self,
        tenant_id: Uuid,
        scope: &RelationshipScope,
        session_id: Uuid,
    ) -> Result<Option<(mentoring_sessions::Model, mentoring_relationships::Model)>, DbErr> {
        let Some(session) = mentoring_sessions::Entity::find_by_id(session_id)
            .one(&self.db)
            .await?
        else {
            return Ok(None);
        };

        if !scope.permits(session.relationship_id) {
            return Ok(None);
        }

        let relationship = mentoring_relationships::Entity::find_by_id(session.relationship_id)
            .filter(mentoring_relationships::Column::TenantId.eq(tenant_id))
            .one(&self.db)
            .await?;

        Ok(relationship.map(|r| (session, r)))
    }

    /// Creates a session under a relationship the caller holds scope on.
    ///
    /// # Errors
    ///
    /// Returns `RelationshipNotFound` if the relationship does not resolve
    /// within the tenant and scope, or a database error.
    pub async fn create(
        &self,
        tenant_id: Uuid,
        scope: &RelationshipScope,
        input: CreateSessionInput,
    ) -> Result<mentoring_sessions::Model, SessionError> {
        if !scope.permits(input.relationship_id) {
            return Err(SessionError::RelationshipNotFound(input.relationship_id));
        }

        let relationship = mentoring_relationships::Entity::find_by_id(input.relationship_id)
            .filter(mentoring_relationships::Column::TenantId.eq(tenant_id))
            .one(&self.db)
            .await?
            .ok_or(SessionError::RelationshipNotFound(input.relationship_id))?;

        let now = Utc::now().into();
        let model = mentoring_sessions::ActiveModel {
            id: Set(Uuid::new_v4()),
            relationship_id: Set(relationship.id),
            scheduled_date: Set(input.scheduled_date),
            scheduled_time: Set(input.scheduled_time),
            duration_minutes: Set(input.duration_minutes),
            status: Set(SessionStatus::Scheduled),
            created_by: Set(input.created_by),
            created_at: Set(now),
            updated_at: Set(now),
        };

        Ok(model.insert(&self.db).await?)
    }

    /// Updates a session. Status changes must move forward in the normal
    /// flow; cancellation and no-show are reachable from any non-terminal
    /// state; terminal states are immutable.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the session does not resolve within the tenant
    /// and scope, `InvalidTransition` for a backward or out-of-terminal
    /// status change, or a database error.
    pub async fn update(
        &self,
        tenant_id: Uuid,
        scope: &RelationshipScope,
        session_id: Uuid,
        input: UpdateSessionInput,
    ) -> Result<mentoring_sessions::Model, SessionError> {
        let (session, _) = self
            .find_scoped(tenant_id, scope, session_id)
            .await?
            .ok_or(SessionError::NotFound(session_id))?;

        if let Some(to) = &input.status {
            validate_transition(&session.status, to)?;
        }

        let mut active: mentoring_sessions::ActiveModel = session.into();
        if let Some(date) = input.scheduled_date {
            active.scheduled_date = Set(date);
        }
        if let Some(time) = input.scheduled_time {
            active.scheduled_time = Set(time);
        }
        if let Some(duration) = input.duration_minutes {
            active.duration_minutes = Set(duration);
        }
        if let Some(status) = input.status {
            active.status = Set(status);
        }
        active.updated_at = Set(Utc::now().into());

        Ok(active.update(&self.db).await?)
    }

    /// Cancels a session from any non-terminal state.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the session does not resolve within the tenant
    /// and scope, `InvalidTransition` when the session is already terminal,
    /// or a database error.
    pub async fn cancel(
        &self,
        tenant_id: Uuid,
        scope: &RelationshipScope,
        session_id: Uuid,
    ) -> Result<mentoring_sessions::Model, SessionError> {
        self.update(
            tenant_id,
            scope,
            session_id,
            UpdateSessionInput {
                status: Some(SessionStatus::Cancelled),
                ..UpdateSessionInput::default()
            },
        )
        .await
    }
}

/// Validates a status transition against the forward-only flow.
fn validate_transition(from: &SessionStatus, to: &SessionStatus) -> Result<(), SessionError> {
    if from.is_terminal() {
        return Err(SessionError::InvalidTransition {
            from: from.clone(),
            to: to.clone(),
        });
    }

    // Cancellation and no-show short-circuit the flow from any live state.
    if matches!(to, SessionStatus::Cancelled | SessionStatus::NoShow) {
        return Ok(());
    }

    if to.rank() < from.rank() {
        return Err(SessionError::InvalidTransition {
            from: from.clone(),
            to: to.clone(),
        });
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_forward_transitions_allowed() {
        assert!(validate_transition(&SessionStatus::Scheduled, &SessionStatus::Ready).is_ok());
        assert!(
            validate_transition(&SessionStatus::Ready, &SessionStatus::InProgress).is_ok()
        );
        assert!(
            validate_transition(&SessionStatus::InProgress, &SessionStatus::Completed).is_ok()
        );
    }

    #[test]
    fn test_backward_transitions_rejected() {
        assert!(matches!(
            validate_transition(&SessionStatus::Ready, &SessionStatus::Scheduled),
            Err(SessionError::InvalidTransition { .. })
        ));
        assert!(matches!(
            validate_transition(&SessionStatus::InProgress, &SessionStatus::PrepInProgress),
            Err(SessionError::InvalidTransition { .. })
        ));
    }

    #[test]
    fn test_cancellation_from_any_live_state() {
        for from in [
            SessionStatus::Scheduled,
            SessionStatus::PrepInProgress,
            SessionStatus::Ready,
            SessionStatus::InProgress,
        ] {
            assert!(validate_transition(&from, &SessionStatus::Cancelled).is_ok());
            assert!(validate_transition(&from, &SessionStatus::NoShow).is_ok());
        }
    }

    #[test]
    fn test_terminal_states_immutable() {
        for from in [
            SessionStatus::Completed,
            SessionStatus::Cancelled,
            SessionStatus::NoShow,
        ] {
            assert!(matches!(
                validate_transition(&from, &SessionStatus::Scheduled),
                Err(SessionError::InvalidTransition { .. })
            ));
            assert!(matches!(
                validate_transition(&from, &SessionStatus::Cancelled),
                Err(SessionError::InvalidTransition { .. })
            ));
        }
    }
}
