//! Session prep repository.
//!
//! Prep is the mentee's pre-session reflection. Exactly one prep exists per
//! session; the database unique constraint on `session_id` is the
//! serialization point for concurrent submissions, since check-then-insert
//! alone is not atomic.

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter, Set, SqlErr,
    TransactionTrait,
};
use uuid::Uuid;

use crate::entities::{
    mentoring_relationships, mentoring_sessions, sea_orm_active_enums::SessionStatus, session_preps,
};
use crate::scope::{RelationshipScope, ScopeUser};

/// Error types for prep operations.
#[derive(Debug, thiserror::Error)]
pub enum PrepError {
    /// Session does not resolve within the caller's tenant and scope.
    #[error("Session not found: {0}")]
    SessionNotFound(Uuid),

    /// No prep exists for the session yet.
    #[error("Prep not found for session: {0}")]
    NotFound(Uuid),

    /// Caller is neither the relationship's mentee nor an administrator.
    #[error("Only the relationship's mentee may submit prep")]
    NotMentee,

    /// The session is completed or cancelled; prep is frozen.
    #[error("Session is closed; prep can no longer be changed")]
    SessionClosed,

    /// A prep already exists for this session; use update instead.
    #[error("Prep already exists for session: {0}")]
    AlreadyExists(Uuid),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

/// Prep content fields.
#[derive(Debug, Clone, Default)]
pub struct PrepInput {
    /// Wins since the last session.
    pub wins: Option<String>,
    /// Current challenges.
    pub challenges: Option<String>,
    /// Topics the mentee wants to discuss.
    pub topics_to_discuss: Option<String>,
    /// Questions for the mentor.
    pub questions_for_mentor: Option<String>,
}

/// Repository for session preps.
#[derive(Debug, Clone)]
pub struct PrepRepository {
    db: DatabaseConnection,
}

impl PrepRepository {
    /// Creates a new prep repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Fetches the prep for a session, if any.
    ///
    /// # Errors
    ///
    /// Returns `SessionNotFound` if the session does not resolve within the
    /// tenant and scope, or a database error.
    pub async fn get(
        &self,
        tenant_id: Uuid,
        scope: &RelationshipScope,
        session_id: Uuid,
    ) -> Result<Option<session_preps::Model>, PrepError> {
        self.resolve_session(tenant_id, scope, session_id).await?;

        Ok(session_preps::Entity::find()
            .filter(session_preps::Column::SessionId.eq(session_id))
            .one(&self.db)
            .await?)
    }

    /// Creates the prep for a session, advancing a session that has not yet
    /// reached `ready` to `ready`.
    ///
    /// The caller must be the relationship's mentee or hold the
    /// administrative override. Creation is rejected once the session is
    /// completed or cancelled, and when a prep already exists.
    ///
    /// # Errors
    ///
    /// Returns the corresponding `PrepError` for each rejected condition, or
    /// a database error.
    pub async fn create(
        &self,
        tenant_id: Uuid,
        scope: &RelationshipScope,
        caller: &ScopeUser,
        session_id: Uuid,
        input: PrepInput,
    ) -> Result<session_preps::Model, PrepError> {
        let (session, relationship) =
            self.resolve_session(tenant_id, scope, session_id).await?;

        check_prep_writable(&session, &relationship, caller)?;

        let existing = session_preps::Entity::find()
            .filter(session_preps::Column::SessionId.eq(session_id))
            .one(&self.db)
            .await?;
        if existing.is_some() {
            return Err(PrepError::AlreadyExists(session_id));
        }

        let now = Utc::now().into();
        let txn = self.db.begin().await?;

        let model = session_preps::ActiveModel {
            id: Set(Uuid::new_v4()),
            session_id: Set(session_id),
            user_id: Set(caller.id),
            wins: Set(input.wins),
            challenges: Set(input.challenges),
            topics_to_discuss: Set(input.topics_to_discuss),
            questions_for_mentor: Set(input.questions_for_mentor),
            submitted_at: Set(now),
            created_at: Set(now),
            updated_at: Set(now),
        };

        let prep = match model.insert(&txn).await {
            Ok(prep) => prep,
            // The unique constraint decides the concurrent-create race.
            Err(e) if matches!(e.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) => {
                txn.rollback().await?;
                return Err(PrepError::AlreadyExists(session_id));
            }
            Err(e) => {
                txn.rollback().await?;
                return Err(e.into());
            }
        };

        // Prep submission makes the session ready to run. The status only
        // ever moves forward; a session already at or past `ready` keeps
        // its state.
        if session.status.rank() < SessionStatus::Ready.rank() {
            let mut session_active: mentoring_sessions::ActiveModel = session.into();
            session_active.status = Set(SessionStatus::Ready);
            session_active.updated_at = Set(now);
            session_active.update(&txn).await?;
        }

        txn.commit().await?;

        Ok(prep)
    }

    /// Updates the existing prep for a session, same guards as creation.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` when no prep exists yet, the guard errors from
    /// creation, or a database error.
    pub async fn update(
        &self,
        tenant_id: Uuid,
        scope: &RelationshipScope,
        caller: &ScopeUser,
        session_id: Uuid,
        input: PrepInput,
    ) -> Result<session_preps::Model, PrepError> {
        let (session, relationship) =
            self.resolve_session(tenant_id, scope, session_id).await?;

        check_prep_writable(&session, &relationship, caller)?;

        let prep = session_preps::Entity::find()
            .filter(session_preps::Column::SessionId.eq(session_id))
            .one(&self.db)
            .await?
            .ok_or(PrepError::NotFound(session_id))?;

        let mut active: session_preps::ActiveModel = prep.into();
        active.wins = Set(input.wins);
        active.challenges = Set(input.challenges);
        active.topics_to_discuss = Set(input.topics_to_discuss);
        active.questions_for_mentor = Set(input.questions_for_mentor);
        active.updated_at = Set(Utc::now().into());

        Ok(active.update(&self.db).await?)
    }

    /// Resolves a session and its relationship within the tenant and scope.
    /// Cross-tenant ids fail exactly like nonexistent ones.
    async fn resolve_session(
        &self,
        tenant_id: Uuid,
        scope: &RelationshipScope,
        session_id: Uuid,
    ) -> Result<(mentoring_sessions::Model, mentoring_relationships::Model), PrepError> {
        let session = mentoring_sessions::Entity::find_by_id(session_id)
            .one(&self.db)
            .await?
            .ok_or(PrepError::SessionNotFound(session_id))?;

        if !scope.permits(session.relationship_id) {
            return Err(PrepError::SessionNotFound(session_id));
        }

        let relationship = mentoring_relationships::Entity::find_by_id(session.relationship_id)
            .filter(mentoring_relationships::Column::TenantId.eq(tenant_id))
            .one(&self.db)
            .await?
            .ok_or(PrepError::SessionNotFound(session_id))?;

        Ok((session, relationship))
    }
}

/// Record-level prep guards: closed-session freeze, then mentee-or-admin.
fn check_prep_writable(
    session: &mentoring_sessions::Model,
    relationship: &mentoring_relationships::Model,
    caller: &ScopeUser,
) -> Result<(), PrepError> {
    if matches!(
        session.status,
        SessionStatus::Completed | SessionStatus::Cancelled
    ) {
        return Err(PrepError::SessionClosed);
    }

    if relationship.mentee_id != caller.id && !caller.has_admin_override() {
        return Err(PrepError::NotMentee);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use catalyst_shared::CapabilitySet;
    use chrono::NaiveDate;
    use crate::entities::sea_orm_active_enums::RelationshipStatus;

    fn relationship(mentee_id: Uuid) -> mentoring_relationships::Model {
        let now = Utc::now().into();
        mentoring_relationships::Model {
            id: Uuid::new_v4(),
            tenant_id: Uuid::new_v4(),
            mentor_id: Uuid::new_v4(),
            mentee_id,
            relationship_type: "standard".to_string(),
            status: RelationshipStatus::Active,
            started_at: now,
            ended_at: None,
            created_by: Uuid::new_v4(),
            created_at: now,
            updated_at: now,
        }
    }

    fn session(status: SessionStatus) -> mentoring_sessions::Model {
        let now = Utc::now().into();
        mentoring_sessions::Model {
            id: Uuid::new_v4(),
            relationship_id: Uuid::new_v4(),
            scheduled_date: NaiveDate::from_ymd_opt(2026, 9, 1).unwrap(),
            scheduled_time: None,
            duration_minutes: 60,
            status,
            created_by: Uuid::new_v4(),
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_mentee_may_write_prep() {
        let mentee = Uuid::new_v4();
        let caller = ScopeUser::new(mentee, 20, CapabilitySet::EMPTY);
        let result =
            check_prep_writable(&session(SessionStatus::Scheduled), &relationship(mentee), &caller);
        assert!(result.is_ok());
    }

    #[test]
    fn test_non_mentee_rejected() {
        let caller = ScopeUser::new(Uuid::new_v4(), 20, CapabilitySet::EMPTY);
        let result = check_prep_writable(
            &session(SessionStatus::Scheduled),
            &relationship(Uuid::new_v4()),
            &caller,
        );
        assert!(matches!(result, Err(PrepError::NotMentee)));
    }

    #[test]
    fn test_admin_override_allows_non_mentee() {
        let caller = ScopeUser::new(Uuid::new_v4(), 70, CapabilitySet::EMPTY);
        let result = check_prep_writable(
            &session(SessionStatus::Scheduled),
            &relationship(Uuid::new_v4()),
            &caller,
        );
        assert!(result.is_ok());
    }

    #[test]
    fn test_closed_session_rejected_for_everyone() {
        let mentee = Uuid::new_v4();
        let admin = ScopeUser::new(Uuid::new_v4(), 90, CapabilitySet::EMPTY);
        let mentee_caller = ScopeUser::new(mentee, 20, CapabilitySet::EMPTY);

        for status in [SessionStatus::Completed, SessionStatus::Cancelled] {
            let result =
                check_prep_writable(&session(status.clone()), &relationship(mentee), &admin);
            assert!(matches!(result, Err(PrepError::SessionClosed)));

            let result =
                check_prep_writable(&session(status), &relationship(mentee), &mentee_caller);
            assert!(matches!(result, Err(PrepError::SessionClosed)));
        }
    }
}
