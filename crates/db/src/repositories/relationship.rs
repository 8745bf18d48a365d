//! Mentoring relationship repository and the scope resolver.

use std::collections::HashSet;

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, DbErr, EntityTrait, QueryFilter,
    QueryOrder, QuerySelect, Set,
};
use tracing::debug;
use uuid::Uuid;

use crate::entities::{
    enrollments, mentoring_relationships,
    sea_orm_active_enums::{EnrollmentRole, EnrollmentStatus, RelationshipStatus},
    users,
};
use crate::scope::{RelationshipScope, ScopeTier, ScopeUser, scope_tier};

/// Error types for relationship operations.
#[derive(Debug, thiserror::Error)]
pub enum RelationshipError {
    /// Relationship does not resolve within the caller's tenant and scope.
    #[error("Relationship not found: {0}")]
    NotFound(Uuid),

    /// The designated mentor is not an active user of the tenant.
    #[error("Mentor is not an active user of this tenant: {0}")]
    MentorNotInTenant(Uuid),

    /// The designated mentee is not an active user of the tenant.
    #[error("Mentee is not an active user of this tenant: {0}")]
    MenteeNotInTenant(Uuid),

    /// Mentor and mentee must be distinct users.
    #[error("Mentor and mentee must be distinct users")]
    SelfMentoring,

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

/// Input for creating a relationship.
#[derive(Debug, Clone)]
pub struct CreateRelationshipInput {
    /// Tenant the relationship belongs to, fixed at creation.
    pub tenant_id: Uuid,
    /// Mentor user id.
    pub mentor_id: Uuid,
    /// Mentee user id.
    pub mentee_id: Uuid,
    /// Free-form relationship type label.
    pub relationship_type: String,
    /// Creating user id.
    pub created_by: Uuid,
}

/// Repository for mentoring relationships.
#[derive(Debug, Clone)]
pub struct RelationshipRepository {
    db: DatabaseConnection,
}

impl RelationshipRepository {
    /// Creates a new relationship repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Resolves the set of relationship ids the caller may act upon within
    /// the tenant.
    ///
    /// - Without the view-all capability the scope is direct participation
    ///   only (caller is mentor or mentee).
    /// - View-all at the facilitator tier derives the scope through the
    ///   caller's active facilitator enrollments: the relationships whose
    ///   mentor holds an active mentor enrollment in one of those programs.
    ///   No programs or no mentors resolves to the empty scope (fail
    ///   closed). The facilitator's own personal relationships are not
    ///   unioned in by this path.
    /// - Any other view-all holder is a tenant admin and sees the whole
    ///   tenant.
    ///
    /// # Errors
    ///
    /// Returns an error if a database query fails.
    pub async fn resolve_scope(
        &self,
        user: &ScopeUser,
        tenant_id: Uuid,
    ) -> Result<RelationshipScope, DbErr> {
        let tier = scope_tier(user);
        let scope = match tier {
            ScopeTier::TenantAdmin => RelationshipScope::All,
            ScopeTier::Participant => self.participant_scope(user.id, tenant_id).await?,
            ScopeTier::Facilitator => self.facilitator_scope(user.id, tenant_id).await?,
        };

        debug!(
            user_id = %user.id,
            tenant_id = %tenant_id,
            tier = ?tier,
            restricted = !matches!(scope, RelationshipScope::All),
            "Resolved relationship scope"
        );

        Ok(scope)
    }

    /// Relationships where the user is mentor or mentee, within the tenant.
    async fn participant_scope(
        &self,
        user_id: Uuid,
        tenant_id: Uuid,
    ) -> Result<RelationshipScope, DbErr> {
        let ids: Vec<Uuid> = mentoring_relationships::Entity::find()
            .filter(mentoring_relationships::Column::TenantId.eq(tenant_id))
            .filter(
                Condition::any()
                    .add(mentoring_relationships::Column::MentorId.eq(user_id))
                    .add(mentoring_relationships::Column::MenteeId.eq(user_id)),
            )
            .select_only()
            .column(mentoring_relationships::Column::Id)
            .into_tuple()
            .all(&self.db)
            .await?;

        Ok(RelationshipScope::Ids(ids))
    }

    /// Derived facilitator scope via program -> mentor enrollments.
    async fn facilitator_scope(
        &self,
        user_id: Uuid,
        tenant_id: Uuid,
    ) -> Result<RelationshipScope, DbErr> {
        let program_ids: Vec<Uuid> = enrollments::Entity::find()
            .filter(enrollments::Column::TenantId.eq(tenant_id))
            .filter(enrollments::Column::UserId.eq(user_id))
            .filter(enrollments::Column::Role.eq(EnrollmentRole::Facilitator))
            .filter(enrollments::Column::Status.eq(EnrollmentStatus::Active))
            .select_only()
            .column(enrollments::Column::ProgramId)
            .into_tuple()
            .all(&self.db)
            .await?;

        if program_ids.is_empty() {
            return Ok(RelationshipScope::empty());
        }

        let mentor_ids: Vec<Uuid> = enrollments::Entity::find()
            .filter(enrollments::Column::ProgramId.is_in(program_ids))
            .filter(enrollments::Column::Role.eq(EnrollmentRole::Mentor))
            .filter(enrollments::Column::Status.eq(EnrollmentStatus::Active))
            .select_only()
            .column(enrollments::Column::UserId)
            .into_tuple()
            .all(&self.db)
            .await?;

        let mentor_ids: HashSet<Uuid> = mentor_ids.into_iter().collect();
        if mentor_ids.is_empty() {
            return Ok(RelationshipScope::empty());
        }

        let ids: Vec<Uuid> = mentoring_relationships::Entity::find()
            .filter(mentoring_relationships::Column::TenantId.eq(tenant_id))
            .filter(mentoring_relationships::Column::MentorId.is_in(mentor_ids))
            .select_only()
            .column(mentoring_relationships::Column::Id)
            .into_tuple()
            .all(&self.db)
            .await?;

        Ok(RelationshipScope::Ids(ids))
    }

    /// Lists relationships in the tenant visible under the scope, newest
    /// first by start timestamp.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list(
        &self,
        tenant_id: Uuid,
        scope: &RelationshipScope,
    ) -> Result<Vec<mentoring_relationships::Model>, DbErr> {
        if scope.is_empty() {
            return Ok(Vec::new());
        }

        let query = mentoring_relationships::Entity::find()
            .filter(mentoring_relationships::Column::TenantId.eq(tenant_id));

        scope
            .apply(query, mentoring_relationships::Column::Id)
            .order_by_desc(mentoring_relationships::Column::StartedAt)
            .all(&self.db)
            .await
    }

    /// Finds a single relationship by id within the tenant and scope.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find_scoped(
        &self,
        tenant_id: Uuid,
        scope: &RelationshipScope,
        id: Uuid,
    ) -> Result<Option<mentoring_relationships::Model>, DbErr> {
        if !scope.permits(id) {
            return Ok(None);
        }

        mentoring_relationships::Entity::find_by_id(id)
            .filter(mentoring_relationships::Column::TenantId.eq(tenant_id))
            .one(&self.db)
            .await
    }

    /// Creates a relationship after validating both participants are
    /// distinct active users of the tenant.
    ///
    /// # Errors
    ///
    /// Returns a validation error when either participant fails the tenant
    /// check, or a database error.
    pub async fn create(
        &self,
        input: CreateRelationshipInput,
    ) -> Result<mentoring_relationships::Model, RelationshipError> {
        if input.mentor_id == input.mentee_id {
            return Err(RelationshipError::SelfMentoring);
        }

        self.require_active_user(input.tenant_id, input.mentor_id)
            .await
            .map_err(|e| match e {
                RelationshipError::NotFound(id) => RelationshipError::MentorNotInTenant(id),
                other => other,
            })?;
        self.require_active_user(input.tenant_id, input.mentee_id)
            .await
            .map_err(|e| match e {
                RelationshipError::NotFound(id) => RelationshipError::MenteeNotInTenant(id),
                other => other,
            })?;

        let now = Utc::now().into();
        let model = mentoring_relationships::ActiveModel {
            id: Set(Uuid::new_v4()),
            tenant_id: Set(input.tenant_id),
            mentor_id: Set(input.mentor_id),
            mentee_id: Set(input.mentee_id),
            relationship_type: Set(input.relationship_type),
            status: Set(RelationshipStatus::Active),
            started_at: Set(now),
            ended_at: Set(None),
            created_by: Set(input.created_by),
            created_at: Set(now),
            updated_at: Set(now),
        };

        Ok(model.insert(&self.db).await?)
    }

    /// Soft-terminates a relationship: sets status to `ended` and stamps
    /// `ended_at`. The row is retained as audit trail.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the relationship does not resolve within the
    /// tenant and scope, or a database error.
    pub async fn end(
        &self,
        tenant_id: Uuid,
        scope: &RelationshipScope,
        id: Uuid,
    ) -> Result<mentoring_relationships::Model, RelationshipError> {
        let relationship = self
            .find_scoped(tenant_id, scope, id)
            .await?
            .ok_or(RelationshipError::NotFound(id))?;

        let now = Utc::now().into();
        let mut active: mentoring_relationships::ActiveModel = relationship.into();
        active.status = Set(RelationshipStatus::Ended);
        active.ended_at = Set(Some(now));
        active.updated_at = Set(now);

        Ok(active.update(&self.db).await?)
    }

    async fn require_active_user(
        &self,
        tenant_id: Uuid,
        user_id: Uuid,
    ) -> Result<(), RelationshipError> {
        let found = users::Entity::find_by_id(user_id)
            .filter(users::Column::TenantId.eq(tenant_id))
            .filter(users::Column::IsActive.eq(true))
            .one(&self.db)
            .await?;

        match found {
            Some(_) => Ok(()),
            None => Err(RelationshipError::NotFound(user_id)),
        }
    }
}
