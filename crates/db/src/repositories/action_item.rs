//! Action item repository.

use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter, QueryOrder,
    Set,
};
use uuid::Uuid;

use crate::entities::{
    action_items, mentoring_relationships, mentoring_sessions,
    sea_orm_active_enums::{ActionItemPriority, ActionItemStatus},
};
use crate::scope::RelationshipScope;

/// Error types for action item operations.
#[derive(Debug, thiserror::Error)]
pub enum ActionItemError {
    /// Action item does not resolve within the caller's tenant and scope.
    #[error("Action item not found: {0}")]
    NotFound(Uuid),

    /// Parent relationship does not resolve within the tenant and scope.
    #[error("Relationship not found: {0}")]
    RelationshipNotFound(Uuid),

    /// Linked session does not belong to the relationship.
    #[error("Session not found under relationship: {0}")]
    SessionNotFound(Uuid),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

/// Input for creating an action item.
#[derive(Debug, Clone)]
pub struct CreateActionItemInput {
    /// Parent relationship id.
    pub relationship_id: Uuid,
    /// Optional originating session id.
    pub session_id: Option<Uuid>,
    /// User responsible for the item.
    pub owner_id: Uuid,
    /// Short title.
    pub title: String,
    /// Longer description.
    pub description: Option<String>,
    /// Priority; defaults to medium.
    pub priority: Option<ActionItemPriority>,
    /// Due timestamp.
    pub due_date: Option<DateTime<Utc>>,
}

/// Input for updating an action item.
#[derive(Debug, Clone, Default)]
pub struct UpdateActionItemInput {
    /// New title.
    pub title: Option<String>,
    /// New description.
    pub description: Option<Option<String>>,
    /// New status.
    pub status: Option<ActionItemStatus>,
    /// New priority.
    pub priority: Option<ActionItemPriority>,
    /// New due timestamp.
    pub due_date: Option<Option<DateTime<Utc>>>,
    /// Explicit completion timestamp. When the status moves to `completed`
    /// and this is absent, the repository stamps the current time.
    pub completed_at: Option<DateTime<Utc>>,
}

/// Repository for action items.
#[derive(Debug, Clone)]
pub struct ActionItemRepository {
    db: DatabaseConnection,
}

impl ActionItemRepository {
    /// Creates a new action item repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Lists action items visible under the scope, optionally filtered by
    /// status, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list(
        &self,
        tenant_id: Uuid,
        scope: &RelationshipScope,
        status: Option<ActionItemStatus>,
    ) -> Result<Vec<action_items::Model>, DbErr> {
        if scope.is_empty() {
            return Ok(Vec::new());
        }

        let mut query = action_items::Entity::find()
            .inner_join(mentoring_relationships::Entity)
            .filter(mentoring_relationships::Column::TenantId.eq(tenant_id));

        query = scope.apply(query, action_items::Column::RelationshipId);

        if let Some(status) = status {
            query = query.filter(action_items::Column::Status.eq(status));
        }

        query
            .order_by_desc(action_items::Column::CreatedAt)
            .all(&self.db)
            .await
    }

    /// Creates an action item under a relationship the caller holds scope
    /// on. A linked session must belong to the same relationship.
    ///
    /// # Errors
    ///
    /// Returns `RelationshipNotFound`/`SessionNotFound` for failed
    /// resolution, or a database error.
    pub async fn create(
        &self,
        tenant_id: Uuid,
        scope: &RelationshipScope,
        input: CreateActionItemInput,
    ) -> Result<action_items::Model, ActionItemError> {
        if !scope.permits(input.relationship_id) {
            return Err(ActionItemError::RelationshipNotFound(input.relationship_id));
        }

        let relationship = mentoring_relationships::Entity::find_by_id(input.relationship_id)
            .filter(mentoring_relationships::Column::TenantId.eq(tenant_id))
            .one(&self.db)
            .await?
            .ok_or(ActionItemError::RelationshipNotFound(input.relationship_id))?;

        if let Some(session_id) = input.session_id {
            mentoring_sessions::Entity::find_by_id(session_id)
                .filter(mentoring_sessions::Column::RelationshipId.eq(relationship.id))
                .one(&self.db)
                .await?
                .ok_or(ActionItemError::SessionNotFound(session_id))?;
        }

        let now = Utc::now().into();
        let model = action_items::ActiveModel {
            id: Set(Uuid::new_v4()),
            relationship_id: Set(relationship.id),
            session_id: Set(input.session_id),
            owner_id: Set(input.owner_id),
            title: Set(input.title),
            description: Set(input.description),
            status: Set(ActionItemStatus::Pending),
            priority: Set(input.priority.unwrap_or(ActionItemPriority::Medium)),
            due_date: Set(input.due_date.map(Into::into)),
            completed_at: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
        };

        Ok(model.insert(&self.db).await?)
    }

    /// Updates an action item. A transition to `completed` without an
    /// explicit completion timestamp stamps the current time.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the item does not resolve within the tenant
    /// and scope, or a database error.
    pub async fn update(
        &self,
        tenant_id: Uuid,
        scope: &RelationshipScope,
        id: Uuid,
        input: UpdateActionItemInput,
    ) -> Result<action_items::Model, ActionItemError> {
        let item = action_items::Entity::find_by_id(id)
            .inner_join(mentoring_relationships::Entity)
            .filter(mentoring_relationships::Column::TenantId.eq(tenant_id))
            .one(&self.db)
            .await?
            .ok_or(ActionItemError::NotFound(id))?;

        if !scope.permits(item.relationship_id) {
            return Err(ActionItemError::NotFound(id));
        }

        let completing = matches!(input.status, Some(ActionItemStatus::Completed))
            && item.status != ActionItemStatus::Completed;
        let had_completed_at = item.completed_at.is_some();

        let mut active: action_items::ActiveModel = item.into();
        if let Some(title) = input.title {
            active.title = Set(title);
        }
        if let Some(description) = input.description {
            active.description = Set(description);
        }
        if let Some(priority) = input.priority {
            active.priority = Set(priority);
        }
        if let Some(due_date) = input.due_date {
            active.due_date = Set(due_date.map(Into::into));
        }
        if let Some(status) = input.status {
            active.status = Set(status);
        }
        if let Some(completed_at) = input.completed_at {
            active.completed_at = Set(Some(completed_at.into()));
        } else if completing && !had_completed_at {
            active.completed_at = Set(Some(Utc::now().into()));
        }
        active.updated_at = Set(Utc::now().into());

        Ok(active.update(&self.db).await?)
    }
}
