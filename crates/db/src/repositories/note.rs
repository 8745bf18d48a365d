//! Session note repository.

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, DbErr, EntityTrait, QueryFilter,
    QueryOrder, Set,
};
use uuid::Uuid;

use crate::entities::{
    mentoring_relationships, mentoring_sessions, sea_orm_active_enums::NoteVisibility,
    session_notes,
};
use crate::scope::RelationshipScope;

/// Error types for note operations.
#[derive(Debug, thiserror::Error)]
pub enum NoteError {
    /// Session does not resolve within the caller's tenant and scope.
    #[error("Session not found: {0}")]
    SessionNotFound(Uuid),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

/// Repository for session notes.
#[derive(Debug, Clone)]
pub struct NoteRepository {
    db: DatabaseConnection,
}

impl NoteRepository {
    /// Creates a new note repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Lists the notes on a session visible to the viewer: shared notes
    /// plus the viewer's own private ones. This per-row filter runs in
    /// addition to the relationship-scope requirement, not instead of it.
    ///
    /// # Errors
    ///
    /// Returns `SessionNotFound` if the session does not resolve within the
    /// tenant and scope, or a database error.
    pub async fn list_visible(
        &self,
        tenant_id: Uuid,
        scope: &RelationshipScope,
        session_id: Uuid,
        viewer_id: Uuid,
    ) -> Result<Vec<session_notes::Model>, NoteError> {
        self.resolve_session(tenant_id, scope, session_id).await?;

        Ok(session_notes::Entity::find()
            .filter(session_notes::Column::SessionId.eq(session_id))
            .filter(
                Condition::any()
                    .add(session_notes::Column::Visibility.eq(NoteVisibility::Shared))
                    .add(session_notes::Column::AuthorId.eq(viewer_id)),
            )
            .order_by_asc(session_notes::Column::CreatedAt)
            .all(&self.db)
            .await?)
    }

    /// Creates a note on a session the author holds scope on.
    ///
    /// # Errors
    ///
    /// Returns `SessionNotFound` if the session does not resolve within the
    /// tenant and scope, or a database error.
    pub async fn create(
        &self,
        tenant_id: Uuid,
        scope: &RelationshipScope,
        session_id: Uuid,
        author_id: Uuid,
        content: String,
        visibility: NoteVisibility,
    ) -> Result<session_notes::Model, NoteError> {
        self.resolve_session(tenant_id, scope, session_id).await?;

        let now = Utc::now().into();
        let model = session_notes::ActiveModel {
            id: Set(Uuid::new_v4()),
            session_id: Set(session_id),
            author_id: Set(author_id),
            content: Set(content),
            visibility: Set(visibility),
            created_at: Set(now),
            updated_at: Set(now),
        };

        Ok(model.insert(&self.db).await?)
    }

    async fn resolve_session(
        &self,
        tenant_id: Uuid,
        scope: &RelationshipScope,
        session_id: Uuid,
    ) -> Result<(), NoteError> {
        let session = mentoring_sessions::Entity::find_by_id(session_id)
            .one(&self.db)
            .await?
            .ok_or(NoteError::SessionNotFound(session_id))?;

        if !scope.permits(session.relationship_id) {
            return Err(NoteError::SessionNotFound(session_id));
        }

        mentoring_relationships::Entity::find_by_id(session.relationship_id)
            .filter(mentoring_relationships::Column::TenantId.eq(tenant_id))
            .one(&self.db)
            .await?
            .ok_or(NoteError::SessionNotFound(session_id))?;

        Ok(())
    }
}
