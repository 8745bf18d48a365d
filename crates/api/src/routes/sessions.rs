//! Mentoring session routes, including session notes and prep.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{delete, get, post, put},
};
use chrono::{NaiveDate, NaiveTime};
use serde::Deserialize;
use serde_json::json;
use tracing::{error, info};
use uuid::Uuid;

use crate::{AppState, middleware::AuthUser};
use crate::routes::{check_tenant_access, internal_error, resolve_scope};
use catalyst_db::entities::sea_orm_active_enums::{NoteVisibility, SessionStatus};
use catalyst_db::repositories::note::{NoteError, NoteRepository};
use catalyst_db::repositories::prep::{PrepError, PrepInput, PrepRepository};
use catalyst_db::repositories::session::{
    CreateSessionInput, SessionError, SessionFilter, SessionRepository, UpdateSessionInput,
};

/// Creates the session routes (requires auth middleware to be applied externally).
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/tenants/{tenant_id}/sessions", get(list_sessions))
        .route("/tenants/{tenant_id}/sessions", post(create_session))
        .route(
            "/tenants/{tenant_id}/sessions/{session_id}",
            get(get_session),
        )
        .route(
            "/tenants/{tenant_id}/sessions/{session_id}",
            put(update_session),
        )
        .route(
            "/tenants/{tenant_id}/sessions/{session_id}",
            delete(cancel_session),
        )
        .route(
            "/tenants/{tenant_id}/sessions/{session_id}/notes",
            get(list_notes),
        )
        .route(
            "/tenants/{tenant_id}/sessions/{session_id}/notes",
            post(create_note),
        )
        .route(
            "/tenants/{tenant_id}/sessions/{session_id}/prep",
            get(get_prep),
        )
        .route(
            "/tenants/{tenant_id}/sessions/{session_id}/prep",
            post(create_prep),
        )
        .route(
            "/tenants/{tenant_id}/sessions/{session_id}/prep",
            put(update_prep),
        )
}

// ============================================================================
// Request Types
// ============================================================================

/// Query parameters for listing sessions.
#[derive(Debug, Deserialize)]
pub struct ListSessionsQuery {
    /// Restrict to one relationship. ANDed with the caller's scope.
    pub relationship_id: Option<Uuid>,
    /// Restrict to one status.
    pub status: Option<SessionStatus>,
}

/// Request body for creating a session.
#[derive(Debug, Deserialize)]
pub struct CreateSessionRequest {
    /// Parent relationship ID.
    pub relationship_id: Uuid,
    /// Scheduled date.
    pub scheduled_date: NaiveDate,
    /// Scheduled time, if fixed.
    pub scheduled_time: Option<NaiveTime>,
    /// Planned duration in minutes.
    pub duration_minutes: i32,
}

/// Request body for updating a session.
///
/// `scheduled_time` distinguishes "absent" (leave unchanged) from `null`
/// (clear the time).
#[derive(Debug, Deserialize)]
pub struct UpdateSessionRequest {
    /// New scheduled date.
    pub scheduled_date: Option<NaiveDate>,
    /// New scheduled time, or `null` to clear it.
    #[serde(default, with = "double_option")]
    pub scheduled_time: Option<Option<NaiveTime>>,
    /// New duration in minutes.
    pub duration_minutes: Option<i32>,
    /// New status, validated against the forward-only flow.
    pub status: Option<SessionStatus>,
}

/// Deserializes a doubly-optional field: absent vs `null` vs value.
mod double_option {
    use serde::{Deserialize, Deserializer};

    pub fn deserialize<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
    where
        T: Deserialize<'de>,
        D: Deserializer<'de>,
    {
        Option::<T>::deserialize(deserializer).map(Some)
    }
}

/// Request body for creating a session note.
#[derive(Debug, Deserialize)]
pub struct CreateNoteRequest {
    /// Note content.
    pub content: String,
    /// Visibility; private when omitted.
    pub visibility: Option<NoteVisibility>,
}

/// Request body for creating or updating session prep.
#[derive(Debug, Deserialize, Default)]
pub struct PrepRequest {
    /// Wins since the last session.
    pub wins: Option<String>,
    /// Current challenges.
    pub challenges: Option<String>,
    /// Topics the mentee wants to discuss.
    pub topics_to_discuss: Option<String>,
    /// Questions for the mentor.
    pub questions_for_mentor: Option<String>,
}

impl From<PrepRequest> for PrepInput {
    fn from(request: PrepRequest) -> Self {
        Self {
            wins: request.wins,
            challenges: request.challenges,
            topics_to_discuss: request.topics_to_discuss,
            questions_for_mentor: request.questions_for_mentor,
        }
    }
}

// ============================================================================
// Error Mapping
// ============================================================================

/// Maps session repository errors to HTTP responses.
fn map_session_error(e: &SessionError) -> axum::response::Response {
    match e {
        SessionError::NotFound(_) => (
            StatusCode::NOT_FOUND,
            Json(json!({
                "error": "not_found",
                "message": "Session not found"
            })),
        )
            .into_response(),
        SessionError::RelationshipNotFound(_) => (
            StatusCode::NOT_FOUND,
            Json(json!({
                "error": "not_found",
                "message": "Relationship not found"
            })),
        )
            .into_response(),
        SessionError::InvalidTransition { from, to } => (
            StatusCode::CONFLICT,
            Json(json!({
                "error": "invalid_transition",
                "message": format!("Invalid session status transition: {from:?} -> {to:?}")
            })),
        )
            .into_response(),
        SessionError::Database(_) => internal_error(),
    }
}

/// Maps note repository errors to HTTP responses.
fn map_note_error(e: &NoteError) -> axum::response::Response {
    match e {
        NoteError::SessionNotFound(_) => (
            StatusCode::NOT_FOUND,
            Json(json!({
                "error": "not_found",
                "message": "Session not found"
            })),
        )
            .into_response(),
        NoteError::Database(_) => internal_error(),
    }
}

/// Maps prep repository errors to HTTP responses.
fn map_prep_error(e: &PrepError) -> axum::response::Response {
    match e {
        PrepError::SessionNotFound(_) => (
            StatusCode::NOT_FOUND,
            Json(json!({
                "error": "not_found",
                "message": "Session not found"
            })),
        )
            .into_response(),
        PrepError::NotFound(_) => (
            StatusCode::NOT_FOUND,
            Json(json!({
                "error": "prep_not_found",
                "message": "No prep exists for this session yet"
            })),
        )
            .into_response(),
        PrepError::NotMentee => (
            StatusCode::FORBIDDEN,
            Json(json!({
                "error": "not_mentee",
                "message": "Only the relationship's mentee may submit prep"
            })),
        )
            .into_response(),
        PrepError::SessionClosed => (
            StatusCode::BAD_REQUEST,
            Json(json!({
                "error": "session_closed",
                "message": "Session is closed; prep can no longer be changed"
            })),
        )
            .into_response(),
        PrepError::AlreadyExists(_) => (
            StatusCode::CONFLICT,
            Json(json!({
                "error": "prep_exists",
                "message": "Prep already exists for this session"
            })),
        )
            .into_response(),
        PrepError::Database(_) => internal_error(),
    }
}

// ============================================================================
// Session Handlers
// ============================================================================

/// GET `/tenants/{tenant_id}/sessions` - List sessions in scope.
async fn list_sessions(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(tenant_id): Path<Uuid>,
    Query(query): Query<ListSessionsQuery>,
) -> impl IntoResponse {
    if let Err(response) = check_tenant_access(&state.db, &auth, tenant_id).await {
        return response;
    }
    let scope = match resolve_scope(&state.db, &auth, tenant_id).await {
        Ok(scope) => scope,
        Err(response) => return response,
    };

    let repo = SessionRepository::new((*state.db).clone());
    let filter = SessionFilter {
        relationship_id: query.relationship_id,
        status: query.status,
    };

    match repo.list(tenant_id, &scope, filter).await {
        Ok(sessions) => (StatusCode::OK, Json(json!({ "data": sessions }))).into_response(),
        Err(e) => {
            error!(error = %e, "Failed to list sessions");
            internal_error()
        }
    }
}

/// GET `/tenants/{tenant_id}/sessions/{session_id}` - Fetch one session.
async fn get_session(
    State(state): State<AppState>,
    auth: AuthUser,
    Path((tenant_id, session_id)): Path<(Uuid, Uuid)>,
) -> impl IntoResponse {
    if let Err(response) = check_tenant_access(&state.db, &auth, tenant_id).await {
        return response;
    }
    let scope = match resolve_scope(&state.db, &auth, tenant_id).await {
        Ok(scope) => scope,
        Err(response) => return response,
    };

    let repo = SessionRepository::new((*state.db).clone());
    match repo.find_scoped(tenant_id, &scope, session_id).await {
        Ok(Some((session, _))) => (StatusCode::OK, Json(json!({ "data": session }))).into_response(),
        Ok(None) => map_session_error(&SessionError::NotFound(session_id)),
        Err(e) => {
            error!(error = %e, "Failed to fetch session");
            internal_error()
        }
    }
}

/// POST `/tenants/{tenant_id}/sessions` - Create a session.
async fn create_session(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(tenant_id): Path<Uuid>,
    Json(payload): Json<CreateSessionRequest>,
) -> impl IntoResponse {
    if let Err(response) = check_tenant_access(&state.db, &auth, tenant_id).await {
        return response;
    }
    let scope = match resolve_scope(&state.db, &auth, tenant_id).await {
        Ok(scope) => scope,
        Err(response) => return response,
    };

    let repo = SessionRepository::new((*state.db).clone());
    let input = CreateSessionInput {
        relationship_id: payload.relationship_id,
        scheduled_date: payload.scheduled_date,
        scheduled_time: payload.scheduled_time,
        duration_minutes: payload.duration_minutes,
        created_by: auth.user_id(),
    };

    match repo.create(tenant_id, &scope, input).await {
        Ok(session) => {
            info!(
                tenant_id = %tenant_id,
                session_id = %session.id,
                relationship_id = %session.relationship_id,
                "Session created"
            );
            (StatusCode::CREATED, Json(json!({ "data": session }))).into_response()
        }
        Err(e) => {
            error!(error = %e, "Failed to create session");
            map_session_error(&e)
        }
    }
}

/// PUT `/tenants/{tenant_id}/sessions/{session_id}` - Update a session.
async fn update_session(
    State(state): State<AppState>,
    auth: AuthUser,
    Path((tenant_id, session_id)): Path<(Uuid, Uuid)>,
    Json(payload): Json<UpdateSessionRequest>,
) -> impl IntoResponse {
    if let Err(response) = check_tenant_access(&state.db, &auth, tenant_id).await {
        return response;
    }
    let scope = match resolve_scope(&state.db, &auth, tenant_id).await {
        Ok(scope) => scope,
        Err(response) => return response,
    };

    let repo = SessionRepository::new((*state.db).clone());
    let input = UpdateSessionInput {
        scheduled_date: payload.scheduled_date,
        scheduled_time: payload.scheduled_time,
        duration_minutes: payload.duration_minutes,
        status: payload.status,
    };

    match repo.update(tenant_id, &scope, session_id, input).await {
        Ok(session) => (StatusCode::OK, Json(json!({ "data": session }))).into_response(),
        Err(e) => {
            error!(error = %e, "Failed to update session");
            map_session_error(&e)
        }
    }
}

/// DELETE `/tenants/{tenant_id}/sessions/{session_id}` - Cancel a session.
async fn cancel_session(
    State(state): State<AppState>,
    auth: AuthUser,
    Path((tenant_id, session_id)): Path<(Uuid, Uuid)>,
) -> impl IntoResponse {
    if let Err(response) = check_tenant_access(&state.db, &auth, tenant_id).await {
        return response;
    }
    let scope = match resolve_scope(&state.db, &auth, tenant_id).await {
        Ok(scope) => scope,
        Err(response) => return response,
    };

    let repo = SessionRepository::new((*state.db).clone());
    match repo.cancel(tenant_id, &scope, session_id).await {
        Ok(session) => {
            info!(
                tenant_id = %tenant_id,
                session_id = %session.id,
                "Session cancelled"
            );
            (StatusCode::OK, Json(json!({ "data": session }))).into_response()
        }
        Err(e) => {
            error!(error = %e, "Failed to cancel session");
            map_session_error(&e)
        }
    }
}

// ============================================================================
// Note Handlers
// ============================================================================

/// GET `/tenants/{tenant_id}/sessions/{session_id}/notes` - List visible notes.
///
/// Returns shared notes plus the caller's own private ones.
async fn list_notes(
    State(state): State<AppState>,
    auth: AuthUser,
    Path((tenant_id, session_id)): Path<(Uuid, Uuid)>,
) -> impl IntoResponse {
    if let Err(response) = check_tenant_access(&state.db, &auth, tenant_id).await {
        return response;
    }
    let scope = match resolve_scope(&state.db, &auth, tenant_id).await {
        Ok(scope) => scope,
        Err(response) => return response,
    };

    let repo = NoteRepository::new((*state.db).clone());
    match repo
        .list_visible(tenant_id, &scope, session_id, auth.user_id())
        .await
    {
        Ok(notes) => (StatusCode::OK, Json(json!({ "data": notes }))).into_response(),
        Err(e) => {
            error!(error = %e, "Failed to list notes");
            map_note_error(&e)
        }
    }
}

/// POST `/tenants/{tenant_id}/sessions/{session_id}/notes` - Create a note.
async fn create_note(
    State(state): State<AppState>,
    auth: AuthUser,
    Path((tenant_id, session_id)): Path<(Uuid, Uuid)>,
    Json(payload): Json<CreateNoteRequest>,
) -> impl IntoResponse {
    if let Err(response) = check_tenant_access(&state.db, &auth, tenant_id).await {
        return response;
    }
    let scope = match resolve_scope(&state.db, &auth, tenant_id).await {
        Ok(scope) => scope,
        Err(response) => return response,
    };

    let repo = NoteRepository::new((*state.db).clone());
    let visibility = payload.visibility.unwrap_or(NoteVisibility::Private);

    match repo
        .create(
            tenant_id,
            &scope,
            session_id,
            auth.user_id(),
            payload.content,
            visibility,
        )
        .await
    {
        Ok(note) => (StatusCode::CREATED, Json(json!({ "data": note }))).into_response(),
        Err(e) => {
            error!(error = %e, "Failed to create note");
            map_note_error(&e)
        }
    }
}

// ============================================================================
// Prep Handlers
// ============================================================================

/// GET `/tenants/{tenant_id}/sessions/{session_id}/prep` - Fetch the session prep.
async fn get_prep(
    State(state): State<AppState>,
    auth: AuthUser,
    Path((tenant_id, session_id)): Path<(Uuid, Uuid)>,
) -> impl IntoResponse {
    if let Err(response) = check_tenant_access(&state.db, &auth, tenant_id).await {
        return response;
    }
    let scope = match resolve_scope(&state.db, &auth, tenant_id).await {
        Ok(scope) => scope,
        Err(response) => return response,
    };

    let repo = PrepRepository::new((*state.db).clone());
    match repo.get(tenant_id, &scope, session_id).await {
        Ok(Some(prep)) => (StatusCode::OK, Json(json!({ "data": prep }))).into_response(),
        Ok(None) => map_prep_error(&PrepError::NotFound(session_id)),
        Err(e) => {
            error!(error = %e, "Failed to fetch prep");
            map_prep_error(&e)
        }
    }
}

/// POST `/tenants/{tenant_id}/sessions/{session_id}/prep` - Submit prep.
///
/// Submission advances a session that has not yet reached `ready`.
async fn create_prep(
    State(state): State<AppState>,
    auth: AuthUser,
    Path((tenant_id, session_id)): Path<(Uuid, Uuid)>,
    Json(payload): Json<PrepRequest>,
) -> impl IntoResponse {
    if let Err(response) = check_tenant_access(&state.db, &auth, tenant_id).await {
        return response;
    }
    let scope = match resolve_scope(&state.db, &auth, tenant_id).await {
        Ok(scope) => scope,
        Err(response) => return response,
    };

    let repo = PrepRepository::new((*state.db).clone());
    match repo
        .create(
            tenant_id,
            &scope,
            &auth.scope_user(),
            session_id,
            payload.into(),
        )
        .await
    {
        Ok(prep) => {
            info!(
                tenant_id = %tenant_id,
                session_id = %session_id,
                "Prep submitted"
            );
            (StatusCode::CREATED, Json(json!({ "data": prep }))).into_response()
        }
        Err(e) => {
            error!(error = %e, "Failed to create prep");
            map_prep_error(&e)
        }
    }
}

/// PUT `/tenants/{tenant_id}/sessions/{session_id}/prep` - Update prep.
async fn update_prep(
    State(state): State<AppState>,
    auth: AuthUser,
    Path((tenant_id, session_id)): Path<(Uuid, Uuid)>,
    Json(payload): Json<PrepRequest>,
) -> impl IntoResponse {
    if let Err(response) = check_tenant_access(&state.db, &auth, tenant_id).await {
        return response;
    }
    let scope = match resolve_scope(&state.db, &auth, tenant_id).await {
        Ok(scope) => scope,
        Err(response) => return response,
    };

    let repo = PrepRepository::new((*state.db).clone());
    match repo
        .update(
            tenant_id,
            &scope,
            &auth.scope_user(),
            session_id,
            payload.into(),
        )
        .await
    {
        Ok(prep) => (StatusCode::OK, Json(json!({ "data": prep }))).into_response(),
        Err(e) => {
            error!(error = %e, "Failed to update prep");
            map_prep_error(&e)
        }
    }
}
