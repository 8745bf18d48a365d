//! Mentoring relationship routes.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{delete, get, post},
};
use serde::Deserialize;
use serde_json::json;
use tracing::{error, info};
use uuid::Uuid;

use crate::{AppState, middleware::AuthUser};
use crate::routes::{check_tenant_access, internal_error, resolve_scope};
use catalyst_db::repositories::relationship::{
    CreateRelationshipInput, RelationshipError, RelationshipRepository,
};
use catalyst_db::scope::ADMIN_OVERRIDE_ROLE_LEVEL;
use catalyst_shared::Capability;

/// Creates the relationship routes (requires auth middleware to be applied externally).
pub fn routes() -> Router<AppState> {
    Router::new()
        .route(
            "/tenants/{tenant_id}/relationships",
            get(list_relationships),
        )
        .route(
            "/tenants/{tenant_id}/relationships",
            post(create_relationship),
        )
        .route(
            "/tenants/{tenant_id}/relationships/{relationship_id}",
            get(get_relationship),
        )
        .route(
            "/tenants/{tenant_id}/relationships/{relationship_id}",
            delete(end_relationship),
        )
}

/// Request body for creating a relationship.
#[derive(Debug, Deserialize)]
pub struct CreateRelationshipRequest {
    /// Mentor user ID.
    pub mentor_id: Uuid,
    /// Mentee user ID.
    pub mentee_id: Uuid,
    /// Free-form relationship type label.
    pub relationship_type: String,
}

/// Checks that the caller may create or end relationships.
fn check_manage_capability(auth: &AuthUser) -> Result<(), axum::response::Response> {
    if auth.capabilities().contains(Capability::ManageRelationships)
        || auth.role_level() >= ADMIN_OVERRIDE_ROLE_LEVEL
    {
        Ok(())
    } else {
        Err((
            StatusCode::FORBIDDEN,
            Json(json!({
                "error": "forbidden",
                "message": "Relationship management capability required"
            })),
        )
            .into_response())
    }
}

/// Maps repository errors to HTTP responses.
fn map_relationship_error(e: &RelationshipError) -> axum::response::Response {
    match e {
        RelationshipError::NotFound(_) => (
            StatusCode::NOT_FOUND,
            Json(json!({
                "error": "not_found",
                "message": "Relationship not found"
            })),
        )
            .into_response(),
        RelationshipError::MentorNotInTenant(_) => (
            StatusCode::BAD_REQUEST,
            Json(json!({
                "error": "mentor_not_in_tenant",
                "message": "Mentor is not an active user of this tenant"
            })),
        )
            .into_response(),
        RelationshipError::MenteeNotInTenant(_) => (
            StatusCode::BAD_REQUEST,
            Json(json!({
                "error": "mentee_not_in_tenant",
                "message": "Mentee is not an active user of this tenant"
            })),
        )
            .into_response(),
        RelationshipError::SelfMentoring => (
            StatusCode::BAD_REQUEST,
            Json(json!({
                "error": "self_mentoring",
                "message": "Mentor and mentee must be distinct users"
            })),
        )
            .into_response(),
        RelationshipError::Database(_) => internal_error(),
    }
}

/// GET `/tenants/{tenant_id}/relationships` - List relationships in scope.
async fn list_relationships(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(tenant_id): Path<Uuid>,
) -> impl IntoResponse {
    if let Err(response) = check_tenant_access(&state.db, &auth, tenant_id).await {
        return response;
    }
    let scope = match resolve_scope(&state.db, &auth, tenant_id).await {
        Ok(scope) => scope,
        Err(response) => return response,
    };

    let repo = RelationshipRepository::new((*state.db).clone());
    match repo.list(tenant_id, &scope).await {
        Ok(relationships) => {
            (StatusCode::OK, Json(json!({ "data": relationships }))).into_response()
        }
        Err(e) => {
            error!(error = %e, "Failed to list relationships");
            internal_error()
        }
    }
}

/// GET `/tenants/{tenant_id}/relationships/{relationship_id}` - Fetch one relationship.
async fn get_relationship(
    State(state): State<AppState>,
    auth: AuthUser,
    Path((tenant_id, relationship_id)): Path<(Uuid, Uuid)>,
) -> impl IntoResponse {
    if let Err(response) = check_tenant_access(&state.db, &auth, tenant_id).await {
        return response;
    }
    let scope = match resolve_scope(&state.db, &auth, tenant_id).await {
        Ok(scope) => scope,
        Err(response) => return response,
    };

    let repo = RelationshipRepository::new((*state.db).clone());
    match repo.find_scoped(tenant_id, &scope, relationship_id).await {
        Ok(Some(relationship)) => {
            (StatusCode::OK, Json(json!({ "data": relationship }))).into_response()
        }
        Ok(None) => map_relationship_error(&RelationshipError::NotFound(relationship_id)),
        Err(e) => {
            error!(error = %e, "Failed to fetch relationship");
            internal_error()
        }
    }
}

/// POST `/tenants/{tenant_id}/relationships` - Create a relationship.
async fn create_relationship(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(tenant_id): Path<Uuid>,
    Json(payload): Json<CreateRelationshipRequest>,
) -> impl IntoResponse {
    if let Err(response) = check_tenant_access(&state.db, &auth, tenant_id).await {
        return response;
    }
    if let Err(response) = check_manage_capability(&auth) {
        return response;
    }

    let repo = RelationshipRepository::new((*state.db).clone());
    let input = CreateRelationshipInput {
        tenant_id,
        mentor_id: payload.mentor_id,
        mentee_id: payload.mentee_id,
        relationship_type: payload.relationship_type,
        created_by: auth.user_id(),
    };

    match repo.create(input).await {
        Ok(relationship) => {
            info!(
                tenant_id = %tenant_id,
                relationship_id = %relationship.id,
                "Relationship created"
            );
            (StatusCode::CREATED, Json(json!({ "data": relationship }))).into_response()
        }
        Err(e) => {
            error!(error = %e, "Failed to create relationship");
            map_relationship_error(&e)
        }
    }
}

/// DELETE `/tenants/{tenant_id}/relationships/{relationship_id}` - End a relationship.
///
/// The relationship is soft-terminated and retained as audit trail.
async fn end_relationship(
    State(state): State<AppState>,
    auth: AuthUser,
    Path((tenant_id, relationship_id)): Path<(Uuid, Uuid)>,
) -> impl IntoResponse {
    if let Err(response) = check_tenant_access(&state.db, &auth, tenant_id).await {
        return response;
    }
    if let Err(response) = check_manage_capability(&auth) {
        return response;
    }
    let scope = match resolve_scope(&state.db, &auth, tenant_id).await {
        Ok(scope) => scope,
        Err(response) => return response,
    };

    let repo = RelationshipRepository::new((*state.db).clone());
    match repo.end(tenant_id, &scope, relationship_id).await {
        Ok(relationship) => {
            info!(
                tenant_id = %tenant_id,
                relationship_id = %relationship.id,
                "Relationship ended"
            );
            (StatusCode::OK, Json(json!({ "data": relationship }))).into_response()
        }
        Err(e) => {
            error!(error = %e, "Failed to end relationship");
            map_relationship_error(&e)
        }
    }
}
