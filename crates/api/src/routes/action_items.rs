//! Action item routes.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post, put},
};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::json;
use tracing::{error, info};
use uuid::Uuid;

use crate::{AppState, middleware::AuthUser};
use crate::routes::{check_tenant_access, internal_error, resolve_scope};
use catalyst_db::entities::sea_orm_active_enums::{ActionItemPriority, ActionItemStatus};
use catalyst_db::repositories::action_item::{
    ActionItemError, ActionItemRepository, CreateActionItemInput, UpdateActionItemInput,
};

/// Creates the action item routes (requires auth middleware to be applied externally).
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/tenants/{tenant_id}/action-items", get(list_action_items))
        .route("/tenants/{tenant_id}/action-items", post(create_action_item))
        .route(
            "/tenants/{tenant_id}/action-items/{item_id}",
            put(update_action_item),
        )
}

/// Query parameters for listing action items.
#[derive(Debug, Deserialize)]
pub struct ListActionItemsQuery {
    /// Restrict to one status.
    pub status: Option<ActionItemStatus>,
}

/// Request body for creating an action item.
#[derive(Debug, Deserialize)]
pub struct CreateActionItemRequest {
    /// Parent relationship ID.
    pub relationship_id: Uuid,
    /// Optional originating session ID; must belong to the relationship.
    pub session_id: Option<Uuid>,
    /// User responsible for the item; the caller when omitted.
    pub owner_id: Option<Uuid>,
    /// Short title.
    pub title: String,
    /// Longer description.
    pub description: Option<String>,
    /// Priority; medium when omitted.
    pub priority: Option<ActionItemPriority>,
    /// Due timestamp.
    pub due_date: Option<DateTime<Utc>>,
}

/// Request body for updating an action item.
///
/// The doubly-optional fields distinguish "absent" (leave unchanged) from
/// `null` (clear the value).
#[derive(Debug, Deserialize, Default)]
pub struct UpdateActionItemRequest {
    /// New title.
    pub title: Option<String>,
    /// New description, or `null` to clear it.
    #[serde(default, with = "double_option")]
    pub description: Option<Option<String>>,
    /// New status.
    pub status: Option<ActionItemStatus>,
    /// New priority.
    pub priority: Option<ActionItemPriority>,
    /// New due timestamp, or `null` to clear it.
    #[serde(default, with = "double_option")]
    pub due_date: Option<Option<DateTime<Utc>>>,
    /// Explicit completion timestamp; stamped automatically when the status
    /// moves to `completed` without one.
    pub completed_at: Option<DateTime<Utc>>,
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

/// Maps action item repository errors to HTTP responses.
fn map_action_item_error(e: &ActionItemError) -> axum::response::Response {
    match e {
        ActionItemError::NotFound(_) => (
            StatusCode::NOT_FOUND,
            Json(json!({
                "error": "not_found",
                "message": "Action item not found"
            })),
        )
            .into_response(),
        ActionItemError::RelationshipNotFound(_) => (
            StatusCode::NOT_FOUND,
            Json(json!({
                "error": "not_found",
                "message": "Relationship not found"
            })),
        )
            .into_response(),
        ActionItemError::SessionNotFound(_) => (
            StatusCode::BAD_REQUEST,
            Json(json!({
                "error": "session_mismatch",
                "message": "Session does not belong to the relationship"
            })),
        )
            .into_response(),
        ActionItemError::Database(_) => internal_error(),
    }
}

/// GET `/tenants/{tenant_id}/action-items` - List action items in scope.
async fn list_action_items(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(tenant_id): Path<Uuid>,
    Query(query): Query<ListActionItemsQuery>,
) -> impl IntoResponse {
    if let Err(response) = check_tenant_access(&state.db, &auth, tenant_id).await {
        return response;
    }
    let scope = match resolve_scope(&state.db, &auth, tenant_id).await {
        Ok(scope) => scope,
        Err(response) => return response,
    };

    let repo = ActionItemRepository::new((*state.db).clone());
    match repo.list(tenant_id, &scope, query.status).await {
        Ok(items) => (StatusCode::OK, Json(json!({ "data": items }))).into_response(),
        Err(e) => {
            error!(error = %e, "Failed to list action items");
            internal_error()
        }
    }
}

/// POST `/tenants/{tenant_id}/action-items` - Create an action item.
async fn create_action_item(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(tenant_id): Path<Uuid>,
    Json(payload): Json<CreateActionItemRequest>,
) -> impl IntoResponse {
    if let Err(response) = check_tenant_access(&state.db, &auth, tenant_id).await {
        return response;
    }
    let scope = match resolve_scope(&state.db, &auth, tenant_id).await {
        Ok(scope) => scope,
        Err(response) => return response,
    };

    let repo = ActionItemRepository::new((*state.db).clone());
    let input = CreateActionItemInput {
        relationship_id: payload.relationship_id,
        session_id: payload.session_id,
        owner_id: payload.owner_id.unwrap_or_else(|| auth.user_id()),
        title: payload.title,
        description: payload.description,
        priority: payload.priority,
        due_date: payload.due_date,
    };

    match repo.create(tenant_id, &scope, input).await {
        Ok(item) => {
            info!(
                tenant_id = %tenant_id,
                item_id = %item.id,
                relationship_id = %item.relationship_id,
                "Action item created"
            );
            (StatusCode::CREATED, Json(json!({ "data": item }))).into_response()
        }
        Err(e) => {
            error!(error = %e, "Failed to create action item");
            map_action_item_error(&e)
        }
    }
}

/// PUT `/tenants/{tenant_id}/action-items/{item_id}` - Update an action item.
async fn update_action_item(
    State(state): State<AppState>,
    auth: AuthUser,
    Path((tenant_id, item_id)): Path<(Uuid, Uuid)>,
    Json(payload): Json<UpdateActionItemRequest>,
) -> impl IntoResponse {
    if let Err(response) = check_tenant_access(&state.db, &auth, tenant_id).await {
        return response;
    }
    let scope = match resolve_scope(&state.db, &auth, tenant_id).await {
        Ok(scope) => scope,
        Err(response) => return response,
    };

    let repo = ActionItemRepository::new((*state.db).clone());
    let input = UpdateActionItemInput {
        title: payload.title,
        description: payload.description,
        status: payload.status,
        priority: payload.priority,
        due_date: payload.due_date,
        completed_at: payload.completed_at,
    };

    match repo.update(tenant_id, &scope, item_id, input).await {
        Ok(item) => (StatusCode::OK, Json(json!({ "data": item }))).into_response(),
        Err(e) => {
            error!(error = %e, "Failed to update action item");
            map_action_item_error(&e)
        }
    }
}
