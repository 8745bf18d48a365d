//! API route definitions.

use axum::{
    Json, Router,
    http::StatusCode,
    middleware,
    response::{IntoResponse, Response},
};
use sea_orm::DatabaseConnection;
use serde_json::json;
use tracing::error;
use uuid::Uuid;

use crate::{AppState, middleware::auth::auth_middleware};
use crate::middleware::AuthUser;
use catalyst_db::{RelationshipRepository, RelationshipScope, TenantRepository};

pub mod action_items;
pub mod health;
pub mod relationships;
pub mod sessions;
pub mod stats;

/// Creates the API router with protected routes that need state for middleware.
#[allow(clippy::needless_pass_by_value)]
pub fn api_routes_with_state(state: AppState) -> Router<AppState> {
    // Protected routes that require authentication
    let protected_routes = Router::new()
        .merge(relationships::routes())
        .merge(sessions::routes())
        .merge(action_items::routes())
        .merge(stats::routes())
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    Router::new().merge(health::routes()).merge(protected_routes)
}

/// Standard response for an unexpected database failure.
pub(crate) fn internal_error() -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({
            "error": "internal_error",
            "message": "An error occurred"
        })),
    )
        .into_response()
}

/// Checks that the caller may operate within the path tenant.
///
/// Access requires the caller's home tenant to be the path tenant, or the
/// agency capability together with a shared agency between the two tenants.
pub(crate) async fn check_tenant_access(
    db: &DatabaseConnection,
    auth: &AuthUser,
    tenant_id: Uuid,
) -> Result<(), Response> {
    let tenant_repo = TenantRepository::new(db.clone());

    match tenant_repo
        .can_access(auth.tenant_id(), auth.capabilities(), tenant_id)
        .await
    {
        Ok(true) => Ok(()),
        Ok(false) => Err((
            StatusCode::FORBIDDEN,
            Json(json!({
                "error": "forbidden",
                "message": "You do not have access to this tenant"
            })),
        )
            .into_response()),
        Err(e) => {
            error!(error = %e, "Failed to check tenant access");
            Err(internal_error())
        }
    }
}

/// Resolves the caller's relationship scope within the tenant.
pub(crate) async fn resolve_scope(
    db: &DatabaseConnection,
    auth: &AuthUser,
    tenant_id: Uuid,
) -> Result<RelationshipScope, Response> {
    let relationship_repo = RelationshipRepository::new(db.clone());

    relationship_repo
        .resolve_scope(&auth.scope_user(), tenant_id)
        .await
        .map_err(|e| {
            error!(error = %e, "Failed to resolve relationship scope");
            internal_error()
        })
}
