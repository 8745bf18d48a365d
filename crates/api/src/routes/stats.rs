//! Mentoring statistics routes.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};
use serde_json::json;
use tracing::error;
use uuid::Uuid;

use crate::{AppState, middleware::AuthUser};
use crate::routes::{check_tenant_access, internal_error, resolve_scope};
use catalyst_db::StatsRepository;

/// Creates the stats routes (requires auth middleware to be applied externally).
pub fn routes() -> Router<AppState> {
    Router::new().route("/tenants/{tenant_id}/stats", get(get_stats))
}

/// GET `/tenants/{tenant_id}/stats` - Mentoring rollup for the caller's scope.
///
/// An empty scope returns all zeros without touching the stores.
async fn get_stats(
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

    let repo = StatsRepository::new((*state.db).clone());
    match repo.compute(tenant_id, &scope).await {
        Ok(stats) => (StatusCode::OK, Json(json!({ "data": stats }))).into_response(),
        Err(e) => {
            error!(error = %e, "Failed to compute stats");
            internal_error()
        }
    }
}
