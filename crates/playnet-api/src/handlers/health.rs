//! Health check endpoint.

use axum::Json;
use axum::extract::State;
use axum::response::IntoResponse;
use serde_json::json;

use crate::state::AppState;

/// GET /api/health — process and database reachability.
pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let database = state.db.health_check().await.unwrap_or(false);

    Json(json!({
        "status": if database { "ok" } else { "degraded" },
        "database": database,
        "online_users": state.realtime.registry.online_count(),
    }))
}
