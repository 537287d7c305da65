//! Health and status handlers.

use axum::extract::State;
use axum::response::Json;
use serde::Serialize;
use serde_json::{Value, json};
use tracing::trace;
use ts_rs::TS;

use crate::state::AppState;
use crate::web::error::{ApiError, db_error};

#[derive(Serialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct StatusResponse {
    pub version: String,
    pub commit: String,
    pub faculty_count: i64,
    pub scholar_sync_enabled: bool,
}

/// Health check endpoint
pub(super) async fn health() -> Json<Value> {
    trace!("health check requested");
    Json(json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now().to_rfc3339()
    }))
}

/// Build/version status plus a cheap liveness probe of the database.
pub(super) async fn status(State(state): State<AppState>) -> Result<Json<StatusResponse>, ApiError> {
    let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM faculty")
        .fetch_one(&state.db_pool)
        .await
        .map_err(|e| db_error("Faculty count", e.into()))?;

    Ok(Json(StatusResponse {
        version: env!("CARGO_PKG_VERSION").to_string(),
        commit: env!("GIT_COMMIT_SHORT").to_string(),
        faculty_count: count.0,
        scholar_sync_enabled: state.openalex.is_some(),
    }))
}
