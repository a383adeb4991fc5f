use axum::{extract::State, http::StatusCode, Json};
use chrono::Utc;
use serde_json::{json, Value};
use tracing::error;

use crate::state::AppState;

/// GET /health
/// Returns service version and database reachability. 503 when the database
/// does not answer.
pub async fn health_handler(State(state): State<AppState>) -> (StatusCode, Json<Value>) {
    let timestamp = Utc::now().to_rfc3339();
    match sqlx::query("SELECT 1").execute(&state.db).await {
        Ok(_) => (
            StatusCode::OK,
            Json(json!({
                "status": "ok",
                "version": env!("CARGO_PKG_VERSION"),
                "service": "lumen-api",
                "database": "connected",
                "timestamp": timestamp
            })),
        ),
        Err(e) => {
            error!("Health check database probe failed: {e}");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({
                    "status": "error",
                    "version": env!("CARGO_PKG_VERSION"),
                    "service": "lumen-api",
                    "database": "disconnected",
                    "timestamp": timestamp
                })),
            )
        }
    }
}
