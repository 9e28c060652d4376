use axum::extract::State;
use axum::{routing::get, Json, Router};
use serde::Serialize;

use crate::state::AppState;

/// Health check response payload.
#[derive(Serialize)]
pub struct HealthResponse {
    /// Overall service status.
    pub status: &'static str,
    /// Crate version from Cargo.toml.
    pub version: &'static str,
    /// Whether the database is reachable.
    pub db_healthy: bool,
    /// Whether the cache holds a live connection. A down cache degrades
    /// idempotency but does not fail requests.
    pub cache_connected: bool,
}

/// GET /health -- returns service, database and cache health.
async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let db_healthy = vortex_db::health_check(&state.pool).await.is_ok();
    let cache_connected = state.cache.is_connected();

    let status = if db_healthy && cache_connected {
        "ok"
    } else {
        "degraded"
    };

    Json(HealthResponse {
        status,
        version: env!("CARGO_PKG_VERSION"),
        db_healthy,
        cache_connected,
    })
}

/// Mount health check routes.
pub fn router() -> Router<AppState> {
    Router::new().route("/health", get(health_check))
}
