//! Handler for `POST /upgrade/`.

use axum::extract::State;
use axum::http::HeaderMap;
use axum::Json;

use crate::engine::upgrade::{PgUpgradeStore, UpgradeEngine, UpgradeRequest, UpgradeResponse};
use crate::error::AppResult;
use crate::middleware::auth::AuthUser;
use crate::state::AppState;

pub const IDEMPOTENCY_HEADER: &str = "idempotency-key";

/// POST /api/v1/upgrade/
///
/// Requires an `Idempotency-Key` header. Repeating a key replays the first
/// response without touching the inventory again.
pub async fn upgrade(
    State(state): State<AppState>,
    auth: AuthUser,
    headers: HeaderMap,
    Json(input): Json<UpgradeRequest>,
) -> AppResult<Json<UpgradeResponse>> {
    let key = headers
        .get(IDEMPOTENCY_HEADER)
        .and_then(|v| v.to_str().ok());

    let engine = UpgradeEngine::new(PgUpgradeStore::new(state.pool.clone()), state.upgrade_guard());
    let response = engine.execute(auth.user_id, key, &input).await?;
    Ok(Json(response))
}
