//! Route definitions for the `/cases` resource.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::cases;
use crate::state::AppState;

/// Routes mounted at `/cases`.
///
/// ```text
/// GET  /                 -> list
/// GET  /{id}             -> get_by_id
/// POST /{id}/open-case   -> open_case
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(cases::list))
        .route("/{id}", get(cases::get_by_id))
        .route("/{id}/open-case", post(cases::open_case))
}
