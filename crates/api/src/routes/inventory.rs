//! Route definitions for the `/inventory` resource.

use axum::routing::{delete, get, post, put};
use axum::Router;

use crate::handlers::inventory;
use crate::state::AppState;

/// Routes mounted at `/inventory`.
///
/// ```text
/// GET    /         -> get_mine
/// POST   /add      -> add
/// PUT    /set      -> set
/// DELETE /remove   -> remove
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(inventory::get_mine))
        .route("/add", post(inventory::add))
        .route("/set", put(inventory::set))
        .route("/remove", delete(inventory::remove))
}
