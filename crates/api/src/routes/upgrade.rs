//! Route definitions for the `/upgrade` resource.

use axum::routing::post;
use axum::Router;

use crate::handlers::upgrade;
use crate::state::AppState;

/// Upgrade routes, merged at the API root.
///
/// Both spellings are mounted because clients post to `/upgrade/` and a
/// nested root route would only match `/upgrade`.
///
/// ```text
/// POST /upgrade    -> upgrade
/// POST /upgrade/   -> upgrade
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/upgrade", post(upgrade::upgrade))
        .route("/upgrade/", post(upgrade::upgrade))
}
