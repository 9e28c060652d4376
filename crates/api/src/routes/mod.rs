pub mod auth;
pub mod cases;
pub mod health;
pub mod inventory;
pub mod upgrade;

use axum::routing::get;
use axum::Router;

use crate::handlers;
use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /health                          health (also at root)
///
/// /auth/telegram                   Telegram sign-in (public)
/// /me                              current user (auth required)
///
/// /cases                           list (public)
/// /cases/{id}                      get with gifts (public)
/// /cases/{id}/open-case            open (POST, public)
///
/// /inventory                       current user's items (auth required)
/// /inventory/add                   add quantity (POST)
/// /inventory/set                   set quantity (PUT)
/// /inventory/remove                remove item (DELETE)
///
/// /upgrade/                        upgrade an item (POST, Idempotency-Key)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .merge(health::router())
        .nest("/auth", auth::router())
        .route("/me", get(handlers::auth::me))
        .nest("/cases", cases::router())
        .nest("/inventory", inventory::router())
        .merge(upgrade::router())
}
