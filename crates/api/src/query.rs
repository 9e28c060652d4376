//! Shared query parameter types for API handlers.

use serde::Deserialize;
use vortex_core::types::DbId;

/// Default page size for list endpoints.
pub const DEFAULT_LIMIT: i64 = 100;

/// Largest page a client may request.
pub const MAX_LIMIT: i64 = 100;

/// Generic pagination parameters (`?limit=&offset=`).
///
/// `skip` is accepted as an alias of `offset`.
#[derive(Debug, Default, Deserialize)]
pub struct PaginationParams {
    pub limit: Option<i64>,
    #[serde(alias = "skip")]
    pub offset: Option<i64>,
}

impl PaginationParams {
    /// Limit clamped to `1..=MAX_LIMIT`.
    pub fn limit(&self) -> i64 {
        self.limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT)
    }

    /// Offset clamped to non-negative.
    pub fn offset(&self) -> i64 {
        self.offset.unwrap_or(0).max(0)
    }
}

/// `?gift_id=&delta=` for `POST /inventory/add`.
#[derive(Debug, Deserialize)]
pub struct AddQuantityParams {
    pub gift_id: DbId,
    #[serde(default = "default_delta")]
    pub delta: i32,
}

fn default_delta() -> i32 {
    1
}

/// `?gift_id=&quantity=` for `PUT /inventory/set`.
#[derive(Debug, Deserialize)]
pub struct SetQuantityParams {
    pub gift_id: DbId,
    pub quantity: i32,
}

/// `?gift_id=` for `DELETE /inventory/remove`.
#[derive(Debug, Deserialize)]
pub struct GiftParams {
    pub gift_id: DbId,
}
