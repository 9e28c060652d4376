//! Handlers for the caller's `/inventory`.

use axum::extract::{Query, State};
use axum::Json;
use serde::Serialize;
use serde_json::{json, Value};
use vortex_core::error::CoreError;
use vortex_core::inventory::format_instance_id;
use vortex_core::types::DbId;
use vortex_db::models::inventory::{InventoryEntryView, QuantityChange};
use vortex_db::repositories::{GiftRepo, InventoryItemRepo, InventoryRepo};

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::query::{AddQuantityParams, GiftParams, SetQuantityParams};
use crate::state::AppState;

/// Response of `GET /inventory`.
#[derive(Debug, Serialize)]
pub struct InventoryResponse {
    pub inventory_id: DbId,
    pub items: Vec<InventoryEntryView>,
}

/// GET /api/v1/inventory
pub async fn get_mine(
    State(state): State<AppState>,
    auth: AuthUser,
) -> AppResult<Json<InventoryResponse>> {
    let inventory = InventoryRepo::get_or_create(&state.pool, auth.user_id).await?;
    let items = InventoryItemRepo::list_entries(&state.pool, inventory.id).await?;
    Ok(Json(InventoryResponse {
        inventory_id: inventory.id,
        items: items.into_iter().map(InventoryEntryView::from).collect(),
    }))
}

/// POST /api/v1/inventory/add?gift_id=&delta=
pub async fn add(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(params): Query<AddQuantityParams>,
) -> AppResult<Json<Value>> {
    if params.delta == 0 {
        return Err(AppError::BadRequest("delta cannot be zero".into()));
    }
    if params.delta < 0 {
        return Err(AppError::BadRequest(
            "Use set or removal for negative adjustments".into(),
        ));
    }
    ensure_gift(&state, params.gift_id).await?;
    let inventory = InventoryRepo::get_or_create(&state.pool, auth.user_id).await?;

    let change =
        InventoryItemRepo::add_quantity(&state.pool, inventory.id, params.gift_id, params.delta)
            .await?;
    item_body(&state, inventory.id, params.gift_id, change).await
}

/// PUT /api/v1/inventory/set?gift_id=&quantity=
pub async fn set(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(params): Query<SetQuantityParams>,
) -> AppResult<Json<Value>> {
    if params.quantity < 0 {
        return Err(AppError::BadRequest("quantity cannot be negative".into()));
    }
    ensure_gift(&state, params.gift_id).await?;
    let inventory = InventoryRepo::get_or_create(&state.pool, auth.user_id).await?;

    let change = InventoryItemRepo::set_quantity(
        &state.pool,
        inventory.id,
        params.gift_id,
        params.quantity,
    )
    .await?;
    item_body(&state, inventory.id, params.gift_id, change).await
}

/// DELETE /api/v1/inventory/remove?gift_id=
pub async fn remove(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(params): Query<GiftParams>,
) -> AppResult<Json<Value>> {
    let inventory = InventoryRepo::get_or_create(&state.pool, auth.user_id).await?;
    let deleted = InventoryItemRepo::remove(&state.pool, inventory.id, params.gift_id).await?;
    if !deleted {
        return Err(AppError::Core(CoreError::NotFound {
            entity: "InventoryItem",
            id: params.gift_id,
        }));
    }
    Ok(Json(json!({ "removed": true })))
}

async fn ensure_gift(state: &AppState, gift_id: DbId) -> AppResult<()> {
    GiftRepo::find_by_id(&state.pool, gift_id)
        .await?
        .map(|_| ())
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Gift",
            id: gift_id,
        }))
}

async fn item_body(
    state: &AppState,
    inventory_id: DbId,
    gift_id: DbId,
    change: QuantityChange,
) -> AppResult<Json<Value>> {
    match change {
        QuantityChange::Updated(quantity) => {
            let item = InventoryItemRepo::find_by_gift(&state.pool, inventory_id, gift_id)
                .await?
                .ok_or(AppError::Core(CoreError::NotFound {
                    entity: "InventoryItem",
                    id: gift_id,
                }))?;
            Ok(Json(json!({
                "instance_id": format_instance_id(item.id),
                "gift_id": gift_id,
                "quantity": quantity,
            })))
        }
        QuantityChange::Removed => Ok(Json(json!({ "removed": true }))),
        QuantityChange::Refused => Err(AppError::Core(CoreError::Conflict(
            "Quantity cannot go below zero".into(),
        ))),
    }
}
