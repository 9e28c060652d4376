//! Inventory and inventory item models.

use serde::Serialize;
use sqlx::FromRow;
use vortex_core::inventory::format_instance_id;
use vortex_core::types::{DbId, Timestamp};

/// A row from the `inventories` table. One per user.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Inventory {
    pub id: DbId,
    pub user_id: DbId,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// A row from the `inventory_items` table.
#[derive(Debug, Clone, FromRow)]
pub struct InventoryItem {
    pub id: DbId,
    pub inventory_id: DbId,
    pub gift_id: DbId,
    pub quantity: i32,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Inventory item joined with its gift for listing.
#[derive(Debug, Clone, FromRow)]
pub struct InventoryEntry {
    pub id: DbId,
    pub gift_id: DbId,
    pub quantity: i32,
    pub name: String,
    pub img: Option<String>,
    pub rarity_color: String,
    pub price: f64,
}

/// Public inventory line.
#[derive(Debug, Clone, Serialize)]
pub struct InventoryEntryView {
    pub instance_id: String,
    pub gift_id: DbId,
    pub name: String,
    pub img: Option<String>,
    pub rarity_color: String,
    pub price: f64,
    pub quantity: i32,
}

impl From<InventoryEntry> for InventoryEntryView {
    fn from(entry: InventoryEntry) -> Self {
        Self {
            instance_id: format_instance_id(entry.id),
            gift_id: entry.gift_id,
            name: entry.name,
            img: entry.img,
            rarity_color: entry.rarity_color,
            price: entry.price,
            quantity: entry.quantity,
        }
    }
}

/// Outcome of an atomic quantity adjustment.
#[derive(Debug, Clone, PartialEq)]
pub enum QuantityChange {
    /// The row now holds the returned quantity.
    Updated(i32),
    /// The adjustment reached zero and the row was deleted.
    Removed,
    /// The adjustment would have gone negative; nothing changed.
    Refused,
}
