//! Repository for the `inventory_items` table.
//!
//! Quantities are adjusted with single conditional statements so a row can
//! never be driven below zero by concurrent requests.

use sqlx::PgPool;
use vortex_core::types::DbId;

use crate::models::inventory::{InventoryEntry, InventoryItem, QuantityChange};

const COLUMNS: &str = "id, inventory_id, gift_id, quantity, created_at, updated_at";

pub struct InventoryItemRepo;

impl InventoryItemRepo {
    /// Find an item by id, scoped to one inventory.
    pub async fn find_in_inventory(
        pool: &PgPool,
        inventory_id: DbId,
        item_id: DbId,
    ) -> Result<Option<InventoryItem>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM inventory_items WHERE id = $1 AND inventory_id = $2"
        );
        sqlx::query_as::<_, InventoryItem>(&query)
            .bind(item_id)
            .bind(inventory_id)
            .fetch_optional(pool)
            .await
    }

    pub async fn find_by_gift(
        pool: &PgPool,
        inventory_id: DbId,
        gift_id: DbId,
    ) -> Result<Option<InventoryItem>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM inventory_items WHERE inventory_id = $1 AND gift_id = $2"
        );
        sqlx::query_as::<_, InventoryItem>(&query)
            .bind(inventory_id)
            .bind(gift_id)
            .fetch_optional(pool)
            .await
    }

    /// Items of one inventory joined with their gifts, ordered by item id.
    pub async fn list_entries(
        pool: &PgPool,
        inventory_id: DbId,
    ) -> Result<Vec<InventoryEntry>, sqlx::Error> {
        sqlx::query_as::<_, InventoryEntry>(
            "SELECT ii.id, ii.gift_id, ii.quantity, g.name, g.img, g.rarity_color, g.price
             FROM inventory_items ii
             JOIN gifts g ON g.id = ii.gift_id
             WHERE ii.inventory_id = $1
             ORDER BY ii.id",
        )
        .bind(inventory_id)
        .fetch_all(pool)
        .await
    }

    /// Add `delta` (which may be negative) to the `(inventory, gift)` row.
    ///
    /// A positive delta creates the row if missing. A negative delta that
    /// would go below zero is refused; one that lands on zero deletes the
    /// row.
    pub async fn add_quantity(
        pool: &PgPool,
        inventory_id: DbId,
        gift_id: DbId,
        delta: i32,
    ) -> Result<QuantityChange, sqlx::Error> {
        if delta > 0 {
            let quantity: i32 = sqlx::query_scalar(
                "INSERT INTO inventory_items (inventory_id, gift_id, quantity)
                 VALUES ($1, $2, $3)
                 ON CONFLICT ON CONSTRAINT uq_inventory_items_inventory_gift
                    DO UPDATE SET quantity = inventory_items.quantity + EXCLUDED.quantity,
                                  updated_at = NOW()
                 RETURNING quantity",
            )
            .bind(inventory_id)
            .bind(gift_id)
            .bind(delta)
            .fetch_one(pool)
            .await?;
            return Ok(QuantityChange::Updated(quantity));
        }
        if delta == 0 {
            return Ok(
                match Self::find_by_gift(pool, inventory_id, gift_id).await? {
                    Some(item) => QuantityChange::Updated(item.quantity),
                    None => QuantityChange::Refused,
                },
            );
        }

        let remove = -delta;
        let updated: Option<i32> = sqlx::query_scalar(
            "UPDATE inventory_items
             SET quantity = quantity - $3, updated_at = NOW()
             WHERE inventory_id = $1 AND gift_id = $2 AND quantity > $3
             RETURNING quantity",
        )
        .bind(inventory_id)
        .bind(gift_id)
        .bind(remove)
        .fetch_optional(pool)
        .await?;
        if let Some(quantity) = updated {
            return Ok(QuantityChange::Updated(quantity));
        }

        let deleted = sqlx::query(
            "DELETE FROM inventory_items
             WHERE inventory_id = $1 AND gift_id = $2 AND quantity = $3",
        )
        .bind(inventory_id)
        .bind(gift_id)
        .bind(remove)
        .execute(pool)
        .await?;
        if deleted.rows_affected() > 0 {
            Ok(QuantityChange::Removed)
        } else {
            Ok(QuantityChange::Refused)
        }
    }

    /// Set the quantity of the `(inventory, gift)` row. Zero deletes it.
    pub async fn set_quantity(
        pool: &PgPool,
        inventory_id: DbId,
        gift_id: DbId,
        quantity: i32,
    ) -> Result<QuantityChange, sqlx::Error> {
        if quantity <= 0 {
            Self::remove(pool, inventory_id, gift_id).await?;
            return Ok(QuantityChange::Removed);
        }
        let stored: i32 = sqlx::query_scalar(
            "INSERT INTO inventory_items (inventory_id, gift_id, quantity)
             VALUES ($1, $2, $3)
             ON CONFLICT ON CONSTRAINT uq_inventory_items_inventory_gift
                DO UPDATE SET quantity = EXCLUDED.quantity, updated_at = NOW()
             RETURNING quantity",
        )
        .bind(inventory_id)
        .bind(gift_id)
        .bind(quantity)
        .fetch_one(pool)
        .await?;
        Ok(QuantityChange::Updated(stored))
    }

    /// Delete the `(inventory, gift)` row. Returns `true` if a row existed.
    pub async fn remove(
        pool: &PgPool,
        inventory_id: DbId,
        gift_id: DbId,
    ) -> Result<bool, sqlx::Error> {
        let result =
            sqlx::query("DELETE FROM inventory_items WHERE inventory_id = $1 AND gift_id = $2")
                .bind(inventory_id)
                .bind(gift_id)
                .execute(pool)
                .await?;
        Ok(result.rows_affected() > 0)
    }
}
