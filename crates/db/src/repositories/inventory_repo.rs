//! Repository for the `inventories` table.

use sqlx::PgPool;
use vortex_core::types::DbId;

use crate::models::inventory::Inventory;

const COLUMNS: &str = "id, user_id, created_at, updated_at";

pub struct InventoryRepo;

impl InventoryRepo {
    pub async fn find_by_user(
        pool: &PgPool,
        user_id: DbId,
    ) -> Result<Option<Inventory>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM inventories WHERE user_id = $1");
        sqlx::query_as::<_, Inventory>(&query)
            .bind(user_id)
            .fetch_optional(pool)
            .await
    }

    /// The user's inventory, created on first access.
    ///
    /// Safe under concurrent first access: the unique constraint on
    /// `user_id` turns the losing insert into a no-op update.
    pub async fn get_or_create(pool: &PgPool, user_id: DbId) -> Result<Inventory, sqlx::Error> {
        let query = format!(
            "INSERT INTO inventories (user_id)
             VALUES ($1)
             ON CONFLICT ON CONSTRAINT uq_inventories_user
                DO UPDATE SET user_id = EXCLUDED.user_id
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Inventory>(&query)
            .bind(user_id)
            .fetch_one(pool)
            .await
    }
}
