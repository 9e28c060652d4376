//! Atomic application of an upgrade outcome.

use sqlx::PgPool;
use vortex_core::types::DbId;

use crate::models::upgrade::{SettledUpgrade, UpgradeSettlement};
use crate::repositories::LedgerRepo;

pub struct UpgradeRepo;

impl UpgradeRepo {
    /// Consume one unit of the source item, append the ledger entry and, on
    /// success, credit one unit of the target gift -- all in one transaction.
    ///
    /// The source decrement is conditional on the row still holding a unit,
    /// so two settlements racing for the last unit cannot both commit.
    /// Returns `None` (and rolls back) when the source unit is already gone.
    pub async fn settle(
        pool: &PgPool,
        input: &UpgradeSettlement,
    ) -> Result<Option<SettledUpgrade>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let decremented: Option<i32> = sqlx::query_scalar(
            "UPDATE inventory_items
             SET quantity = quantity - 1, updated_at = NOW()
             WHERE id = $1 AND inventory_id = $2 AND quantity > 1
             RETURNING quantity",
        )
        .bind(input.source_item_id)
        .bind(input.inventory_id)
        .fetch_optional(&mut *tx)
        .await?;

        let source_remaining = match decremented {
            Some(quantity) => quantity,
            None => {
                let deleted = sqlx::query(
                    "DELETE FROM inventory_items
                     WHERE id = $1 AND inventory_id = $2 AND quantity = 1",
                )
                .bind(input.source_item_id)
                .bind(input.inventory_id)
                .execute(&mut *tx)
                .await?;
                if deleted.rows_affected() == 0 {
                    tracing::debug!(
                        source_item_id = input.source_item_id,
                        "Upgrade source no longer holds a unit"
                    );
                    tx.rollback().await?;
                    return Ok(None);
                }
                0
            }
        };

        let ledger = LedgerRepo::append_with(&mut *tx, &input.ledger).await?;

        let target_item_id = if input.success {
            let id: DbId = sqlx::query_scalar(
                "INSERT INTO inventory_items (inventory_id, gift_id, quantity)
                 VALUES ($1, $2, 1)
                 ON CONFLICT ON CONSTRAINT uq_inventory_items_inventory_gift
                    DO UPDATE SET quantity = inventory_items.quantity + 1, updated_at = NOW()
                 RETURNING id",
            )
            .bind(input.inventory_id)
            .bind(input.target_gift_id)
            .fetch_one(&mut *tx)
            .await?;
            Some(id)
        } else {
            None
        };

        tx.commit().await?;

        Ok(Some(SettledUpgrade {
            ledger,
            source_remaining,
            target_item_id,
        }))
    }
}
