//! Repository for the `transactions` ledger. Append-only.

use sqlx::{PgConnection, PgPool};
use vortex_core::types::DbId;

use crate::models::ledger::{CreateLedgerEntry, LedgerEntry};

const COLUMNS: &str = "id, user_id, reference, amount, type, description, status, created_at";

pub struct LedgerRepo;

impl LedgerRepo {
    pub async fn append(
        pool: &PgPool,
        input: &CreateLedgerEntry,
    ) -> Result<LedgerEntry, sqlx::Error> {
        let mut conn = pool.acquire().await?;
        Self::append_with(&mut *conn, input).await
    }

    /// Append inside a caller-owned connection or transaction.
    pub async fn append_with(
        conn: &mut PgConnection,
        input: &CreateLedgerEntry,
    ) -> Result<LedgerEntry, sqlx::Error> {
        let query = format!(
            "INSERT INTO transactions (user_id, reference, amount, type, description, status)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, LedgerEntry>(&query)
            .bind(input.user_id)
            .bind(input.reference)
            .bind(input.amount)
            .bind(&input.entry_type)
            .bind(&input.description)
            .bind(&input.status)
            .fetch_one(conn)
            .await
    }

    /// Entries for one user, newest first.
    pub async fn list_for_user(
        pool: &PgPool,
        user_id: DbId,
    ) -> Result<Vec<LedgerEntry>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM transactions WHERE user_id = $1 ORDER BY created_at DESC, id DESC"
        );
        sqlx::query_as::<_, LedgerEntry>(&query)
            .bind(user_id)
            .fetch_all(pool)
            .await
    }
}
