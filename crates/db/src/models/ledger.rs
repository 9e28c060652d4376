//! Ledger (transaction) entity model and DTOs.

use serde::Serialize;
use sqlx::FromRow;
use uuid::Uuid;
use vortex_core::types::{DbId, Timestamp};

/// A row from the `transactions` table. Append-only.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct LedgerEntry {
    pub id: DbId,
    pub user_id: DbId,
    pub reference: Uuid,
    pub amount: f64,
    #[sqlx(rename = "type")]
    #[serde(rename = "type")]
    pub entry_type: String,
    pub description: Option<String>,
    pub status: String,
    pub created_at: Timestamp,
}

/// DTO for appending a ledger entry.
#[derive(Debug, Clone)]
pub struct CreateLedgerEntry {
    pub user_id: DbId,
    pub reference: Uuid,
    pub amount: f64,
    pub entry_type: String,
    pub description: Option<String>,
    pub status: String,
}
