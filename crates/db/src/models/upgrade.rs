//! Inputs and outputs of an upgrade settlement.

use vortex_core::types::DbId;

use crate::models::ledger::{CreateLedgerEntry, LedgerEntry};

/// Everything the store needs to apply a drawn upgrade outcome.
#[derive(Debug, Clone)]
pub struct UpgradeSettlement {
    pub inventory_id: DbId,
    pub source_item_id: DbId,
    pub target_gift_id: DbId,
    pub success: bool,
    pub ledger: CreateLedgerEntry,
}

/// Result of a committed settlement.
#[derive(Debug, Clone)]
pub struct SettledUpgrade {
    pub ledger: LedgerEntry,
    /// Quantity left on the source row; `0` means the row was deleted.
    pub source_remaining: i32,
    /// The credited target row, on success only.
    pub target_item_id: Option<DbId>,
}
