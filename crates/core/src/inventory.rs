//! Inventory instance identifiers and ledger vocabulary.

use crate::error::CoreError;
use crate::types::DbId;

/// Prefix of the public identifier of an inventory row.
pub const INSTANCE_ID_PREFIX: &str = "inv_";

/// Ledger type tag for upgrade attempts.
pub const LEDGER_TYPE_UPGRADE: &str = "upgrade";

/// Ledger status for settled entries.
pub const LEDGER_STATUS_COMPLETED: &str = "completed";

/// Public identifier for an inventory row, e.g. `inv_42`.
pub fn format_instance_id(item_id: DbId) -> String {
    format!("{INSTANCE_ID_PREFIX}{item_id}")
}

/// Parse a public instance identifier back into the inventory row id.
pub fn parse_instance_id(instance_id: &str) -> Result<DbId, CoreError> {
    instance_id
        .strip_prefix(INSTANCE_ID_PREFIX)
        .and_then(|rest| rest.parse::<DbId>().ok())
        .filter(|id| *id > 0)
        .ok_or_else(|| CoreError::Validation("Invalid sourceInstanceId format".into()))
}

/// Ledger description for an upgrade attempt.
pub fn upgrade_description(source_name: &str, target_name: &str, success: bool) -> String {
    let outcome = if success { "success" } else { "failure" };
    format!("Upgrade {source_name} -> {target_name} ({outcome})")
}
