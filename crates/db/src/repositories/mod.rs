//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async methods that
//! accept `&PgPool` as the first argument.

pub mod case_repo;
pub mod gift_repo;
pub mod inventory_item_repo;
pub mod inventory_repo;
pub mod ledger_repo;
pub mod upgrade_repo;
pub mod user_repo;

pub use case_repo::CaseRepo;
pub use gift_repo::GiftRepo;
pub use inventory_item_repo::InventoryItemRepo;
pub use inventory_repo::InventoryRepo;
pub use ledger_repo::LedgerRepo;
pub use upgrade_repo::UpgradeRepo;
pub use user_repo::UserRepo;
