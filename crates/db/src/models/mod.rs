//! Row structs and DTOs.
//!
//! Each submodule contains a `FromRow` entity matching the table row, and
//! where the API exposes it, a `Serialize` projection safe for responses.

pub mod case;
pub mod gift;
pub mod inventory;
pub mod ledger;
pub mod upgrade;
pub mod user;
