//! Domain logic for the gift-case backend.
//!
//! Everything here is free of database and HTTP concerns. The pure
//! probability engine ([`sampling`], [`roulette`], [`upgrade`]) never
//! performs I/O; the capability traits in [`cache`] are implemented by the
//! outer crates.

pub mod cache;
pub mod error;
pub mod fairness;
pub mod idempotency;
pub mod inventory;
pub mod roulette;
pub mod sampling;
pub mod telegram;
pub mod types;
pub mod upgrade;
