//! Request orchestration that spans the cache and the database.
//!
//! [`upgrade`] sequences an item upgrade: idempotency replay, per-key lock,
//! validation, the chance draw and the atomic settlement.

pub mod upgrade;
