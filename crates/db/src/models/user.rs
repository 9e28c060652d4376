//! User entity model and DTOs.

use serde::Serialize;
use sqlx::FromRow;
use vortex_core::types::{DbId, Timestamp};

/// A row from the `users` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct User {
    pub id: DbId,
    pub telegram_id: i64,
    pub username: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for upserting a user from a verified Telegram identity.
#[derive(Debug)]
pub struct UpsertTelegramUser {
    pub telegram_id: i64,
    pub username: Option<String>,
}
