//! Repository for the `users` table.

use sqlx::PgPool;
use vortex_core::types::DbId;

use crate::models::user::{UpsertTelegramUser, User};

const COLUMNS: &str = "id, telegram_id, username, created_at, updated_at";

pub struct UserRepo;

impl UserRepo {
    /// Insert a user for a Telegram identity, or refresh the username of the
    /// existing one. Returns the stored row.
    pub async fn upsert_telegram(
        pool: &PgPool,
        input: &UpsertTelegramUser,
    ) -> Result<User, sqlx::Error> {
        let query = format!(
            "INSERT INTO users (telegram_id, username)
             VALUES ($1, $2)
             ON CONFLICT (telegram_id) DO UPDATE
                SET username = COALESCE(EXCLUDED.username, users.username),
                    updated_at = NOW()
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, User>(&query)
            .bind(input.telegram_id)
            .bind(&input.username)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<User>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM users WHERE id = $1");
        sqlx::query_as::<_, User>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn find_by_telegram_id(
        pool: &PgPool,
        telegram_id: i64,
    ) -> Result<Option<User>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM users WHERE telegram_id = $1");
        sqlx::query_as::<_, User>(&query)
            .bind(telegram_id)
            .fetch_optional(pool)
            .await
    }
}
