//! Repository for the `gifts` table.

use sqlx::PgPool;
use vortex_core::types::DbId;

use crate::models::gift::{CreateGift, Gift};

pub(crate) const COLUMNS: &str = "id, name, img, real_rarity, visual_rarity, rarity_color, \
                                  price, created_at, updated_at";

pub struct GiftRepo;

impl GiftRepo {
    pub async fn create(pool: &PgPool, input: &CreateGift) -> Result<Gift, sqlx::Error> {
        let query = format!(
            "INSERT INTO gifts (name, img, real_rarity, visual_rarity, rarity_color, price)
             VALUES ($1, $2, $3, $4, COALESCE($5, 'rare'), $6)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Gift>(&query)
            .bind(&input.name)
            .bind(&input.img)
            .bind(input.real_rarity)
            .bind(input.visual_rarity)
            .bind(&input.rarity_color)
            .bind(input.price)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Gift>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM gifts WHERE id = $1");
        sqlx::query_as::<_, Gift>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// All gifts, ordered by id.
    pub async fn list(pool: &PgPool) -> Result<Vec<Gift>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM gifts ORDER BY id");
        sqlx::query_as::<_, Gift>(&query).fetch_all(pool).await
    }
}
