//! Repository for the `cases` and `case_gifts` tables.

use sqlx::PgPool;
use vortex_core::types::DbId;

use crate::models::case::{Case, CreateCase};
use crate::models::gift::Gift;

const COLUMNS: &str = "id, name, img, price, created_at, updated_at";

pub struct CaseRepo;

impl CaseRepo {
    pub async fn create(pool: &PgPool, input: &CreateCase) -> Result<Case, sqlx::Error> {
        let query = format!(
            "INSERT INTO cases (name, img, price)
             VALUES ($1, $2, $3)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Case>(&query)
            .bind(&input.name)
            .bind(&input.img)
            .bind(input.price)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Case>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM cases WHERE id = $1");
        sqlx::query_as::<_, Case>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// A page of cases, ordered by id.
    pub async fn list(pool: &PgPool, limit: i64, offset: i64) -> Result<Vec<Case>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM cases ORDER BY id LIMIT $1 OFFSET $2");
        sqlx::query_as::<_, Case>(&query)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    /// Gifts attached to a case, ordered by gift id.
    ///
    /// The order is the sampler's tie-break order, so it must stay stable.
    pub async fn gifts_for_case(pool: &PgPool, case_id: DbId) -> Result<Vec<Gift>, sqlx::Error> {
        let query = format!(
            "SELECT {cols} FROM gifts g
             JOIN case_gifts cg ON cg.gift_id = g.id
             WHERE cg.case_id = $1
             ORDER BY g.id",
            cols = prefixed_gift_columns(),
        );
        sqlx::query_as::<_, Gift>(&query)
            .bind(case_id)
            .fetch_all(pool)
            .await
    }

    /// Attach gifts to a case. Already-attached gifts are ignored.
    pub async fn add_gifts(
        pool: &PgPool,
        case_id: DbId,
        gift_ids: &[DbId],
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            "INSERT INTO case_gifts (case_id, gift_id)
             SELECT $1, UNNEST($2::BIGINT[])
             ON CONFLICT DO NOTHING",
        )
        .bind(case_id)
        .bind(gift_ids)
        .execute(pool)
        .await?;
        Ok(result.rows_affected())
    }
}

fn prefixed_gift_columns() -> String {
    crate::repositories::gift_repo::COLUMNS
        .split(',')
        .map(|c| format!("g.{}", c.trim()))
        .collect::<Vec<_>>()
        .join(", ")
}
