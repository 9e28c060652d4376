//! Case entity model and DTOs.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use vortex_core::types::{DbId, Timestamp};

use crate::models::gift::GiftView;

/// A row from the `cases` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Case {
    pub id: DbId,
    pub name: String,
    pub img: Option<String>,
    pub price: f64,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// A case together with the public projection of its gifts.
#[derive(Debug, Clone, Serialize)]
pub struct CaseWithGifts {
    #[serde(flatten)]
    pub case: Case,
    pub gifts: Vec<GiftView>,
}

/// DTO for creating a case. Used by seeding and tests.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateCase {
    pub name: String,
    pub img: Option<String>,
    pub price: f64,
}
