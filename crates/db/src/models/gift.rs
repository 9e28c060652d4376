//! Gift entity model and DTOs.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use vortex_core::roulette::Weighted;
use vortex_core::types::{DbId, Timestamp};

/// Allowed values of `gifts.rarity_color`.
pub const RARITY_COLORS: &[&str] = &["rare", "legendary", "ultra"];

/// Full gift row from the `gifts` table.
///
/// Carries the two internal weights -- NEVER serialize this to API
/// responses directly. Use [`GiftView`] for external-facing output.
#[derive(Debug, Clone, FromRow)]
pub struct Gift {
    pub id: DbId,
    pub name: String,
    pub img: Option<String>,
    pub real_rarity: f64,
    pub visual_rarity: f64,
    pub rarity_color: String,
    pub price: f64,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Weighted for Gift {
    fn real_weight(&self) -> f64 {
        self.real_rarity
    }

    fn visual_weight(&self) -> f64 {
        self.visual_rarity
    }
}

/// Public gift representation (no weights).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GiftView {
    pub id: DbId,
    pub name: String,
    pub img: Option<String>,
    pub rarity_color: String,
    pub price: f64,
}

impl From<&Gift> for GiftView {
    fn from(gift: &Gift) -> Self {
        Self {
            id: gift.id,
            name: gift.name.clone(),
            img: gift.img.clone(),
            rarity_color: gift.rarity_color.clone(),
            price: gift.price,
        }
    }
}

/// DTO for creating a gift. Used by seeding and tests.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateGift {
    pub name: String,
    pub img: Option<String>,
    pub real_rarity: f64,
    pub visual_rarity: f64,
    /// Defaults to `"rare"` if omitted.
    pub rarity_color: Option<String>,
    pub price: f64,
}
