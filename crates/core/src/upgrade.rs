//! Upgrade wheel: chance resolution and display outcome generation.
//!
//! The success flag is drawn first; the wheel angle is then generated inside
//! the zone matching that flag. The win zone is 25% of the wheel, split
//! symmetrically around 0 degrees.

use rand::Rng;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Chance
// ---------------------------------------------------------------------------

/// Chance (percent) when the target is worth no more than the source.
pub const MAX_CHANCE: f64 = 80.0;

/// Lower bound of the chance (percent) when trading up.
pub const MIN_CHANCE: f64 = 10.0;

/// Success chance in percent for upgrading `source_value` into `target_value`.
///
/// Trading down or sideways always yields [`MAX_CHANCE`]. Trading up yields
/// the value ratio as a percentage, clamped to `[MIN_CHANCE, MAX_CHANCE]` and
/// rounded to one decimal place.
pub fn upgrade_chance(source_value: f64, target_value: f64) -> f64 {
    if target_value <= source_value {
        return MAX_CHANCE;
    }
    let ratio = source_value / target_value;
    let chance = (ratio * 100.0).clamp(MIN_CHANCE, MAX_CHANCE);
    (chance * 10.0).round() / 10.0
}

// ---------------------------------------------------------------------------
// Wheel geometry
// ---------------------------------------------------------------------------

/// Upper bound (exclusive) of the low win arc, in degrees.
pub const WIN_LOW_END: f64 = 45.0;

/// Lower bound (inclusive) of the high win arc, in degrees.
pub const WIN_HIGH_START: f64 = 315.0;

/// Full turn, in degrees.
pub const FULL_TURN: f64 = 360.0;

/// Largest two-decimal angles still inside each zone.
const WIN_LOW_LAST: f64 = 44.99;
const WIN_HIGH_LAST: f64 = 359.99;
const LOSE_FIRST: f64 = 45.01;
const LOSE_LAST: f64 = 314.99;

/// Minimum number of full cosmetic rotations.
pub const MIN_ROTATION_SPINS: u32 = 3;

/// Maximum number of full cosmetic rotations.
pub const MAX_ROTATION_SPINS: u32 = 6;

/// Whether `angle` lies in the win zone `[0, 45) ∪ [315, 360)`.
pub fn is_win_angle(angle: f64) -> bool {
    (0.0..WIN_LOW_END).contains(&angle) || (WIN_HIGH_START..FULL_TURN).contains(&angle)
}

/// Result of one wheel spin as shown to the client.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WheelOutcome {
    pub success: bool,
    /// Stop angle in degrees, two decimals.
    pub final_angle: f64,
    /// Cosmetic full rotations before stopping.
    pub rotation_spins: u32,
}

/// Spin the wheel for a given `chance` (percent).
///
/// `success` is a Bernoulli draw with probability `chance / 100`; the angle
/// is always inside the zone that agrees with it, including after rounding.
pub fn generate_wheel_outcome<R: Rng + ?Sized>(chance: f64, rng: &mut R) -> WheelOutcome {
    let success = rng.random::<f64>() * 100.0 < chance;
    let rotation_spins = rng.random_range(MIN_ROTATION_SPINS..=MAX_ROTATION_SPINS);

    let final_angle = if success {
        if rng.random_bool(0.5) {
            round_angle(rng.random_range(0.0..WIN_LOW_END)).min(WIN_LOW_LAST)
        } else {
            round_angle(rng.random_range(WIN_HIGH_START..FULL_TURN))
                .clamp(WIN_HIGH_START, WIN_HIGH_LAST)
        }
    } else {
        round_angle(rng.random_range(WIN_LOW_END..WIN_HIGH_START))
            .clamp(LOSE_FIRST, LOSE_LAST)
    };

    WheelOutcome {
        success,
        final_angle,
        rotation_spins,
    }
}

fn round_angle(angle: f64) -> f64 {
    (angle * 100.0).round() / 100.0
}
