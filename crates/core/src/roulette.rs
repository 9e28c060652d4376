//! Case-opening roulette generation.
//!
//! The prize is drawn by *real* weight. The 111 display slots are drawn
//! independently by *visual* weight, and the prize is then spliced into one
//! slot inside [`DROP_INDEX_MIN`]..=[`DROP_INDEX_MAX`] so the client wheel
//! always lands on the real outcome.

use rand::Rng;

use crate::sampling;

/// Number of entries in the roulette strip.
pub const ROULETTE_LEN: usize = 111;

/// Lowest slot the prize may be spliced into (inclusive).
pub const DROP_INDEX_MIN: usize = 90;

/// Highest slot the prize may be spliced into (inclusive).
pub const DROP_INDEX_MAX: usize = 100;

/// An item carrying the two independent weights used by the roulette.
pub trait Weighted {
    /// Weight driving the actual prize selection.
    fn real_weight(&self) -> f64;
    /// Weight driving the cosmetic slot population.
    fn visual_weight(&self) -> f64;
}

/// A generated roulette strip borrowing from the case's gift pool.
#[derive(Debug, Clone)]
pub struct Roulette<'a, T> {
    /// Exactly [`ROULETTE_LEN`] entries.
    pub slots: Vec<&'a T>,
    /// Position of the real prize inside `slots`.
    pub drop_index: usize,
    /// The prize selected by real weight.
    pub prize: &'a T,
}

/// Build a roulette strip from a case's gifts.
///
/// Returns `None` when `gifts` is empty; callers reject empty cases before
/// getting here.
pub fn build_roulette<'a, T, R>(gifts: &'a [T], rng: &mut R) -> Option<Roulette<'a, T>>
where
    T: Weighted,
    R: Rng + ?Sized,
{
    let prize = sampling::draw(gifts, Weighted::real_weight, rng)?;

    let visual: Vec<f64> = gifts.iter().map(Weighted::visual_weight).collect();
    let mut slots = Vec::with_capacity(ROULETTE_LEN);
    for _ in 0..ROULETTE_LEN {
        let index = sampling::weighted_index(&visual, rng)?;
        slots.push(&gifts[index]);
    }

    let drop_index = rng.random_range(DROP_INDEX_MIN..=DROP_INDEX_MAX);
    slots[drop_index] = prize;

    Some(Roulette {
        slots,
        drop_index,
        prize,
    })
}

#[cfg(test)]
mod tests {
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use super::*;

    #[derive(Debug, PartialEq)]
    struct TestGift {
        id: i64,
        real: f64,
        visual: f64,
    }

    impl Weighted for TestGift {
        fn real_weight(&self) -> f64 {
            self.real
        }
        fn visual_weight(&self) -> f64 {
            self.visual
        }
    }

    fn gift(id: i64, real: f64, visual: f64) -> TestGift {
        TestGift { id, real, visual }
    }

    #[test]
    fn empty_pool_yields_none() {
        let mut rng = StdRng::seed_from_u64(0);
        let gifts: Vec<TestGift> = Vec::new();
        assert!(build_roulette(&gifts, &mut rng).is_none());
    }

    #[test]
    fn strip_shape_holds_for_every_draw() {
        let gifts = vec![gift(1, 1.0, 5.0), gift(2, 3.0, 1.0), gift(3, 0.0, 2.0)];
        let mut rng = StdRng::seed_from_u64(99);
        for _ in 0..2_000 {
            let roulette = build_roulette(&gifts, &mut rng).expect("non-empty pool");
            assert_eq!(roulette.slots.len(), ROULETTE_LEN);
            assert!((DROP_INDEX_MIN..=DROP_INDEX_MAX).contains(&roulette.drop_index));
            assert_eq!(roulette.slots[roulette.drop_index], roulette.prize);
            assert_ne!(roulette.prize.id, 3, "zero real weight must never win");
        }
    }

    #[test]
    fn single_gift_fills_every_slot() {
        let gifts = vec![gift(7, 0.0, 0.0)];
        let mut rng = StdRng::seed_from_u64(5);
        let roulette = build_roulette(&gifts, &mut rng).expect("non-empty pool");
        assert!(roulette.slots.iter().all(|g| g.id == 7));
    }

    #[test]
    fn prize_distribution_follows_real_weights() {
        // A(real=1, visual=1), B(real=3, visual=1): A ~25%, B ~75%.
        let gifts = vec![gift(1, 1.0, 1.0), gift(2, 3.0, 1.0)];
        let mut rng = StdRng::seed_from_u64(2024);
        let opens = 10_000;
        let mut a_wins = 0;
        for _ in 0..opens {
            let roulette = build_roulette(&gifts, &mut rng).expect("non-empty pool");
            assert_eq!(roulette.slots.len(), ROULETTE_LEN);
            assert_eq!(roulette.slots[roulette.drop_index].id, roulette.prize.id);
            if roulette.prize.id == 1 {
                a_wins += 1;
            }
        }
        let share = a_wins as f64 / opens as f64;
        assert!((share - 0.25).abs() <= 0.03, "A won {share}");
    }

    #[test]
    fn display_slots_follow_visual_weights() {
        // Real weight says always B; visual weight says mostly A.
        let gifts = vec![gift(1, 0.0, 9.0), gift(2, 1.0, 1.0)];
        let mut rng = StdRng::seed_from_u64(17);
        let mut a_slots = 0usize;
        let mut counted = 0usize;
        for _ in 0..500 {
            let roulette = build_roulette(&gifts, &mut rng).expect("non-empty pool");
            assert_eq!(roulette.prize.id, 2);
            for (i, slot) in roulette.slots.iter().enumerate() {
                if i == roulette.drop_index {
                    continue;
                }
                counted += 1;
                if slot.id == 1 {
                    a_slots += 1;
                }
            }
        }
        let share = a_slots as f64 / counted as f64;
        assert!((share - 0.9).abs() < 0.02, "visual share {share}");
    }

    #[test]
    fn drop_index_covers_the_whole_range() {
        let gifts = vec![gift(1, 1.0, 1.0)];
        let mut rng = StdRng::seed_from_u64(8);
        let mut seen = [false; DROP_INDEX_MAX - DROP_INDEX_MIN + 1];
        for _ in 0..2_000 {
            let roulette = build_roulette(&gifts, &mut rng).expect("non-empty pool");
            seen[roulette.drop_index - DROP_INDEX_MIN] = true;
        }
        assert!(seen.iter().all(|s| *s));
    }
}
