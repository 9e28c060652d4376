//! Weighted random selection.
//!
//! Tie-break policy: a uniform value `r` in `[0, total)` is compared against
//! the running cumulative weight in input order, and the first item whose
//! cumulative weight is `>= r` wins. The result therefore depends on the
//! order of the input, which keeps seeded draws reproducible.

use rand::Rng;

/// Normalize a raw weight: negative, NaN and infinite weights count as zero.
pub fn effective_weight(raw: f64) -> f64 {
    if raw.is_finite() && raw > 0.0 {
        raw
    } else {
        0.0
    }
}

/// Draw an index from `weights` proportionally to each weight.
///
/// When no weight is positive the draw falls back to a uniform choice over
/// all indices. Returns `None` only for an empty slice.
pub fn weighted_index<R: Rng + ?Sized>(weights: &[f64], rng: &mut R) -> Option<usize> {
    if weights.is_empty() {
        return None;
    }

    let total: f64 = weights.iter().copied().map(effective_weight).sum();
    if total <= 0.0 {
        return Some(rng.random_range(0..weights.len()));
    }

    let r = rng.random::<f64>() * total;
    let mut cumulative = 0.0;
    let mut last_positive = 0;
    for (index, raw) in weights.iter().copied().enumerate() {
        let weight = effective_weight(raw);
        if weight == 0.0 {
            continue;
        }
        cumulative += weight;
        last_positive = index;
        if cumulative >= r {
            return Some(index);
        }
    }

    // Float accumulation can leave the final cumulative a hair below `r`.
    Some(last_positive)
}

/// Draw one item from `items`, weighting each by `weight`.
///
/// See [`weighted_index`] for the fallback and tie-break rules.
pub fn draw<'a, T, R, F>(items: &'a [T], weight: F, rng: &mut R) -> Option<&'a T>
where
    R: Rng + ?Sized,
    F: Fn(&T) -> f64,
{
    let weights: Vec<f64> = items.iter().map(weight).collect();
    weighted_index(&weights, rng).map(|index| &items[index])
}
