use rand::distributions::{Distribution, WeightedIndex};
use rand::seq::SliceRandom;
use rand::Rng;

use super::domain::Weighted;

/// Draws up to `k` distinct items, each round picking from the remaining pool
/// with probability proportional to weight and then removing the pick.
///
/// When the pool holds no more than `k` items every item is returned in a
/// shuffled order. A round whose weights cannot form a distribution (all zero,
/// negative, NaN, or an overflowing sum) falls back to a uniform pick, so the
/// result always has exactly `min(k, pool.len())` elements.
pub fn sample_unique<T, R>(pool: &[T], k: usize, rng: &mut R) -> Vec<T>
where
    T: Weighted + Clone,
    R: Rng + ?Sized,
{
    if pool.is_empty() || k == 0 {
        return Vec::new();
    }

    let mut remaining: Vec<T> = pool.to_vec();

    if remaining.len() <= k {
        remaining.shuffle(rng);
        return remaining;
    }

    let mut picked = Vec::with_capacity(k);
    for _ in 0..k {
        let index = weighted_index(&remaining, rng)
            .unwrap_or_else(|| rng.gen_range(0..remaining.len()));
        picked.push(remaining.remove(index));
    }

    picked
}

fn weighted_index<T, R>(pool: &[T], rng: &mut R) -> Option<usize>
where
    T: Weighted,
    R: Rng + ?Sized,
{
    let weights: Vec<f64> = pool
        .iter()
        .map(|item| {
            let weight = item.weight();
            if weight.is_finite() && weight > 0.0 {
                weight
            } else {
                0.0
            }
        })
        .collect();

    let total: f64 = weights.iter().sum();
    if !total.is_finite() || total <= 0.0 {
        return None;
    }

    WeightedIndex::new(&weights)
        .ok()
        .map(|distribution| distribution.sample(rng))
}
