//! Zero-sum initial distributions.
//!
//! Heights are drawn in `(+v, -v)` pairs so the surface starts with no net
//! displacement, then optionally shuffled so the two halves of a pair are not
//! spatially correlated.

use crate::prng::Xorshift64;
use glam::DVec2;

/// `count` values in `(+v, -v)` pairs with `v` drawn from `[0, intensity)`.
///
/// When `count` is odd the unpaired last slot is exactly `0.0`, so the total
/// is zero for every count. Shuffling (Fisher–Yates) happens after pairing.
pub fn zero_sum_heights(
    count: usize,
    intensity: f64,
    shuffle: bool,
    rng: &mut Xorshift64,
) -> Vec<f64> {
    let mut values = vec![0.0; count];
    for pair in values.chunks_exact_mut(2) {
        let v = rng.next_range(0.0, intensity);
        pair[0] = v;
        pair[1] = -v;
    }
    if shuffle {
        rng.shuffle(&mut values);
    }
    values
}

/// `count` vectors in `(+v, -v)` pairs with random direction and magnitude
/// drawn from `[0, intensity)`; same pairing and shuffling as
/// [`zero_sum_heights`].
pub fn zero_sum_vectors(
    count: usize,
    intensity: f64,
    shuffle: bool,
    rng: &mut Xorshift64,
) -> Vec<DVec2> {
    let mut values = vec![DVec2::ZERO; count];
    for pair in values.chunks_exact_mut(2) {
        let angle = rng.next_range(0.0, std::f64::consts::TAU);
        let v = DVec2::from_angle(angle) * rng.next_range(0.0, intensity);
        pair[0] = v;
        pair[1] = -v;
    }
    if shuffle {
        rng.shuffle(&mut values);
    }
    values
}
