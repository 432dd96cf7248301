//! Seeded Fisher-Yates shuffle.
//!
//! The generator is a plain linear congruential generator with the classic
//! 233280/9301/49297 constants. It is not meant to be unpredictable; it makes
//! every generation attempt reproducible from its seed, and the constants and
//! update rule must stay exactly as they are so earlier results can be
//! regenerated.

use crate::data::Seed;

const MODULUS: i64 = 233_280;
const MULTIPLIER: i64 = 9_301;
const INCREMENT: i64 = 49_297;

#[derive(Debug, Clone)]
pub struct Lcg {
    state: i64,
    /// The first step has already been taken in `new`.
    primed: bool,
}

impl Lcg {
    pub fn new(seed: Seed) -> Self {
        Self {
            state: first_step(seed),
            primed: true,
        }
    }

    /// Next value in [0, 1).
    pub fn next_unit(&mut self) -> f64 {
        if self.primed {
            self.primed = false;
        } else {
            self.state = (self.state * MULTIPLIER + INCREMENT) % MODULUS;
        }
        self.state as f64 / MODULUS as f64
    }

    /// Uniform-ish index in [0, bound).
    fn next_index(&mut self, bound: usize) -> usize {
        (self.next_unit() * bound as f64).floor() as usize
    }
}

/// First update, done in f64 like the generator this one reproduces: for
/// clock-sized seeds (above 2^53 / 9301) `seed * 9301` rounds, and matching
/// that rounding keeps earlier results reproducible. Every later state is
/// below the modulus, so integer steps are exact from here on.
fn first_step(seed: Seed) -> i64 {
    let raw = (seed as f64 * MULTIPLIER as f64 + INCREMENT as f64) % MODULUS as f64;
    // negative seeds would leave a negative state; fold them into range
    (raw as i64).rem_euclid(MODULUS)
}

/// Shuffles `items` in place, walking from the last index down to 1.
pub fn shuffle_in_place<T>(items: &mut [T], seed: Seed) {
    let mut rng = Lcg::new(seed);
    for i in (1..items.len()).rev() {
        let j = rng.next_index(i + 1);
        items.swap(i, j);
    }
}

/// Returns a shuffled copy; identical seed and input order give an identical result.
pub fn seeded_shuffle<T: Clone>(items: &[T], seed: Seed) -> Vec<T> {
    let mut shuffled = items.to_vec();
    shuffle_in_place(&mut shuffled, seed);
    shuffled
}
