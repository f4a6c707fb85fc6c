//! The single source of randomness used by the search.
//!
//! Move order shuffling and evaluation jitter both draw from a
//! [`RandomSource`], so swapping in a [`FixedSequence`] or a seeded
//! [`SeededRandom`] makes a search fully reproducible.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

pub trait RandomSource {
    /// A float in `[0, 1)`
    fn next_f64(&mut self) -> f64;
}

/// Backed by `StdRng`, either seeded or drawn from OS entropy
pub struct SeededRandom(StdRng);

impl SeededRandom {
    pub fn new(seed: u64) -> SeededRandom {
        SeededRandom(StdRng::seed_from_u64(seed))
    }
    pub fn from_entropy() -> SeededRandom {
        SeededRandom(StdRng::from_entropy())
    }
}

impl RandomSource for SeededRandom {
    fn next_f64(&mut self) -> f64 {
        self.0.gen::<f64>()
    }
}

/// Replays a fixed list of values, wrapping around at the end.
/// An empty list always yields 0.
pub struct FixedSequence {
    values: Vec<f64>,
    ix: usize,
}

impl FixedSequence {
    pub fn new(values: Vec<f64>) -> FixedSequence {
        FixedSequence { values, ix: 0 }
    }
}

impl RandomSource for FixedSequence {
    fn next_f64(&mut self) -> f64 {
        if self.values.is_empty() {
            return 0.0;
        }
        let value = self.values[self.ix % self.values.len()];
        self.ix += 1;
        value.clamp(0.0, 1.0 - f64::EPSILON)
    }
}

/// Fisher-Yates shuffle drawing one float per swap from `rng`. Each index is
/// the float scaled to the remaining length, never rejected and redrawn, so a
/// `FixedSequence` of any values always terminates.
pub fn shuffle<T>(items: &mut [T], rng: &mut dyn RandomSource) {
    for i in (1..items.len()).rev() {
        let j = ((rng.next_f64() * (i + 1) as f64) as usize).min(i);
        items.swap(i, j);
    }
}
