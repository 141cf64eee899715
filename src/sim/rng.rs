//! Seeded random source for the simulation
//!
//! One handle is created per session and passed explicitly to everything that
//! needs randomness. Call order is part of the determinism contract: the same
//! seed and the same sequence of calls reproduce the same session.

use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

#[derive(Debug, Clone)]
pub struct GameRng {
    inner: Pcg32,
}

impl GameRng {
    pub fn new(seed: u64) -> Self {
        Self {
            inner: Pcg32::seed_from_u64(seed),
        }
    }

    /// Uniform in `[0, 1)`
    pub fn next_f64(&mut self) -> f64 {
        self.inner.random::<f64>()
    }

    pub fn next_bool(&mut self) -> bool {
        self.inner.random_bool(0.5)
    }

    /// Uniform index in `[0, len)`; `len` must be non-zero
    pub fn index(&mut self, len: usize) -> usize {
        debug_assert!(len > 0, "index() on empty range");
        self.inner.random_range(0..len.max(1))
    }

    /// Uniform in `[0, bound)`, or 0 when `bound <= 0`
    pub fn below(&mut self, bound: i64) -> i64 {
        if bound <= 0 {
            return 0;
        }
        self.inner.random_range(0..bound)
    }

    pub fn shuffle<T>(&mut self, items: &mut [T]) {
        items.shuffle(&mut self.inner);
    }
}
