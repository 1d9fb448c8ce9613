//! Injectable randomness for centroid seeding.
//!
//! The engine never touches a global generator. Callers pass a
//! `RandomSource`; identical inputs plus an identically seeded source give
//! identical clusters.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Minimal random interface needed by k-means++.
pub trait RandomSource {
    /// Uniform index in `0..upper`. `upper` is always > 0.
    fn next_index(&mut self, upper: usize) -> usize;

    /// Uniform value in `[0, 1)`.
    fn next_unit(&mut self) -> f64;
}

/// Adapter from any `rand::Rng` to `RandomSource`.
#[derive(Debug, Clone)]
pub struct RngSource<R> {
    rng: R,
}

impl<R: Rng> RngSource<R> {
    pub fn new(rng: R) -> Self {
        Self { rng }
    }
}

impl RngSource<StdRng> {
    /// Deterministic source for reproducible runs.
    pub fn seeded(seed: u64) -> Self {
        Self::new(StdRng::seed_from_u64(seed))
    }

    /// Source seeded from OS entropy.
    pub fn from_entropy() -> Self {
        Self::new(StdRng::from_os_rng())
    }
}

impl<R: Rng> RandomSource for RngSource<R> {
    fn next_index(&mut self, upper: usize) -> usize {
        self.rng.random_range(0..upper)
    }

    fn next_unit(&mut self) -> f64 {
        self.rng.random::<f64>()
    }
}

/// Replays fixed draws. Once a script runs out it returns 0 / 0.0.
///
/// Pins k-means++ seeding exactly in tests and reproductions.
#[derive(Debug, Clone, Default)]
pub struct ScriptedSource {
    indices: Vec<usize>,
    units: Vec<f64>,
    index_cursor: usize,
    unit_cursor: usize,
}

impl ScriptedSource {
    pub fn new(indices: Vec<usize>, units: Vec<f64>) -> Self {
        Self {
            indices,
            units,
            index_cursor: 0,
            unit_cursor: 0,
        }
    }
}

impl RandomSource for ScriptedSource {
    fn next_index(&mut self, upper: usize) -> usize {
        let value = self.indices.get(self.index_cursor).copied().unwrap_or(0);
        self.index_cursor += 1;
        if upper == 0 {
            0
        } else {
            value % upper
        }
    }

    fn next_unit(&mut self) -> f64 {
        let value = self.units.get(self.unit_cursor).copied().unwrap_or(0.0);
        self.unit_cursor += 1;
        value
    }
}
