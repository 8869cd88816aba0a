//! Seeded and scripted `DeterministicRng` implementations for tests.

use stagehand_core::rng::DeterministicRng;

/// An RNG that always returns `min`. Suitable for tests that do not depend on
/// specific random values.
#[derive(Debug)]
pub struct MockRng;

impl DeterministicRng for MockRng {
    fn next_i64_range(&mut self, min: i64, max: i64) -> i64 {
        min.min(max)
    }
}

/// An RNG that returns values from a predetermined sequence. Panics if the
/// sequence is exhausted. Values are returned as given, ignoring the bounds,
/// so tests can check how callers treat the draw.
#[derive(Debug)]
pub struct SequenceRng {
    values: Vec<i64>,
    index: usize,
}

impl SequenceRng {
    /// Create a new `SequenceRng` with the given values.
    #[must_use]
    pub fn new(values: Vec<i64>) -> Self {
        Self { values, index: 0 }
    }
}

impl DeterministicRng for SequenceRng {
    fn next_i64_range(&mut self, _min: i64, _max: i64) -> i64 {
        let val = self.values[self.index];
        self.index += 1;
        val
    }
}
