//! Random source for procedural geometry.
//!
//! Wraps `ChaCha8Rng` so every random call site draws from one injectable
//! stream: entropy-seeded for normal use, fixed-seeded for reproducible tests.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Random source shared by the tree, particles, stars and meteors.
#[derive(Debug, Clone)]
pub struct SceneRng(ChaCha8Rng);

impl Default for SceneRng {
    fn default() -> Self {
        Self::from_entropy()
    }
}

impl SceneRng {
    /// Seed from operating system entropy.
    pub fn from_entropy() -> Self {
        Self(ChaCha8Rng::from_entropy())
    }

    /// Create a reproducible stream from a `u64` seed.
    pub fn from_seed_u64(seed: u64) -> Self {
        Self(ChaCha8Rng::seed_from_u64(seed))
    }

    /// Uniform float in `[0, 1)`.
    pub fn unit(&mut self) -> f32 {
        self.0.gen_range(0.0..1.0)
    }

    /// Uniform float in `[lo, hi)`. Tolerates `lo == hi`.
    pub fn range(&mut self, lo: f32, hi: f32) -> f32 {
        lo + self.unit() * (hi - lo)
    }

    /// True with probability `p`.
    pub fn chance(&mut self, p: f32) -> bool {
        self.unit() < p
    }

    /// Uniform index in `0..len`. `len` must be non-zero.
    pub fn index(&mut self, len: usize) -> usize {
        self.0.gen_range(0..len)
    }
}
