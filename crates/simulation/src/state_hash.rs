//! Deterministic state hashing for replay verification.
//!
//! Computes a 64-bit hash of key simulation state in a fixed order:
//!
//! 1. Accepted steps
//! 2. Treasury
//! 3. Headline population
//! 4. SimRng internal state (seed, word_pos, stream)
//! 5. Grid tiles in row-major order, packed
//!
//! Two cities built from the same seed and the same edits must hash equal
//! after the same number of steps.

use std::hash::{Hash, Hasher};

use crate::city::City;

// ---------------------------------------------------------------------------
// FNV-1a hasher (deterministic, no random seed)
// ---------------------------------------------------------------------------

/// FNV-1a, stable across platforms and Rust versions.
struct Fnv1aHasher {
    state: u64,
}

impl Fnv1aHasher {
    const FNV_OFFSET_BASIS: u64 = 0xcbf29ce484222325;
    const FNV_PRIME: u64 = 0x00000100000001B3;

    fn new() -> Self {
        Self {
            state: Self::FNV_OFFSET_BASIS,
        }
    }
}

impl Hasher for Fnv1aHasher {
    fn finish(&self) -> u64 {
        self.state
    }

    fn write(&mut self, bytes: &[u8]) {
        for &byte in bytes {
            self.state ^= byte as u64;
            self.state = self.state.wrapping_mul(Self::FNV_PRIME);
        }
    }
}

pub fn compute_state_hash(city: &City) -> u64 {
    let mut hasher = Fnv1aHasher::new();

    city.clock.steps.hash(&mut hasher);
    city.budget.treasury.hash(&mut hasher);
    city.census.city_population.hash(&mut hasher);

    city.rng.0.get_seed().hash(&mut hasher);
    city.rng.0.get_word_pos().hash(&mut hasher);
    city.rng.0.get_stream().hash(&mut hasher);

    for tile in &city.grid.tiles {
        tile.to_packed().hash(&mut hasher);
    }

    hasher.finish()
}
