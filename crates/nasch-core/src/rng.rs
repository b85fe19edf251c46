//! Deterministic per-unit and simulation-level RNG wrappers.
//!
//! # Determinism strategy
//!
//! Each execution unit gets its own independent `SmallRng` seeded by:
//!
//!   seed = global_seed XOR (unit_id * MIXING_CONSTANT)
//!
//! The mixing constant is the 64-bit fractional part of the golden ratio,
//! which spreads consecutive unit IDs uniformly across the seed space.
//! Random streams are therefore local to the evaluating unit: a run is
//! reproducible for a fixed seed and unit count, but the same seed under a
//! different unit count draws different slowdowns.

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use crate::UnitId;

/// 64-bit fractional golden-ratio constant for seed mixing.
const MIXING_CONSTANT: u64 = 0x9e37_79b9_7f4a_7c15;

// ── UnitRng ───────────────────────────────────────────────────────────────────

/// Per-unit deterministic RNG, owned by exactly one execution unit.
pub struct UnitRng(SmallRng);

impl UnitRng {
    /// Seed deterministically from the run's global seed and a unit ID.
    pub fn new(global_seed: u64, unit: UnitId) -> Self {
        let seed = global_seed ^ (unit.0 as u64).wrapping_mul(MIXING_CONSTANT);
        UnitRng(SmallRng::seed_from_u64(seed))
    }

    /// Sample a uniformly distributed value of any `Standard`-distributed type.
    #[inline]
    pub fn random<T>(&mut self) -> T
    where
        rand::distributions::Standard: rand::distributions::Distribution<T>,
    {
        self.0.r#gen()
    }
}

// ── SimRng ────────────────────────────────────────────────────────────────────

/// Simulation-level RNG for global operations (initial car placement).
///
/// Used only by the owner of the canonical road, never inside a round.
pub struct SimRng(SmallRng);

impl SimRng {
    pub fn new(seed: u64) -> Self {
        SimRng(SmallRng::seed_from_u64(seed))
    }

    #[inline]
    pub fn inner(&mut self) -> &mut SmallRng {
        &mut self.0
    }

    #[inline]
    pub fn gen_range<T, R>(&mut self, range: R) -> T
    where
        T: rand::distributions::uniform::SampleUniform,
        R: rand::distributions::uniform::SampleRange<T>,
    {
        self.0.gen_range(range)
    }
}
