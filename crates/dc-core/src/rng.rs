//! Deterministic per-volunteer and dashboard-level RNG wrappers.
//!
//! # Determinism strategy
//!
//! Each volunteer's wander loop draws from its own `SmallRng` seeded by:
//!
//!   seed = global_seed XOR (volunteer_id * MIXING_CONSTANT)
//!
//! The mixing constant is the 64-bit fractional part of the golden ratio,
//! which spreads consecutive ids across the seed space.  One volunteer's
//! animation restarts never shift another volunteer's random sequence, so a
//! given seed replays the same map motion.

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use crate::VolunteerId;

/// 64-bit fractional golden-ratio constant for seed mixing.
const MIXING_CONSTANT: u64 = 0x9e37_79b9_7f4a_7c15;

// ── VolunteerRng ──────────────────────────────────────────────────────────────

/// Per-volunteer deterministic RNG used by the idle-wander loop.
pub struct VolunteerRng(SmallRng);

impl VolunteerRng {
    /// Seed deterministically from the global seed and a volunteer id.
    pub fn new(global_seed: u64, volunteer: VolunteerId) -> Self {
        let seed = global_seed ^ (volunteer.0 as u64).wrapping_mul(MIXING_CONSTANT);
        VolunteerRng(SmallRng::seed_from_u64(seed))
    }

    /// Uniform value in `[-half, half]` (symmetric jitter).
    #[inline]
    pub fn symmetric(&mut self, half: f64) -> f64 {
        if half <= 0.0 {
            return 0.0;
        }
        self.0.gen_range(-half..=half)
    }

    /// Generate a value uniformly in `range`.
    #[inline]
    pub fn gen_range<T, R>(&mut self, range: R) -> T
    where
        T: rand::distributions::uniform::SampleUniform,
        R: rand::distributions::uniform::SampleRange<T>,
    {
        self.0.gen_range(range)
    }
}

// ── SimRng ────────────────────────────────────────────────────────────────────

/// Dashboard-level RNG for global operations (fallback coordinate jitter on
/// reports without a location fix).
pub struct SimRng(SmallRng);

impl SimRng {
    pub fn new(seed: u64) -> Self {
        SimRng(SmallRng::seed_from_u64(seed))
    }

    /// Uniform value in `[-half, half]`.
    #[inline]
    pub fn symmetric(&mut self, half: f64) -> f64 {
        if half <= 0.0 {
            return 0.0;
        }
        self.0.gen_range(-half..=half)
    }
}
