//! Injectable randomness for agents
//!
//! Every agent owns its own source so draws never depend on the order in
//! which agents happen to be scheduled.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::types::VehicleId;

/// 64-bit fractional golden-ratio constant for seed mixing
const MIXING_CONSTANT: u64 = 0x9e37_79b9_7f4a_7c15;

/// A source of random draws owned by a single agent
pub trait RandomSource: Send {
    /// Uniform draw in `[0, 1)`
    fn unit(&mut self) -> f64;

    /// Uniform integer in `[-spread, spread]`
    fn offset(&mut self, spread: i32) -> i32;

    /// Bernoulli trial succeeding with probability `p`
    fn chance(&mut self, p: f64) -> bool {
        if p <= 0.0 {
            false
        } else if p >= 1.0 {
            true
        } else {
            self.unit() < p
        }
    }
}

/// `RandomSource` backed by a seeded `StdRng`
pub struct SeededRandom(StdRng);

impl SeededRandom {
    pub fn new(seed: u64) -> Self {
        Self(StdRng::seed_from_u64(seed))
    }

    /// Independent stream for one vehicle derived from the run seed
    pub fn for_vehicle(run_seed: u64, id: VehicleId) -> Self {
        Self::new(run_seed ^ id.0.wrapping_add(1).wrapping_mul(MIXING_CONSTANT))
    }
}

impl RandomSource for SeededRandom {
    fn unit(&mut self) -> f64 {
        self.0.random::<f64>()
    }

    fn offset(&mut self, spread: i32) -> i32 {
        if spread <= 0 {
            return 0;
        }
        self.0.random_range(-spread..=spread)
    }
}
