//! Random delay collaborator
//!
//! All think and eat durations come from a [`RandomDelay`] so tests can
//! replace the random source with fixed or zero delays.

use std::{
    sync::{Mutex, PoisonError},
    time::Duration,
};

use rand::{rngs::StdRng, Rng, SeedableRng};

/// Source of think/eat durations
pub trait RandomDelay: Send + Sync {
    /// A duration in `[min, max]`, both ends inclusive
    fn delay(&self, min: Duration, max: Duration) -> Duration;
}

/// Uniformly distributed delays from a seedable RNG
#[derive(Debug)]
pub struct UniformDelay {
    rng: Mutex<StdRng>,
}

impl UniformDelay {
    /// Deterministic delays for a given seed
    #[must_use]
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }

    /// Delays seeded from system entropy
    #[must_use]
    pub fn from_entropy() -> Self {
        Self {
            rng: Mutex::new(StdRng::from_entropy()),
        }
    }

    /// Seeded when `seed` is set, otherwise from entropy
    #[must_use]
    pub fn new(seed: Option<u64>) -> Self {
        seed.map_or_else(Self::from_entropy, Self::seeded)
    }
}

impl RandomDelay for UniformDelay {
    fn delay(&self, min: Duration, max: Duration) -> Duration {
        if max <= min {
            return min;
        }
        self.rng
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .gen_range(min..=max)
    }
}

/// Always the same duration, clamped into the requested range
#[derive(Debug, Clone, Copy)]
pub struct FixedDelay(pub Duration);

impl RandomDelay for FixedDelay {
    fn delay(&self, min: Duration, max: Duration) -> Duration {
        self.0.clamp(min, max.max(min))
    }
}

/// Always the lower bound; think and eat take no time
#[derive(Debug, Clone, Copy, Default)]
pub struct ZeroDelay;

impl RandomDelay for ZeroDelay {
    fn delay(&self, min: Duration, _max: Duration) -> Duration {
        min
    }
}
