//! Sources of event counts for the tau-leap stepper.
//!
//! The stepper never touches a random number generator directly. It asks an
//! [`EventSampler`] for the number of events given their expected count, which
//! lets tests swap the Poisson draw for a deterministic rule or a fixed seed.

use rand::{SeedableRng, distr::Distribution, rngs::StdRng};
use rand_distr::Poisson;

pub trait EventSampler {
    /// Number of events that occur when `mean` are expected.
    fn sample_events(&mut self, mean: f64) -> u64;
}

impl<S: EventSampler + ?Sized> EventSampler for &mut S {
    fn sample_events(&mut self, mean: f64) -> u64 {
        (**self).sample_events(mean)
    }
}

/// Poisson-distributed event counts from a seedable generator.
pub struct PoissonSampler {
    rng: StdRng,
}

impl PoissonSampler {
    pub fn new(rng: StdRng) -> Self {
        Self { rng }
    }

    pub fn seed_from_u64(seed: u64) -> Self {
        Self::new(StdRng::seed_from_u64(seed))
    }
}

impl EventSampler for PoissonSampler {
    fn sample_events(&mut self, mean: f64) -> u64 {
        // Poisson requires a positive, finite rate
        if !mean.is_finite() || mean <= 0.0 {
            return 0;
        }
        match Poisson::new(mean) {
            Ok(poisson) => {
                let draw: f64 = poisson.sample(&mut self.rng);
                draw as u64
            }
            // Beyond the sampler's range the draw is indistinguishable from
            // its mean, and the stepper clamps it anyway.
            Err(_) => mean as u64,
        }
    }
}

/// Randomness disabled: every draw is its mean rounded down.
#[derive(Debug, Default, Clone, Copy)]
pub struct MeanSampler;

impl EventSampler for MeanSampler {
    fn sample_events(&mut self, mean: f64) -> u64 {
        if !mean.is_finite() || mean <= 0.0 {
            return 0;
        }
        mean.floor() as u64
    }
}
