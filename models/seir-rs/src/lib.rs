//! Stochastic SEIR outbreak model for a closed, homogeneously mixed
//! population, advanced in fixed time steps by tau-leaping.
//!
//! ```
//! use seir::{ModelParameters, run_seeded};
//!
//! let trajectory = run_seeded(&ModelParameters::default(), 42).unwrap();
//! assert_eq!(trajectory.len(), 301);
//! ```

pub mod error;
pub mod output;
pub mod parameters;
pub mod sampler;
pub mod seir;
pub mod state;

pub use error::SeirError;
pub use output::{CSV_HEADERS, RunManifest, Trajectory, TrajectorySummary};
pub use parameters::{ModelParameters, ValidationWarning};
pub use sampler::{EventSampler, MeanSampler, PoissonSampler};
pub use seir::{SeirModel, TauLeapStepper};
pub use state::{SimulationState, Transition, TransitionCounts};

/// Runs one simulation, drawing every event count from `sampler`.
pub fn run_simulation<S: EventSampler + ?Sized>(
    parameters: &ModelParameters,
    sampler: &mut S,
) -> Result<Trajectory, SeirError> {
    SeirModel::simulate(parameters, sampler)
}

/// Runs one simulation with Poisson draws from a generator seeded with `seed`.
pub fn run_seeded(parameters: &ModelParameters, seed: u64) -> Result<Trajectory, SeirError> {
    run_simulation(parameters, &mut PoissonSampler::seed_from_u64(seed))
}
