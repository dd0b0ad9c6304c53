use thiserror::Error;

/// Configuration errors. All of them are raised before the first step is
/// taken, so a failed run never produces a partial trajectory.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SeirError {
    #[error("invalid parameter `{name}`: {reason}")]
    InvalidParameter { name: &'static str, reason: String },

    #[error(
        "{vaccinated} vaccinated plus {initial_infected} initially infected exceeds the population of {population}"
    )]
    InsufficientSusceptible {
        vaccinated: u64,
        initial_infected: u64,
        population: u64,
    },

    #[error("time step {time_step} must be shorter than the shortest disease period ({timescale} days)")]
    TimeStepTooLarge { time_step: f64, timescale: f64 },
}

impl SeirError {
    pub(crate) fn invalid(name: &'static str, reason: impl Into<String>) -> Self {
        SeirError::InvalidParameter {
            name,
            reason: reason.into(),
        }
    }
}
