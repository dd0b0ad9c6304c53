use log::{debug, info, trace, warn};

use crate::{
    error::SeirError,
    output::Trajectory,
    parameters::ModelParameters,
    sampler::EventSampler,
    state::{SimulationState, TransitionCounts},
};

/// Expected number of each event over one time step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExpectedEvents {
    pub exposures: f64,
    pub onsets: f64,
    pub recoveries: f64,
}

/// Result of a single leap.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Step {
    pub state: SimulationState,
    /// Events applied after clamping.
    pub events: TransitionCounts,
    /// Events drawn in excess of the available individuals.
    pub clamped: TransitionCounts,
}

/// Advances compartment counts by tau-leaping with fixed rate constants.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TauLeapStepper {
    population: f64,
    beta: f64,
    sigma: f64,
    gamma: f64,
    time_step: f64,
}

impl TauLeapStepper {
    pub fn new(parameters: &ModelParameters) -> Self {
        Self {
            population: parameters.population as f64,
            beta: parameters.transmission_rate,
            sigma: parameters.sigma(),
            gamma: parameters.gamma(),
            time_step: parameters.time_step,
        }
    }

    pub fn expected_events(&self, state: &SimulationState) -> ExpectedEvents {
        let s = state.susceptible as f64;
        let e = state.exposed as f64;
        let i = state.infectious as f64;
        ExpectedEvents {
            exposures: self.beta * s * i / self.population * self.time_step,
            onsets: self.sigma * e * self.time_step,
            recoveries: self.gamma * i * self.time_step,
        }
    }

    /// Draws the events of one step and applies them. Each draw is clamped to
    /// the size of its source compartment independently; excess events are
    /// dropped, not carried over or redistributed.
    pub fn step<S: EventSampler + ?Sized>(
        &self,
        state: &SimulationState,
        sampler: &mut S,
    ) -> Step {
        let expected = self.expected_events(state);
        let drawn = TransitionCounts {
            exposures: sampler.sample_events(expected.exposures),
            onsets: sampler.sample_events(expected.onsets),
            recoveries: sampler.sample_events(expected.recoveries),
        };
        let events = TransitionCounts {
            exposures: drawn.exposures.min(state.susceptible),
            onsets: drawn.onsets.min(state.exposed),
            recoveries: drawn.recoveries.min(state.infectious),
        };
        let clamped = TransitionCounts {
            exposures: drawn.exposures - events.exposures,
            onsets: drawn.onsets - events.onsets,
            recoveries: drawn.recoveries - events.recoveries,
        };
        let next = SimulationState {
            susceptible: state.susceptible - events.exposures,
            exposed: state.exposed + events.exposures - events.onsets,
            infectious: state.infectious + events.onsets - events.recoveries,
            recovered: state.recovered + events.recoveries,
        };
        Step {
            state: next,
            events,
            clamped,
        }
    }
}

pub struct SeirModel {}

impl SeirModel {
    /// Validates `parameters`, then runs the stepper to the horizon. The run
    /// never stops early, even once the outbreak has died out.
    pub fn simulate<S: EventSampler + ?Sized>(
        parameters: &ModelParameters,
        sampler: &mut S,
    ) -> Result<Trajectory, SeirError> {
        for warning in parameters.validate()? {
            warn!("{warning}");
        }
        let mut state = parameters.initial_state()?;
        let stepper = TauLeapStepper::new(parameters);
        let total_steps = parameters.total_steps();
        debug!(
            "simulating {total_steps} steps of {} days from {state:?}",
            parameters.time_step
        );

        let samples = total_steps.checked_add(1).ok_or_else(|| {
            SeirError::invalid("horizon_days", format!("{total_steps} steps cannot be stored"))
        })?;
        let mut trajectory = Trajectory::with_capacity(samples);
        trajectory.push(0.0, &state);
        for step in 1..=total_steps {
            let leap = stepper.step(&state, sampler);
            trace!("step {step}: {:?} -> {:?}", leap.events, leap.state);
            trajectory.record_clamped(&leap.clamped);
            state = leap.state;
            trajectory.push(step as f64 * parameters.time_step, &state);
        }

        if let Some(summary) = trajectory.summary() {
            info!(
                "peak of {} infectious at day {:.1}, {} new infections, {} recovered at the end, {} events clamped",
                summary.peak_infectious,
                summary.peak_time,
                summary.new_infections,
                summary.final_state.recovered,
                summary.clamped_events.total()
            );
        }
        Ok(trajectory)
    }
}
