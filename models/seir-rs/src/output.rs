use serde::Serialize;

use crate::{
    parameters::{ModelParameters, ValidationWarning},
    state::{SimulationState, TransitionCounts},
};

pub const CSV_HEADERS: [&str; 5] = ["time", "susceptible", "exposed", "infectious", "recovered"];

/// Compartment counts sampled at every step of a run, including the initial
/// state at index 0. All series have the same length.
#[derive(Debug, Clone, PartialEq)]
pub struct Trajectory {
    time: Vec<f64>,
    susceptible: Vec<u64>,
    exposed: Vec<u64>,
    infectious: Vec<u64>,
    recovered: Vec<u64>,
    clamped: TransitionCounts,
}

impl Trajectory {
    pub(crate) fn with_capacity(len: usize) -> Trajectory {
        Trajectory {
            time: Vec::with_capacity(len),
            susceptible: Vec::with_capacity(len),
            exposed: Vec::with_capacity(len),
            infectious: Vec::with_capacity(len),
            recovered: Vec::with_capacity(len),
            clamped: TransitionCounts::default(),
        }
    }

    pub(crate) fn push(&mut self, time: f64, state: &SimulationState) {
        self.time.push(time);
        self.susceptible.push(state.susceptible);
        self.exposed.push(state.exposed);
        self.infectious.push(state.infectious);
        self.recovered.push(state.recovered);
    }

    pub(crate) fn record_clamped(&mut self, clamped: &TransitionCounts) {
        self.clamped.accumulate(clamped);
    }

    pub fn len(&self) -> usize {
        self.time.len()
    }

    pub fn is_empty(&self) -> bool {
        self.time.is_empty()
    }

    pub fn time(&self) -> &[f64] {
        &self.time
    }

    pub fn susceptible(&self) -> &[u64] {
        &self.susceptible
    }

    pub fn exposed(&self) -> &[u64] {
        &self.exposed
    }

    pub fn infectious(&self) -> &[u64] {
        &self.infectious
    }

    pub fn recovered(&self) -> &[u64] {
        &self.recovered
    }

    /// Events drawn but discarded because they exceeded the individuals
    /// available in the source compartment, summed over the run.
    pub fn clamped_events(&self) -> TransitionCounts {
        self.clamped
    }

    pub fn state_at(&self, step: usize) -> Option<SimulationState> {
        Some(SimulationState {
            susceptible: *self.susceptible.get(step)?,
            exposed: *self.exposed.get(step)?,
            infectious: *self.infectious.get(step)?,
            recovered: *self.recovered.get(step)?,
        })
    }

    pub fn final_state(&self) -> Option<SimulationState> {
        self.state_at(self.len().checked_sub(1)?)
    }

    /// Time and size of the largest infectious count. Ties resolve to the
    /// earliest step.
    pub fn peak_infectious(&self) -> Option<(f64, u64)> {
        let (step, peak) = self
            .infectious
            .iter()
            .enumerate()
            .rev()
            .max_by_key(|(_, count)| **count)?;
        Some((self.time[step], *peak))
    }

    /// Susceptible individuals infected over the run.
    pub fn new_infections(&self) -> u64 {
        match (self.susceptible.first(), self.susceptible.last()) {
            (Some(first), Some(last)) => first - last,
            _ => 0,
        }
    }

    pub fn summary(&self) -> Option<TrajectorySummary> {
        let (peak_time, peak_infectious) = self.peak_infectious()?;
        Some(TrajectorySummary {
            steps: self.len() - 1,
            peak_time,
            peak_infectious,
            new_infections: self.new_infections(),
            final_state: self.final_state()?,
            clamped_events: self.clamped,
        })
    }

    /// One CSV row per sample, in [`CSV_HEADERS`] order.
    pub fn rows(&self) -> Vec<Vec<String>> {
        (0..self.len())
            .map(|i| {
                vec![
                    format_time(self.time[i]),
                    self.susceptible[i].to_string(),
                    self.exposed[i].to_string(),
                    self.infectious[i].to_string(),
                    self.recovered[i].to_string(),
                ]
            })
            .collect()
    }
}

// k * 0.1 prints as 0.30000000000000004; nine decimals is finer than any
// sensible time step.
fn format_time(time: f64) -> String {
    let fixed = format!("{time:.9}");
    let trimmed = fixed.trim_end_matches('0').trim_end_matches('.');
    trimmed.to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrajectorySummary {
    pub steps: usize,
    pub peak_time: f64,
    pub peak_infectious: u64,
    pub new_infections: u64,
    pub final_state: SimulationState,
    pub clamped_events: TransitionCounts,
}

/// Metadata written next to the CSV output when a run targets a directory.
#[derive(Debug, Serialize)]
pub struct RunManifest<'a> {
    pub parameters: &'a ModelParameters,
    pub seed: u64,
    pub replicate: u64,
    pub fingerprint: String,
    pub summary: Option<TrajectorySummary>,
    pub warnings: &'a [ValidationWarning],
}
