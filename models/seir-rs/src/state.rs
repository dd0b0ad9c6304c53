use std::fmt;

use serde::Serialize;

/// Compartment counts at one point in time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SimulationState {
    pub susceptible: u64,
    pub exposed: u64,
    pub infectious: u64,
    pub recovered: u64,
}

impl SimulationState {
    pub fn total(&self) -> u64 {
        self.susceptible + self.exposed + self.infectious + self.recovered
    }
}

/// The three transitions of the SEIR chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Transition {
    /// S -> E
    Exposure,
    /// E -> I
    Onset,
    /// I -> R
    Recovery,
}

impl fmt::Display for Transition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Transition::Exposure => "exposure (S->E)",
            Transition::Onset => "onset (E->I)",
            Transition::Recovery => "recovery (I->R)",
        };
        f.write_str(name)
    }
}

/// Event counts for each transition, either applied or discarded by clamping.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TransitionCounts {
    pub exposures: u64,
    pub onsets: u64,
    pub recoveries: u64,
}

impl TransitionCounts {
    pub fn total(&self) -> u64 {
        self.exposures + self.onsets + self.recoveries
    }

    pub(crate) fn accumulate(&mut self, other: &TransitionCounts) {
        self.exposures += other.exposures;
        self.onsets += other.onsets;
        self.recoveries += other.recoveries;
    }
}
