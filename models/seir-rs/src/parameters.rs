use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{
    error::SeirError,
    state::{SimulationState, Transition},
};

pub const DEFAULT_TIME_STEP: f64 = 0.1;
pub const MAX_TIME_STEP: f64 = 1.0;
// Output times are written with nine decimals.
pub const MIN_TIME_STEP: f64 = 1e-6;
/// Upper bound on steps per run; the trajectory is allocated up front.
pub const MAX_STEPS: usize = 10_000_000;

// Absorbs representation error so that e.g. 0.3 / 0.1 counts as 3 steps.
const STEP_COUNT_TOLERANCE: f64 = 1e-9;

/// Inputs for one outbreak simulation. Missing fields take the defaults of a
/// measles introduction into a 500 student school.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ModelParameters {
    pub population: u64,
    /// Fraction of the population immune before the outbreak starts.
    pub vaccination_rate: f64,
    pub initial_infected: u64,
    /// β, per day.
    pub transmission_rate: f64,
    /// Mean days from exposure to becoming infectious.
    pub latent_period: f64,
    /// Mean days spent infectious.
    pub infectious_period: f64,
    pub horizon_days: f64,
    pub time_step: f64,
}

impl Default for ModelParameters {
    fn default() -> Self {
        Self {
            population: 500,
            vaccination_rate: 0.95,
            initial_infected: 1,
            transmission_rate: 15.0,
            latent_period: 8.0,
            infectious_period: 5.0,
            horizon_days: 30.0,
            time_step: DEFAULT_TIME_STEP,
        }
    }
}

/// Data-quality problems that do not stop a run.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ValidationWarning {
    /// A per-capita rate times the time step exceeds one, so a single leap
    /// can expect to move more individuals than a compartment holds and
    /// clamping starts to shape the dynamics.
    LargeLeap {
        transition: Transition,
        per_step_rate: f64,
    },
}

impl fmt::Display for ValidationWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationWarning::LargeLeap {
                transition,
                per_step_rate,
            } => write!(
                f,
                "{transition} rate per step is {per_step_rate:.3}; tau-leap clamping will discard events"
            ),
        }
    }
}

fn require_positive(name: &'static str, value: f64) -> Result<(), SeirError> {
    if !value.is_finite() || value <= 0.0 {
        return Err(SeirError::invalid(
            name,
            format!("must be a positive finite number, got {value}"),
        ));
    }
    Ok(())
}

impl ModelParameters {
    /// Checks every field and the derived initial state. Returns the
    /// non-fatal warnings on success.
    pub fn validate(&self) -> Result<Vec<ValidationWarning>, SeirError> {
        if self.population == 0 {
            return Err(SeirError::invalid("population", "must be positive"));
        }
        if !(0.0..=1.0).contains(&self.vaccination_rate) {
            return Err(SeirError::invalid(
                "vaccination_rate",
                format!("must be within [0, 1], got {}", self.vaccination_rate),
            ));
        }
        if self.initial_infected > self.population {
            return Err(SeirError::invalid(
                "initial_infected",
                format!(
                    "{} exceeds the population of {}",
                    self.initial_infected, self.population
                ),
            ));
        }
        require_positive("transmission_rate", self.transmission_rate)?;
        require_positive("latent_period", self.latent_period)?;
        require_positive("infectious_period", self.infectious_period)?;
        require_positive("horizon_days", self.horizon_days)?;
        require_positive("time_step", self.time_step)?;
        if self.time_step > MAX_TIME_STEP {
            return Err(SeirError::invalid(
                "time_step",
                format!("must be at most {MAX_TIME_STEP} day, got {}", self.time_step),
            ));
        }
        if self.time_step < MIN_TIME_STEP {
            return Err(SeirError::invalid(
                "time_step",
                format!("must be at least {MIN_TIME_STEP} day, got {}", self.time_step),
            ));
        }
        let steps = self.horizon_days / self.time_step;
        if !steps.is_finite() || steps > MAX_STEPS as f64 {
            return Err(SeirError::invalid(
                "horizon_days",
                format!(
                    "{} days at a step of {} exceeds {MAX_STEPS} steps",
                    self.horizon_days, self.time_step
                ),
            ));
        }
        let timescale = self.latent_period.min(self.infectious_period);
        if self.time_step >= timescale {
            return Err(SeirError::TimeStepTooLarge {
                time_step: self.time_step,
                timescale,
            });
        }
        self.initial_state()?;

        let warnings = [
            (Transition::Exposure, self.transmission_rate),
            (Transition::Onset, self.sigma()),
            (Transition::Recovery, self.gamma()),
        ]
        .into_iter()
        .map(|(transition, rate)| (transition, rate * self.time_step))
        .filter(|(_, per_step_rate)| *per_step_rate > 1.0)
        .map(|(transition, per_step_rate)| ValidationWarning::LargeLeap {
            transition,
            per_step_rate,
        })
        .collect();
        Ok(warnings)
    }

    /// Rate of leaving the exposed compartment, per day.
    pub fn sigma(&self) -> f64 {
        1.0 / self.latent_period
    }

    /// Rate of leaving the infectious compartment, per day.
    pub fn gamma(&self) -> f64 {
        1.0 / self.infectious_period
    }

    pub fn basic_reproduction_number(&self) -> f64 {
        self.transmission_rate / self.gamma()
    }

    pub fn vaccinated_count(&self) -> u64 {
        // The f64 product can round above the population for large counts
        ((self.population as f64 * self.vaccination_rate).floor() as u64).min(self.population)
    }

    pub fn total_steps(&self) -> usize {
        (self.horizon_days / self.time_step + STEP_COUNT_TOLERANCE).floor() as usize
    }

    /// Vaccinated individuals start recovered, the seed cases start
    /// infectious and everyone else is susceptible.
    pub fn initial_state(&self) -> Result<SimulationState, SeirError> {
        let vaccinated = self.vaccinated_count();
        let susceptible = self
            .population
            .checked_sub(vaccinated)
            .and_then(|remaining| remaining.checked_sub(self.initial_infected))
            .ok_or(SeirError::InsufficientSusceptible {
                vaccinated,
                initial_infected: self.initial_infected,
                population: self.population,
            })?;
        Ok(SimulationState {
            susceptible,
            exposed: 0,
            infectious: self.initial_infected,
            recovered: vaccinated,
        })
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use approx::assert_relative_eq;
    use serde_json::json;

    #[test]
    fn test_default_initial_state() {
        let parameters = ModelParameters::default();
        let state = parameters.initial_state().unwrap();
        assert_eq!(
            state,
            SimulationState {
                susceptible: 24,
                exposed: 0,
                infectious: 1,
                recovered: 475,
            }
        );
        assert_eq!(state.total(), 500);
    }

    #[test]
    fn test_derived_rates() {
        let parameters = ModelParameters::default();
        assert_relative_eq!(parameters.sigma(), 0.125);
        assert_relative_eq!(parameters.gamma(), 0.2);
        assert_relative_eq!(parameters.basic_reproduction_number(), 75.0);
        assert_eq!(parameters.total_steps(), 300);
    }

    #[test]
    fn test_total_steps_floors() {
        let parameters = ModelParameters {
            horizon_days: 0.3,
            ..Default::default()
        };
        assert_eq!(parameters.total_steps(), 3);
        let parameters = ModelParameters {
            horizon_days: 1.05,
            time_step: 0.5,
            ..Default::default()
        };
        assert_eq!(parameters.total_steps(), 2);
    }

    #[test]
    fn test_partial_input_uses_defaults() {
        let parameters: ModelParameters =
            serde_json::from_value(json!({ "population": 1000, "vaccination_rate": 0.8 }))
                .unwrap();
        assert_eq!(parameters.population, 1000);
        assert_eq!(parameters.vaccinated_count(), 800);
        assert_relative_eq!(parameters.transmission_rate, 15.0);
        assert_relative_eq!(parameters.time_step, DEFAULT_TIME_STEP);
    }

    #[test]
    fn test_unknown_field_rejected() {
        let result = serde_json::from_value::<ModelParameters>(json!({ "betta": 1.0 }));
        assert!(result.is_err());
    }

    #[test]
    fn test_validate_rejects_bad_fields() {
        let cases = [
            (
                ModelParameters {
                    population: 0,
                    initial_infected: 0,
                    ..Default::default()
                },
                "population",
            ),
            (
                ModelParameters {
                    vaccination_rate: 1.5,
                    ..Default::default()
                },
                "vaccination_rate",
            ),
            (
                ModelParameters {
                    vaccination_rate: f64::NAN,
                    ..Default::default()
                },
                "vaccination_rate",
            ),
            (
                ModelParameters {
                    initial_infected: 501,
                    ..Default::default()
                },
                "initial_infected",
            ),
            (
                ModelParameters {
                    transmission_rate: 0.0,
                    ..Default::default()
                },
                "transmission_rate",
            ),
            (
                ModelParameters {
                    latent_period: -8.0,
                    ..Default::default()
                },
                "latent_period",
            ),
            (
                ModelParameters {
                    infectious_period: f64::INFINITY,
                    ..Default::default()
                },
                "infectious_period",
            ),
            (
                ModelParameters {
                    horizon_days: 0.0,
                    ..Default::default()
                },
                "horizon_days",
            ),
            (
                ModelParameters {
                    time_step: 0.0,
                    ..Default::default()
                },
                "time_step",
            ),
            (
                ModelParameters {
                    time_step: 1.5,
                    ..Default::default()
                },
                "time_step",
            ),
            (
                ModelParameters {
                    time_step: 1e-10,
                    ..Default::default()
                },
                "time_step",
            ),
            (
                ModelParameters {
                    horizon_days: f64::MAX,
                    ..Default::default()
                },
                "horizon_days",
            ),
            (
                ModelParameters {
                    horizon_days: 1e7,
                    ..Default::default()
                },
                "horizon_days",
            ),
        ];
        for (parameters, field) in cases {
            match parameters.validate() {
                Err(SeirError::InvalidParameter { name, .. }) => assert_eq!(name, field),
                other => panic!("expected {field} to be rejected, got {other:?}"),
            }
        }
    }

    #[test]
    fn test_validate_rejects_time_step_above_timescale() {
        let parameters = ModelParameters {
            latent_period: 0.5,
            infectious_period: 0.8,
            time_step: 0.5,
            ..Default::default()
        };
        assert_eq!(
            parameters.validate(),
            Err(SeirError::TimeStepTooLarge {
                time_step: 0.5,
                timescale: 0.5,
            })
        );
    }

    #[test]
    fn test_validate_rejects_negative_susceptible() {
        let parameters = ModelParameters {
            population: 100,
            vaccination_rate: 0.95,
            initial_infected: 10,
            ..Default::default()
        };
        assert_eq!(
            parameters.validate(),
            Err(SeirError::InsufficientSusceptible {
                vaccinated: 95,
                initial_infected: 10,
                population: 100,
            })
        );
    }

    #[test]
    fn test_validate_warns_on_large_leap() {
        // β·Δt = 1.5 for the default measles parameters
        let warnings = ModelParameters::default().validate().unwrap();
        assert_eq!(warnings.len(), 1);
        match &warnings[0] {
            ValidationWarning::LargeLeap {
                transition,
                per_step_rate,
            } => {
                assert_eq!(*transition, Transition::Exposure);
                assert_relative_eq!(*per_step_rate, 1.5);
            }
        }

        let parameters = ModelParameters {
            transmission_rate: 2.0,
            ..Default::default()
        };
        assert!(parameters.validate().unwrap().is_empty());
    }

    #[test]
    fn test_full_vaccination_boundary() {
        let parameters = ModelParameters {
            vaccination_rate: 1.0,
            initial_infected: 0,
            ..Default::default()
        };
        let state = parameters.initial_state().unwrap();
        assert_eq!(state.susceptible, 0);
        assert_eq!(state.recovered, 500);
    }

    #[test]
    fn test_full_vaccination_large_population() {
        // 2^53 + 3 rounds up when converted to f64
        let population = (1u64 << 53) + 3;
        let parameters = ModelParameters {
            population,
            vaccination_rate: 1.0,
            initial_infected: 0,
            ..Default::default()
        };
        assert_eq!(parameters.vaccinated_count(), population);
        let state = parameters.initial_state().unwrap();
        assert_eq!(state.susceptible, 0);
        assert_eq!(state.recovered, population);
        assert!(parameters.validate().is_ok());
    }

    #[test]
    fn test_step_limit_boundary() {
        let parameters = ModelParameters {
            horizon_days: 1_000_000.0,
            time_step: 0.1,
            ..Default::default()
        };
        assert!(parameters.validate().is_ok());
        assert_eq!(parameters.total_steps(), MAX_STEPS);
    }
}
