//! # Optional State Validation
//!
//! The integrator itself never rejects a state. Callers that want degenerate states to become
//! errors attach a [`StateValidator`] to the model and advance it with `try_step()`.
//!
//! [`PhysicalLimits`] covers the usual operational alarms of the reactor:
//! - non-finite state variables (NaN/inf after a singular configuration)
//! - volume collapse, either `V <= 0` or `V < Vmin`
//! - negative concentration
//! - optional upper temperature limit (runaway)
use super::CSTR::{ReactorParameters, ReactorState};
use super::reactor_error::ReactorError;
use serde::{Deserialize, Serialize};

/// Hook consulted by `ReactorModel::try_step` before a new state is committed.
pub trait StateValidator: Send + Sync {
    fn validate(&self, state: &ReactorState, params: &ReactorParameters) -> Result<(), ReactorError>;
}

impl<F> StateValidator for F
where
    F: Fn(&ReactorState, &ReactorParameters) -> Result<(), ReactorError> + Send + Sync,
{
    fn validate(&self, state: &ReactorState, params: &ReactorParameters) -> Result<(), ReactorError> {
        self(state, params)
    }
}

/// Which lower bound on the volume raises an alarm
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum VolumeFloor {
    /// V <= 0 (division by zero in the balances)
    Zero,
    /// V < Vmin (outlet flow reverses)
    MinimumVolume,
    Disabled,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicalLimits {
    pub check_finite: bool,
    pub volume_floor: VolumeFloor,
    pub allow_negative_concentration: bool,
    /// Upper temperature limit [K]
    pub max_temperature: Option<f64>,
}

impl Default for PhysicalLimits {
    fn default() -> Self {
        Self {
            check_finite: true,
            volume_floor: VolumeFloor::Zero,
            allow_negative_concentration: false,
            max_temperature: None,
        }
    }
}

impl PhysicalLimits {
    /// Alarm on V < Vmin instead of V <= 0
    pub fn strict() -> Self {
        Self {
            volume_floor: VolumeFloor::MinimumVolume,
            ..Self::default()
        }
    }

    pub fn with_max_temperature(mut self, limit: f64) -> Self {
        self.max_temperature = Some(limit);
        self
    }
}

impl StateValidator for PhysicalLimits {
    fn validate(&self, state: &ReactorState, params: &ReactorParameters) -> Result<(), ReactorError> {
        if self.check_finite {
            let variables = [
                ("volume", state.volume),
                ("concentration", state.concentration),
                ("temperature", state.temperature),
                ("jacket_temperature", state.jacket_temperature),
            ];
            for (variable, value) in variables {
                if !value.is_finite() {
                    return Err(ReactorError::NonFinite { variable, value });
                }
            }
        }
        match self.volume_floor {
            VolumeFloor::Zero if state.volume <= 0.0 => {
                return Err(ReactorError::VolumeCollapse {
                    volume: state.volume,
                    v_min: 0.0,
                });
            }
            VolumeFloor::MinimumVolume if state.volume < params.Vmin => {
                return Err(ReactorError::VolumeCollapse {
                    volume: state.volume,
                    v_min: params.Vmin,
                });
            }
            _ => {}
        }
        if !self.allow_negative_concentration && state.concentration < 0.0 {
            return Err(ReactorError::NegativeConcentration(state.concentration));
        }
        if let Some(limit) = self.max_temperature {
            if state.temperature > limit {
                return Err(ReactorError::TemperatureLimit {
                    temperature: state.temperature,
                    limit,
                });
            }
        }
        Ok(())
    }
}
