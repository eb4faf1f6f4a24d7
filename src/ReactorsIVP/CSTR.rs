//! # Jacketed CSTR Model
//!
//! State container, parameter snapshot, derivative equations, RK4 driver and diagnostics of a
//! continuously stirred tank reactor with variable volume and a cooling jacket.
//!
//! ## Usage Pattern
//! 1. `ReactorModel::new(initial_state, parameters)` - both are copied into the model
//! 2. `step()` - advance by `dt`, returns a copy of the new state
//! 3. `update_parameters()` between steps - partial merge, state untouched
//! 4. diagnostics: `conversion()`, `residence_time()`, `heat_removal_rate()`,
//!    `reaction_rate()`, `outlet_flow()`
//!
//! ## Example
//! ```rust
//! use cstr_sim::ReactorsIVP::CSTR::{ParametersUpdate, ReactorModel, ReactorParameters, ReactorState};
//!
//! let state = ReactorState::new(1.0, 0.5, 350.0, 300.0);
//! let params = ReactorParameters {
//!     F0: 1.0, CA0: 0.5, T0: 350.0, TJ0: 300.0, KV: 0.1, Vmin: 0.1,
//!     alpha: 1.0, E: 10000.0, R: 8.314, n: 2.0, rho: 1000.0, Cp: 4.18,
//!     lambda: 1.0, U: 100.0, AH: 1.0, rhoJ: 1000.0, CJ: 4.18, VJ: 0.1, FJ: 0.1,
//! };
//! let mut reactor = ReactorModel::new(state, params);
//! let new_state = reactor.step();
//! assert!(new_state.volume > 1.0);
//! reactor.update_parameters(&ParametersUpdate { FJ: Some(0.5), ..Default::default() });
//! println!("conversion: {:.3} %", reactor.conversion());
//! ```
use super::reactor_error::ReactorError;
use super::rk4::rk4_step;
use super::validation::StateValidator;
use nalgebra::Vector4;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Fixed integration step of the model [s]
pub const DT: f64 = 0.1;

/// State vector layout: (V, CA, T, TJ)
pub type StateVector = Vector4<f64>;

/// Names of the state variables in the order of `StateVector`
pub const STATE_NAMES: [&str; 4] = ["V", "CA", "T", "TJ"];

/// Physical state of the reactor
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ReactorState {
    /// Liquid volume [m³]
    pub volume: f64,
    /// Reactant concentration [mol/m³]
    pub concentration: f64,
    /// Reactor temperature [K]
    pub temperature: f64,
    /// Jacket temperature [K]
    pub jacket_temperature: f64,
    /// Elapsed simulated time [s]
    #[serde(default)]
    pub time: f64,
}

impl ReactorState {
    /// state at t = 0
    pub fn new(volume: f64, concentration: f64, temperature: f64, jacket_temperature: f64) -> Self {
        Self {
            volume,
            concentration,
            temperature,
            jacket_temperature,
            time: 0.0,
        }
    }

    pub fn as_vector(&self) -> StateVector {
        Vector4::new(
            self.volume,
            self.concentration,
            self.temperature,
            self.jacket_temperature,
        )
    }

    pub fn from_vector(x: &StateVector, time: f64) -> Self {
        Self {
            volume: x[0],
            concentration: x[1],
            temperature: x[2],
            jacket_temperature: x[3],
            time,
        }
    }
}

impl fmt::Display for ReactorState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "t = {:.2} s, V = {:.5} m3, CA = {:.5} mol/m3, T = {:.3} K, TJ = {:.3} K",
            self.time, self.volume, self.concentration, self.temperature, self.jacket_temperature
        )
    }
}

/// Static physical constants of the reactor, feed, reaction and cooling jacket.
///
/// No defaults are provided here: the caller (task file, CLI) supplies every value.
#[allow(non_snake_case)]
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ReactorParameters {
    /// Feed flow rate [m³/s]
    pub F0: f64,
    /// Feed concentration [mol/m³]
    pub CA0: f64,
    /// Feed temperature [K]
    pub T0: f64,
    /// Jacket inlet temperature [K]
    pub TJ0: f64,
    /// Outlet valve constant [1/s]
    pub KV: f64,
    /// Minimum volume (outlet level) [m³]
    pub Vmin: f64,
    /// Arrhenius pre-exponential factor (units depend on reaction order)
    pub alpha: f64,
    /// Activation energy [J/mol]
    pub E: f64,
    /// Gas constant [J/(mol·K)]
    pub R: f64,
    /// Reaction order
    pub n: f64,
    /// Liquid density [kg/m³]
    pub rho: f64,
    /// Liquid heat capacity [J/(kg·K)]
    pub Cp: f64,
    /// Heat of reaction [J/mol]
    pub lambda: f64,
    /// Heat transfer coefficient [W/(m²·K)]
    pub U: f64,
    /// Heat transfer area [m²]
    pub AH: f64,
    /// Coolant density [kg/m³]
    pub rhoJ: f64,
    /// Coolant heat capacity [J/(kg·K)]
    pub CJ: f64,
    /// Jacket volume [m³]
    pub VJ: f64,
    /// Coolant flow rate [m³/s]
    pub FJ: f64,
}

/// Partial parameter update: `None` leaves the field unchanged
#[allow(non_snake_case)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParametersUpdate {
    pub F0: Option<f64>,
    pub CA0: Option<f64>,
    pub T0: Option<f64>,
    pub TJ0: Option<f64>,
    pub KV: Option<f64>,
    pub Vmin: Option<f64>,
    pub alpha: Option<f64>,
    pub E: Option<f64>,
    pub R: Option<f64>,
    pub n: Option<f64>,
    pub rho: Option<f64>,
    pub Cp: Option<f64>,
    pub lambda: Option<f64>,
    pub U: Option<f64>,
    pub AH: Option<f64>,
    pub rhoJ: Option<f64>,
    pub CJ: Option<f64>,
    pub VJ: Option<f64>,
    pub FJ: Option<f64>,
}

impl ParametersUpdate {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Sets a single field by its name, as used in task files and the CLI.
    pub fn set(&mut self, name: &str, value: f64) -> Result<(), ReactorError> {
        let field = match name {
            "F0" => &mut self.F0,
            "CA0" => &mut self.CA0,
            "T0" => &mut self.T0,
            "TJ0" => &mut self.TJ0,
            "KV" => &mut self.KV,
            "Vmin" => &mut self.Vmin,
            "alpha" => &mut self.alpha,
            "E" => &mut self.E,
            "R" => &mut self.R,
            "n" => &mut self.n,
            "rho" => &mut self.rho,
            "Cp" => &mut self.Cp,
            "lambda" => &mut self.lambda,
            "U" => &mut self.U,
            "AH" => &mut self.AH,
            "rhoJ" => &mut self.rhoJ,
            "CJ" => &mut self.CJ,
            "VJ" => &mut self.VJ,
            "FJ" => &mut self.FJ,
            _ => {
                return Err(ReactorError::InvalidSettings(format!(
                    "unknown parameter '{}'",
                    name
                )));
            }
        };
        *field = Some(value);
        Ok(())
    }
}

impl ReactorParameters {
    /// Returns a copy with the fields present in `update` replaced.
    pub fn merged(&self, update: &ParametersUpdate) -> Self {
        Self {
            F0: update.F0.unwrap_or(self.F0),
            CA0: update.CA0.unwrap_or(self.CA0),
            T0: update.T0.unwrap_or(self.T0),
            TJ0: update.TJ0.unwrap_or(self.TJ0),
            KV: update.KV.unwrap_or(self.KV),
            Vmin: update.Vmin.unwrap_or(self.Vmin),
            alpha: update.alpha.unwrap_or(self.alpha),
            E: update.E.unwrap_or(self.E),
            R: update.R.unwrap_or(self.R),
            n: update.n.unwrap_or(self.n),
            rho: update.rho.unwrap_or(self.rho),
            Cp: update.Cp.unwrap_or(self.Cp),
            lambda: update.lambda.unwrap_or(self.lambda),
            U: update.U.unwrap_or(self.U),
            AH: update.AH.unwrap_or(self.AH),
            rhoJ: update.rhoJ.unwrap_or(self.rhoJ),
            CJ: update.CJ.unwrap_or(self.CJ),
            VJ: update.VJ.unwrap_or(self.VJ),
            FJ: update.FJ.unwrap_or(self.FJ),
        }
    }

    /// name, value, units - for tables
    pub fn as_table_rows(&self) -> Vec<(&'static str, f64, &'static str)> {
        vec![
            ("F0", self.F0, "m3/s"),
            ("CA0", self.CA0, "mol/m3"),
            ("T0", self.T0, "K"),
            ("TJ0", self.TJ0, "K"),
            ("KV", self.KV, "1/s"),
            ("Vmin", self.Vmin, "m3"),
            ("alpha", self.alpha, "-"),
            ("E", self.E, "J/mol"),
            ("R", self.R, "J/mol/K"),
            ("n", self.n, "-"),
            ("rho", self.rho, "kg/m3"),
            ("Cp", self.Cp, "J/kg/K"),
            ("lambda", self.lambda, "J/mol"),
            ("U", self.U, "W/m2/K"),
            ("AH", self.AH, "m2"),
            ("rhoJ", self.rhoJ, "kg/m3"),
            ("CJ", self.CJ, "J/kg/K"),
            ("VJ", self.VJ, "m3"),
            ("FJ", self.FJ, "m3/s"),
        ]
    }
}

/// Outlet flow through the level-driven valve, F = KV·(V - Vmin); negative below Vmin
pub fn outlet_flow(volume: f64, p: &ReactorParameters) -> f64 {
    p.KV * (volume - p.Vmin)
}

/// Arrhenius rate constant k = α·exp(-E/(R·T))
pub fn rate_constant(temperature: f64, p: &ReactorParameters) -> f64 {
    p.alpha * (-p.E / (p.R * temperature)).exp()
}

/// Reaction rate r = k·CA^n
pub fn reaction_rate(concentration: f64, temperature: f64, p: &ReactorParameters) -> f64 {
    rate_constant(temperature, p) * concentration.powf(p.n)
}

/// Right-hand side f(x) of the model for x = (V, CA, T, TJ).
#[allow(non_snake_case)]
pub fn cstr_derivatives(x: &StateVector, p: &ReactorParameters) -> StateVector {
    let (V, CA, T, TJ) = (x[0], x[1], x[2], x[3]);
    let F = outlet_flow(V, p);
    let r = reaction_rate(CA, T, p);
    let rhoCp = p.rho * p.Cp;
    let rhoJCJ = p.rhoJ * p.CJ;
    let heat_transfer = p.U * p.AH * (T - TJ);

    let dV = p.F0 - F;
    let dCA = (p.F0 * p.CA0 - F * CA - V * r) / V;
    let dT = (rhoCp * (p.F0 * p.T0 - F * T) - p.lambda * V * r - heat_transfer) / (rhoCp * V);
    let dTJ = (p.FJ * rhoJCJ * (p.TJ0 - TJ) + heat_transfer) / (rhoJCJ * p.VJ);
    Vector4::new(dV, dCA, dT, dTJ)
}

/// Dynamic CSTR model: owns one state and one parameter snapshot.
#[derive(Clone)]
pub struct ReactorModel {
    state: ReactorState,
    parameters: ReactorParameters,
    dt: f64,
    validator: Option<Arc<dyn StateValidator>>,
}

impl fmt::Debug for ReactorModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReactorModel")
            .field("state", &self.state)
            .field("parameters", &self.parameters)
            .field("dt", &self.dt)
            .field("validator", &self.validator.is_some())
            .finish()
    }
}

impl ReactorModel {
    /// Creates a model with the standard step `DT`. No validation is performed.
    pub fn new(initial_state: ReactorState, parameters: ReactorParameters) -> Self {
        Self::with_time_step(initial_state, parameters, DT)
    }

    /// Same as `new` with a different fixed step; the step never changes afterwards.
    pub fn with_time_step(initial_state: ReactorState, parameters: ReactorParameters, dt: f64) -> Self {
        Self {
            state: initial_state,
            parameters,
            dt,
            validator: None,
        }
    }

    pub fn dt(&self) -> f64 {
        self.dt
    }

    pub fn get_state(&self) -> ReactorState {
        self.state
    }

    pub fn get_parameters(&self) -> ReactorParameters {
        self.parameters
    }

    /// Merges the given fields into the parameter set; the state is left untouched.
    pub fn update_parameters(&mut self, update: &ParametersUpdate) {
        self.parameters = self.parameters.merged(update);
    }

    /// Replaces the whole parameter set.
    pub fn set_parameters(&mut self, parameters: ReactorParameters) {
        self.parameters = parameters;
    }

    /// Installs (or removes with `None`) the validator used by `try_step`.
    pub fn set_validator(&mut self, validator: Option<Arc<dyn StateValidator>>) {
        self.validator = validator;
    }

    pub fn has_validator(&self) -> bool {
        self.validator.is_some()
    }

    /// f(x) at the current state
    pub fn derivatives(&self) -> StateVector {
        cstr_derivatives(&self.state.as_vector(), &self.parameters)
    }

    fn integrate(&self) -> ReactorState {
        let params = self.parameters;
        let x1 = rk4_step(&self.state.as_vector(), self.dt, |x| cstr_derivatives(x, &params));
        ReactorState::from_vector(&x1, self.state.time + self.dt)
    }

    /// Advances the model by exactly `dt`. Non-finite values are propagated, never reported.
    pub fn step(&mut self) -> ReactorState {
        self.state = self.integrate();
        self.state
    }

    /// Like `step`, but the candidate state is checked by the installed validator first.
    /// On failure nothing is committed: state and time stay where they were.
    pub fn try_step(&mut self) -> Result<ReactorState, ReactorError> {
        let candidate = self.integrate();
        if let Some(validator) = &self.validator {
            validator.validate(&candidate, &self.parameters)?;
        }
        self.state = candidate;
        Ok(self.state)
    }

    ///////////////////////////////DIAGNOSTICS//////////////////////////////////////

    /// Conversion of the feed reactant, %; 0 when CA0 = 0
    #[allow(non_snake_case)]
    pub fn conversion(&self) -> f64 {
        let CA0 = self.parameters.CA0;
        if CA0 == 0.0 {
            return 0.0;
        }
        (CA0 - self.state.concentration) / CA0 * 100.0
    }

    /// V/F [s], 0 when the outlet flow is not positive
    #[allow(non_snake_case)]
    pub fn residence_time(&self) -> f64 {
        let F = self.outlet_flow();
        if F > 0.0 { self.state.volume / F } else { 0.0 }
    }

    /// Heat removed by the jacket [kW]
    pub fn heat_removal_rate(&self) -> f64 {
        let p = &self.parameters;
        p.U * p.AH * (self.state.temperature - self.state.jacket_temperature) / 1000.0
    }

    pub fn rate_constant(&self) -> f64 {
        rate_constant(self.state.temperature, &self.parameters)
    }

    /// r = k·CA^n at the current state [mol/(m³·s)]
    pub fn reaction_rate(&self) -> f64 {
        reaction_rate(self.state.concentration, self.state.temperature, &self.parameters)
    }

    /// Outlet flow at the current volume [m³/s]
    pub fn outlet_flow(&self) -> f64 {
        outlet_flow(self.state.volume, &self.parameters)
    }
}
