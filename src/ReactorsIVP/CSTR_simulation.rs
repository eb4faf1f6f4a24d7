//! # CSTR Simulation Driver
//!
//! Caller-side loop around [`ReactorModel`]: the model only knows how to advance by one step,
//! this module decides how many steps are taken per tick, keeps the history of diagnostics for
//! charts and files, applies scheduled parameter changes and collects operational alarms.
//!
//! ## Key Features
//! - **Speed multiplier**: 1, 2, 5 or 10 model steps per tick
//! - **History buffer**: one `SimulationRecord` per tick, optionally bounded (oldest dropped)
//! - **Scheduled updates**: partial parameter merges applied when the simulated time is reached
//! - **Alarms**: with a validator installed every step goes through `try_step`; violations are
//!   logged and either stop the run or are recorded while the run goes on
//! - **Postprocessing**: plots and txt/csv export of the history
use super::CSTR::{ParametersUpdate, ReactorModel, ReactorState};
use super::reactor_error::ReactorError;
use RustedSciThe::Utils::logger::{save_matrix_to_csv, save_matrix_to_file};
use RustedSciThe::Utils::plots::{plots, plots_gnulot, plots_terminal};
use log::{debug, info, warn};
use nalgebra::{DMatrix, DVector};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// Number of model steps per tick
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub enum SimulationSpeed {
    #[default]
    X1,
    X2,
    X5,
    X10,
}

impl SimulationSpeed {
    pub fn steps_per_tick(self) -> usize {
        match self {
            SimulationSpeed::X1 => 1,
            SimulationSpeed::X2 => 2,
            SimulationSpeed::X5 => 5,
            SimulationSpeed::X10 => 10,
        }
    }
}

impl TryFrom<u32> for SimulationSpeed {
    type Error = ReactorError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(SimulationSpeed::X1),
            2 => Ok(SimulationSpeed::X2),
            5 => Ok(SimulationSpeed::X5),
            10 => Ok(SimulationSpeed::X10),
            other => Err(ReactorError::InvalidSpeed(other)),
        }
    }
}

impl From<SimulationSpeed> for u32 {
    fn from(speed: SimulationSpeed) -> u32 {
        speed.steps_per_tick() as u32
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationSettings {
    /// Simulated time to reach [s], absolute (not counted from the start time)
    pub t_end: f64,
    pub speed: SimulationSpeed,
    /// Maximum number of records kept, None - unbounded
    pub history_len: Option<usize>,
    pub stop_on_alarm: bool,
}

impl Default for SimulationSettings {
    fn default() -> Self {
        Self {
            t_end: 100.0,
            speed: SimulationSpeed::X1,
            history_len: None,
            stop_on_alarm: false,
        }
    }
}

impl SimulationSettings {
    pub fn check(&self) -> Result<(), ReactorError> {
        if !(self.t_end.is_finite() && self.t_end > 0.0) {
            return Err(ReactorError::InvalidSettings(format!(
                "t_end must be positive, got {}",
                self.t_end
            )));
        }
        if self.history_len == Some(0) {
            return Err(ReactorError::InvalidSettings(
                "history_len must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// Partial parameter merge applied once the simulated time reaches `at`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScheduledUpdate {
    /// [s]
    pub at: f64,
    pub update: ParametersUpdate,
}

/// One row of the history: state and diagnostics after a tick
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SimulationRecord {
    pub time: f64,
    pub volume: f64,
    pub concentration: f64,
    pub temperature: f64,
    pub jacket_temperature: f64,
    /// %
    pub conversion: f64,
    /// s
    pub residence_time: f64,
    /// kW
    pub heat_removal_rate: f64,
    /// mol/(m³·s)
    pub reaction_rate: f64,
    /// m³/s
    pub outlet_flow: f64,
}

/// Column names of `SimulationRecord` values (time excluded)
pub const RECORD_NAMES: [&str; 9] = [
    "V",
    "CA",
    "T",
    "TJ",
    "conversion",
    "residence_time",
    "heat_removal",
    "reaction_rate",
    "F",
];

impl SimulationRecord {
    pub fn from_model(model: &ReactorModel) -> Self {
        let state = model.get_state();
        Self {
            time: state.time,
            volume: state.volume,
            concentration: state.concentration,
            temperature: state.temperature,
            jacket_temperature: state.jacket_temperature,
            conversion: model.conversion(),
            residence_time: model.residence_time(),
            heat_removal_rate: model.heat_removal_rate(),
            reaction_rate: model.reaction_rate(),
            outlet_flow: model.outlet_flow(),
        }
    }

    /// values in the order of `RECORD_NAMES`
    pub fn values(&self) -> [f64; 9] {
        [
            self.volume,
            self.concentration,
            self.temperature,
            self.jacket_temperature,
            self.conversion,
            self.residence_time,
            self.heat_removal_rate,
            self.reaction_rate,
            self.outlet_flow,
        ]
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Alarm {
    /// simulated time of the rejected step [s]
    pub time: f64,
    pub message: String,
}

pub struct CSTRSimulation {
    pub model: ReactorModel,
    pub settings: SimulationSettings,
    history: VecDeque<SimulationRecord>,
    schedule: VecDeque<ScheduledUpdate>,
    alarms: Vec<Alarm>,
    steps_done: usize,
    /// simulated time of the initial state [s]
    start_time: f64,
    /// the rejected step that stopped the run; stays set once a run is halted
    halted: Option<Alarm>,
    halt_error: Option<ReactorError>,
}

impl CSTRSimulation {
    /// The initial state is recorded right away.
    pub fn new(model: ReactorModel, settings: SimulationSettings) -> Self {
        let start_time = model.get_state().time;
        let mut simulation = Self {
            model,
            settings,
            history: VecDeque::new(),
            schedule: VecDeque::new(),
            alarms: Vec::new(),
            steps_done: 0,
            start_time,
            halted: None,
            halt_error: None,
        };
        simulation.record();
        simulation
    }

    pub fn set_schedule(&mut self, mut updates: Vec<ScheduledUpdate>) {
        updates.sort_by(|a, b| a.at.total_cmp(&b.at));
        self.schedule = updates.into();
    }

    pub fn update_parameters(&mut self, update: &ParametersUpdate) {
        self.model.update_parameters(update);
    }

    pub fn set_speed(&mut self, speed: SimulationSpeed) {
        self.settings.speed = speed;
    }

    pub fn start_time(&self) -> f64 {
        self.start_time
    }

    /// Steps from the start time to `t_end`, 0 when `t_end` is not after the start.
    pub fn total_steps(&self) -> usize {
        let steps = ((self.settings.t_end - self.start_time) / self.model.dt()).round();
        if steps > 0.0 { steps as usize } else { 0 }
    }

    pub fn steps_done(&self) -> usize {
        self.steps_done
    }

    pub fn is_halted(&self) -> bool {
        self.halted.is_some()
    }

    pub fn is_finished(&self) -> bool {
        self.is_halted() || self.steps_done >= self.total_steps()
    }

    pub fn history(&self) -> &VecDeque<SimulationRecord> {
        &self.history
    }

    pub fn alarms(&self) -> &[Alarm] {
        &self.alarms
    }

    pub fn state(&self) -> ReactorState {
        self.model.get_state()
    }

    fn record(&mut self) {
        if let Some(capacity) = self.settings.history_len {
            while self.history.len() >= capacity && !self.history.is_empty() {
                self.history.pop_front();
            }
        }
        self.history.push_back(SimulationRecord::from_model(&self.model));
    }

    fn apply_due_updates(&mut self) {
        let time = self.model.get_state().time;
        let half_step = 0.5 * self.model.dt();
        while let Some(next) = self.schedule.front() {
            if next.at > time + half_step {
                break;
            }
            info!("t = {:.2} s: applying scheduled parameter update {:?}", time, next.update);
            self.model.update_parameters(&next.update);
            self.schedule.pop_front();
        }
    }

    /// single model step; false when the simulation is halted by an alarm
    fn advance(&mut self) -> bool {
        if self.is_halted() {
            return false;
        }
        self.apply_due_updates();
        if !self.model.has_validator() {
            self.model.step();
            self.steps_done += 1;
            return true;
        }
        match self.model.try_step() {
            Ok(_) => {
                self.steps_done += 1;
                true
            }
            Err(e) => {
                let time = self.model.get_state().time + self.model.dt();
                warn!("t = {:.2} s: {}", time, e);
                self.alarms.push(Alarm {
                    time,
                    message: e.to_string(),
                });
                if self.settings.stop_on_alarm {
                    self.halted = self.alarms.last().cloned();
                    self.halt_error = Some(e);
                    false
                } else {
                    self.model.step();
                    self.steps_done += 1;
                    true
                }
            }
        }
    }

    /// Performs `speed` steps (fewer if halted) and records the result.
    pub fn tick(&mut self) -> ReactorState {
        for _ in 0..self.settings.speed.steps_per_tick() {
            if !self.advance() {
                break;
            }
        }
        self.record();
        self.model.get_state()
    }

    /// Ticks until `t_end`; the last tick is shortened so exactly `total_steps()` are made.
    /// A halted simulation stays halted: later calls return the halt again without stepping.
    pub fn run(&mut self) -> Result<ReactorState, ReactorError> {
        self.settings.check()?;
        if self.settings.t_end <= self.start_time {
            return Err(ReactorError::InvalidSettings(format!(
                "t_end = {} s is not after the start time {} s",
                self.settings.t_end, self.start_time
            )));
        }
        let total = self.total_steps();
        info!(
            "simulation started: {} steps of {} s, {} steps per tick",
            total,
            self.model.dt(),
            self.settings.speed.steps_per_tick()
        );
        while !self.is_finished() {
            let n = self
                .settings
                .speed
                .steps_per_tick()
                .min(total - self.steps_done);
            for _ in 0..n {
                if !self.advance() {
                    break;
                }
            }
            self.record();
            debug!("{}", self.model.get_state());
        }
        if let Some(alarm) = &self.halted {
            warn!("simulation halted after {} steps", self.steps_done);
            return Err(self.halt_error.take().unwrap_or_else(|| ReactorError::Halted {
                time: alarm.time,
                message: alarm.message.clone(),
            }));
        }
        info!(
            "simulation finished: {}, {} alarm(s)",
            self.model.get_state(),
            self.alarms.len()
        );
        Ok(self.model.get_state())
    }

    pub fn peak_temperature(&self) -> Option<SimulationRecord> {
        self.history
            .iter()
            .copied()
            .max_by(|a, b| a.temperature.total_cmp(&b.temperature))
    }

    ////////////////////////////////////////////////I/O/////////////////////////////////////////////////////

    /// time column, records × variables matrix and variable names
    pub fn result_matrix(&self) -> (DVector<f64>, DMatrix<f64>, Vec<String>) {
        let t = DVector::from_iterator(self.history.len(), self.history.iter().map(|r| r.time));
        let y = DMatrix::from_fn(self.history.len(), RECORD_NAMES.len(), |i, j| {
            self.history[i].values()[j]
        });
        let names = RECORD_NAMES.iter().map(|s| s.to_string()).collect();
        (t, y, names)
    }

    pub fn plot(&self) {
        let (t, y, values) = self.result_matrix();
        plots("t".to_owned(), values, t, y);
    }

    pub fn gnuplot(&self) {
        let (t, y, values) = self.result_matrix();
        plots_gnulot("t".to_owned(), values, t, y);
    }

    /// state variables only, the diagnostics have very different scales
    pub fn plot_in_terminal(&self) {
        let (t, y, values) = self.result_matrix();
        let y = y.columns(0, 4).into_owned();
        plots_terminal("t".to_string(), values[..4].to_vec(), t, y);
    }

    pub fn save_to_file(&self, filename: Option<String>) {
        let name = if let Some(name) = filename {
            format!("{}.txt", name)
        } else {
            "result.txt".to_string()
        };
        let (t, y, values) = self.result_matrix();
        let arg_name = "t".to_string();
        if save_matrix_to_file(&y, &values, &name, &t, &arg_name).is_err() {
            warn!("failed to save results to {}", name);
        } else {
            info!("results saved to {}", name);
        }
    }

    pub fn save_to_csv(&self, filename: Option<String>) {
        let name = if let Some(name) = filename {
            name
        } else {
            "result_table".to_string()
        };
        let (t, y, values) = self.result_matrix();
        let arg_name = "t".to_string();
        if save_matrix_to_csv(&y, &values, &name, &t, &arg_name).is_err() {
            warn!("failed to save results to {}", name);
        } else {
            info!("results saved to {}", name);
        }
    }
}
