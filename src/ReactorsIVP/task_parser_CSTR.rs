//! # Task Parser for CSTR Simulations
//!
//! A complete simulation run is described by one JSON document:
//!
//! ```json
//! {
//!   "problem_name": "reference",
//!   "problem_description": null,
//!   "initial_state": { "volume": 1.0, "concentration": 0.5, "temperature": 350.0, "jacket_temperature": 300.0 },
//!   "parameters": { "F0": 1.0, "CA0": 0.5, "...": "all 19 fields" },
//!   "parameter_updates": [ { "at": 50.0, "update": { "FJ": 0.5 } } ],
//!   "simulation": { "t_end": 100.0, "speed": 5, "history_len": null, "stop_on_alarm": false, "validate": true },
//!   "postprocessing": { "plot": false, "gnuplot": false, "plot_in_terminal": true, "save": false, "save_to_csv": true, "filename": "cstr_result" }
//! }
//! ```
//!
//! `initial_state` and `parameters` are mandatory and carry every field: the model has no
//! built-in defaults. Everything else is optional. The values of the template produced by
//! [`create_template`] are the defaults of the interactive front end.
//!
//! ## Main Methods
//! - **`CSTRTask::from_file()`**: read and parse, reporting JSON errors with line and column
//! - **`CSTRTask::check_task()`**: consistency checks of the run settings
//! - **`CSTRTask::build_simulation()`**: model + driver ready to run
//! - **`solve_from_file()`**: file -> parsing -> run -> postprocessing
use super::CSTR::{ReactorModel, ReactorParameters, ReactorState};
use super::CSTR_simulation::{CSTRSimulation, ScheduledUpdate, SimulationSettings, SimulationSpeed};
use super::reactor_error::ReactorError;
use super::validation::PhysicalLimits;
use log::{error, info, warn};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::sync::Arc;

/// Default file name of the generated template
pub const TEMPLATE_FILE: &str = "cstr_task_template.json";

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RunSettings {
    #[serde(flatten)]
    pub simulation: SimulationSettings,
    /// attach the validator to the model
    pub validate: bool,
    pub limits: PhysicalLimits,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Postprocessing {
    pub plot: bool,
    pub gnuplot: bool,
    pub plot_in_terminal: bool,
    pub save: bool,
    pub save_to_csv: bool,
    pub filename: Option<String>,
    /// print every n-th history record, 0 - no table
    pub print_every: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CSTRTask {
    #[serde(default)]
    pub problem_name: Option<String>,
    #[serde(default)]
    pub problem_description: Option<String>,
    pub initial_state: ReactorState,
    pub parameters: ReactorParameters,
    #[serde(default)]
    pub parameter_updates: Vec<ScheduledUpdate>,
    #[serde(default)]
    pub simulation: RunSettings,
    #[serde(default)]
    pub postprocessing: Postprocessing,
}

impl CSTRTask {
    /// Reference scenario used for the template and the interactive run
    pub fn template() -> Self {
        Self {
            problem_name: Some("reference".to_string()),
            problem_description: Some(
                "Jacketed CSTR with variable volume, second order reaction".to_string(),
            ),
            initial_state: ReactorState::new(1.0, 0.5, 350.0, 300.0),
            parameters: ReactorParameters {
                F0: 1.0,
                CA0: 0.5,
                T0: 350.0,
                TJ0: 300.0,
                KV: 0.1,
                Vmin: 0.1,
                alpha: 1.0,
                E: 10000.0,
                R: 8.314,
                n: 2.0,
                rho: 1000.0,
                Cp: 4.18,
                lambda: 1.0,
                U: 100.0,
                AH: 1.0,
                rhoJ: 1000.0,
                CJ: 4.18,
                VJ: 0.1,
                FJ: 0.1,
            },
            parameter_updates: Vec::new(),
            simulation: RunSettings {
                simulation: SimulationSettings {
                    t_end: 100.0,
                    speed: SimulationSpeed::X5,
                    history_len: None,
                    stop_on_alarm: false,
                },
                validate: true,
                limits: PhysicalLimits::default(),
            },
            postprocessing: Postprocessing {
                plot_in_terminal: true,
                save_to_csv: true,
                filename: Some("cstr_result".to_string()),
                print_every: 10,
                ..Postprocessing::default()
            },
        }
    }

    /// Parses a task from a JSON string; `source` is only used in messages.
    pub fn from_json(content: &str, source: &str) -> Result<Self, ReactorError> {
        match serde_json::from_str::<CSTRTask>(content) {
            Ok(task) => {
                info!("Successfully parsed CSTR task from '{}'", source);
                Ok(task)
            }
            Err(e) => {
                let line = e.line();
                let column = e.column();
                let message = format!("error at line {}, column {}: {}", line, column, e);
                error!("{}", message);
                if let Some(problem_line) = content.lines().nth(line.saturating_sub(1)) {
                    error!("Problematic line: {}", problem_line);
                    if column >= 1 && column <= problem_line.len() + 1 {
                        error!("{}^", " ".repeat(column - 1));
                    }
                }
                Err(ReactorError::TaskFile {
                    path: source.to_string(),
                    message,
                })
            }
        }
    }

    pub fn from_file(path: &Path) -> Result<Self, ReactorError> {
        let source = path.display().to_string();
        if !path.exists() {
            return Err(ReactorError::TaskFile {
                path: source,
                message: "file does not exist".to_string(),
            });
        }
        let content = fs::read_to_string(path)?;
        Self::from_json(&content, &source)
    }

    pub fn to_file(&self, path: &Path) -> Result<(), ReactorError> {
        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }

    /// Checks the run settings and warns about suspicious physical input.
    /// Physical values themselves are never rejected.
    pub fn check_task(&self) -> Result<(), ReactorError> {
        self.simulation.simulation.check()?;
        let start = self.initial_state.time;
        let t_end = self.simulation.simulation.t_end;
        if !start.is_finite() || t_end <= start {
            return Err(ReactorError::InvalidSettings(format!(
                "t_end = {} s must be after the start time {} s",
                t_end, start
            )));
        }
        for update in &self.parameter_updates {
            if !(update.at.is_finite() && update.at >= 0.0) {
                return Err(ReactorError::InvalidSettings(format!(
                    "parameter update time must be non-negative, got {}",
                    update.at
                )));
            }
            if update.at > t_end {
                warn!(
                    "parameter update at t = {} s is after t_end = {} s and will never be applied",
                    update.at, t_end
                );
            } else if update.at < start {
                warn!(
                    "parameter update at t = {} s is before the start time {} s, applied at the first step",
                    update.at, start
                );
            }
        }
        let p = &self.parameters;
        if self.initial_state.volume <= 0.0 {
            warn!("initial volume is not positive: the balances will produce NaN/inf");
        } else if self.initial_state.volume < p.Vmin {
            warn!("initial volume is below Vmin: the outlet flow is negative");
        }
        if self.initial_state.concentration < 0.0 && p.n.fract() != 0.0 {
            warn!("negative concentration with a fractional reaction order gives NaN rates");
        }
        if p.rho * p.Cp == 0.0 || p.rhoJ * p.CJ * p.VJ == 0.0 {
            warn!("zero heat capacity term: temperature derivatives are singular");
        }
        Ok(())
    }

    pub fn build_model(&self) -> ReactorModel {
        let mut model = ReactorModel::new(self.initial_state, self.parameters);
        if self.simulation.validate {
            model.set_validator(Some(Arc::new(self.simulation.limits)));
        }
        model
    }

    pub fn build_simulation(&self) -> Result<CSTRSimulation, ReactorError> {
        self.check_task()?;
        let mut simulation = CSTRSimulation::new(self.build_model(), self.simulation.simulation.clone());
        simulation.set_schedule(self.parameter_updates.clone());
        Ok(simulation)
    }

    /// Runs the task and performs the requested postprocessing.
    /// A run halted by an alarm is still postprocessed before the error is returned.
    pub fn solve(&self) -> Result<CSTRSimulation, ReactorError> {
        if let Some(name) = &self.problem_name {
            info!("solving task '{}'", name);
        }
        let mut simulation = self.build_simulation()?;
        let result = simulation.run();
        self.postprocess(&simulation);
        result?;
        Ok(simulation)
    }

    pub fn postprocess(&self, simulation: &CSTRSimulation) {
        let post = &self.postprocessing;
        if post.print_every > 0 {
            simulation.pretty_print_history(post.print_every);
        }
        simulation.pretty_print_summary();
        if post.plot {
            simulation.plot();
        }
        if post.gnuplot {
            simulation.gnuplot();
        }
        if post.plot_in_terminal {
            simulation.plot_in_terminal();
        }
        if post.save {
            simulation.save_to_file(post.filename.clone());
        }
        if post.save_to_csv {
            simulation.save_to_csv(post.filename.clone());
        }
    }
}

/// Parses and runs the task stored in `path`.
pub fn solve_from_file(path: &Path) -> Result<CSTRSimulation, ReactorError> {
    let task = CSTRTask::from_file(path)?;
    task.solve()
}

/// Writes the reference task to `TEMPLATE_FILE` in the current directory.
pub fn create_template() -> Result<(), ReactorError> {
    create_template_at(Path::new(TEMPLATE_FILE))
}

pub fn create_template_at(path: &Path) -> Result<(), ReactorError> {
    CSTRTask::template().to_file(path)?;
    info!("template written to {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ReactorsIVP::CSTR::ParametersUpdate;
    use crate::ReactorsIVP::validation::VolumeFloor;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const MINIMAL_TASK: &str = r#"{
        "initial_state": { "volume": 1.0, "concentration": 0.5, "temperature": 350.0, "jacket_temperature": 300.0 },
        "parameters": {
            "F0": 1.0, "CA0": 0.5, "T0": 350.0, "TJ0": 300.0, "KV": 0.1, "Vmin": 0.1,
            "alpha": 1.0, "E": 10000.0, "R": 8.314, "n": 2.0, "rho": 1000.0, "Cp": 4.18,
            "lambda": 1.0, "U": 100.0, "AH": 1.0, "rhoJ": 1000.0, "CJ": 4.18, "VJ": 0.1, "FJ": 0.1
        }
    }"#;

    #[test]
    fn test_minimal_task_uses_defaults() {
        let task = CSTRTask::from_json(MINIMAL_TASK, "inline").unwrap();
        assert_eq!(task.problem_name, None);
        assert_eq!(task.initial_state.time, 0.0);
        assert_eq!(task.parameters, CSTRTask::template().parameters);
        assert_eq!(task.simulation, RunSettings::default());
        assert_eq!(task.postprocessing, Postprocessing::default());
        assert!(task.parameter_updates.is_empty());
        assert!(task.check_task().is_ok());
    }

    #[test]
    fn test_missing_parameter_is_an_error() {
        let broken = MINIMAL_TASK.replace("\"FJ\": 0.1", "\"XX\": 0.1");
        let result = CSTRTask::from_json(&broken, "inline");
        assert!(matches!(result, Err(ReactorError::TaskFile { .. })));
    }

    #[test]
    fn test_syntax_error_reports_position() {
        let broken = MINIMAL_TASK.replace("\"volume\": 1.0,", "\"volume\": 1.0");
        match CSTRTask::from_json(&broken, "inline") {
            Err(ReactorError::TaskFile { message, .. }) => assert!(message.contains("line 2")),
            other => panic!("unexpected result {:?}", other),
        }
    }

    #[test]
    fn test_template_round_trip_through_file() {
        let file = NamedTempFile::new().unwrap();
        create_template_at(file.path()).unwrap();
        let task = CSTRTask::from_file(file.path()).unwrap();
        assert_eq!(task, CSTRTask::template());
        assert_eq!(task.simulation.simulation.speed, SimulationSpeed::X5);
    }

    #[test]
    fn test_nonexistent_file() {
        let result = CSTRTask::from_file(Path::new("definitely_missing_cstr_task.json"));
        assert!(matches!(result, Err(ReactorError::TaskFile { .. })));
    }

    #[test]
    fn test_full_task_with_schedule_and_limits() {
        let mut file = NamedTempFile::new().unwrap();
        let content = MINIMAL_TASK.trim_end().trim_end_matches('}').to_string()
            + r#",
        "problem_name": "cooling step",
        "parameter_updates": [ { "at": 0.5, "update": { "FJ": 0.5, "TJ0": 290.0 } } ],
        "simulation": { "t_end": 1.0, "speed": 2, "validate": true,
                        "limits": { "volume_floor": "MinimumVolume", "max_temperature": 1000.0 } }
    }"#;
        write!(file, "{}", content).unwrap();

        let task = CSTRTask::from_file(file.path()).unwrap();
        assert_eq!(task.problem_name.as_deref(), Some("cooling step"));
        assert_eq!(task.parameter_updates.len(), 1);
        assert_eq!(task.parameter_updates[0].update.FJ, Some(0.5));
        assert_eq!(task.parameter_updates[0].update.U, None);
        assert_eq!(task.simulation.simulation.speed, SimulationSpeed::X2);
        assert_eq!(task.simulation.limits.volume_floor, VolumeFloor::MinimumVolume);
        assert!(task.simulation.limits.check_finite);

        let simulation = task.solve().unwrap();
        assert_eq!(simulation.steps_done(), 10);
        assert_eq!(simulation.model.get_parameters().FJ, 0.5);
        assert_eq!(simulation.model.get_parameters().TJ0, 290.0);
        assert!(simulation.model.has_validator());
    }

    #[test]
    fn test_invalid_speed_rejected() {
        let content = MINIMAL_TASK.trim_end().trim_end_matches('}').to_string()
            + r#", "simulation": { "speed": 3 } }"#;
        assert!(CSTRTask::from_json(&content, "inline").is_err());
    }

    #[test]
    fn test_start_time_and_t_end() {
        let mut task = CSTRTask::template();
        task.initial_state.time = 10.0;
        task.simulation.simulation.t_end = 12.0;
        task.postprocessing = Postprocessing::default();
        task.parameter_updates.push(ScheduledUpdate {
            at: 11.0,
            update: ParametersUpdate {
                FJ: Some(0.5),
                ..Default::default()
            },
        });
        assert!(task.check_task().is_ok());
        let simulation = task.solve().unwrap();
        assert_eq!(simulation.steps_done(), 20);
        assert!((simulation.state().time - 12.0).abs() < 1e-9);
        assert_eq!(simulation.model.get_parameters().FJ, 0.5);

        task.simulation.simulation.t_end = 5.0;
        assert!(matches!(
            task.check_task(),
            Err(ReactorError::InvalidSettings(_))
        ));
        assert!(task.build_simulation().is_err());
    }

    #[test]
    fn test_negative_update_time_rejected() {
        let mut task = CSTRTask::template();
        task.parameter_updates.push(ScheduledUpdate {
            at: -1.0,
            update: Default::default(),
        });
        assert!(matches!(
            task.check_task(),
            Err(ReactorError::InvalidSettings(_))
        ));
    }
}
