use thiserror::Error;

/// error types of the CSTR model, its validation hook and the task-file layer
#[derive(Debug, Error)]
pub enum ReactorError {
    #[error("State variable '{variable}' is not finite: {value}")]
    NonFinite { variable: &'static str, value: f64 },
    #[error("Volume collapsed: V = {volume} m3 (limit {v_min} m3)")]
    VolumeCollapse { volume: f64, v_min: f64 },
    #[error("Negative concentration: CA = {0} mol/m3")]
    NegativeConcentration(f64),
    #[error("Reactor temperature {temperature} K exceeds limit {limit} K")]
    TemperatureLimit { temperature: f64, limit: f64 },
    #[error("Invalid simulation speed {0}: allowed values are 1, 2, 5, 10")]
    InvalidSpeed(u32),
    #[error("Simulation halted at t = {time} s: {message}")]
    Halted { time: f64, message: String },
    #[error("Invalid settings: {0}")]
    InvalidSettings(String),
    #[error("Task file '{path}': {message}")]
    TaskFile { path: String, message: String },
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Logger error: {0}")]
    Logger(#[from] log::SetLoggerError),
}

impl ReactorError {
    /// true for errors produced by a state validator (operational alarms)
    pub fn is_alarm(&self) -> bool {
        matches!(
            self,
            ReactorError::NonFinite { .. }
                | ReactorError::VolumeCollapse { .. }
                | ReactorError::NegativeConcentration(_)
                | ReactorError::TemperatureLimit { .. }
        )
    }
}
