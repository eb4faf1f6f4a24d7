//! Logger setup for the command line front end: colored terminal output plus an optional
//! plain-text log file.
use crate::ReactorsIVP::reactor_error::ReactorError;
use log::LevelFilter;
use simplelog::{
    ColorChoice, CombinedLogger, Config, ConfigBuilder, SharedLogger, TermLogger, TerminalMode,
    WriteLogger,
};
use std::fs::File;

fn log_config() -> Config {
    ConfigBuilder::new()
        .set_time_level(LevelFilter::Debug)
        .set_target_level(LevelFilter::Off)
        .build()
}

pub fn build_loggers(
    level: LevelFilter,
    log_file: Option<&str>,
) -> Result<Vec<Box<dyn SharedLogger>>, ReactorError> {
    let mut loggers: Vec<Box<dyn SharedLogger>> = vec![TermLogger::new(
        level,
        log_config(),
        TerminalMode::Mixed,
        ColorChoice::Auto,
    )];
    if let Some(path) = log_file {
        let file = File::create(path)?;
        // the file always gets the full picture of the run
        loggers.push(WriteLogger::new(LevelFilter::Debug, log_config(), file));
    }
    Ok(loggers)
}

/// Installs the global logger. Can only succeed once per process.
pub fn init_logger(level: LevelFilter, log_file: Option<&str>) -> Result<(), ReactorError> {
    CombinedLogger::init(build_loggers(level, log_file)?)?;
    Ok(())
}
