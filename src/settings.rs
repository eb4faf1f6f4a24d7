//! # Settings Module
//!
//! ## Purpose
//! Persistent application settings of the command line front end, stored in `cstr_config.json`
//! in the current directory. A missing or broken file never stops the program: the defaults
//! are used instead.
//!
//! ## Fields
//! | Field | Default | Meaning |
//! |-------|---------|---------|
//! | `log_level` | "info" | terminal log level: off, error, warn, info, debug, trace |
//! | `log_file` | None | optional log file (always written at debug level) |
//! | `task_prefix` | "cstr_task" | prefix of task files picked up by auto-discovery |
use crate::ReactorsIVP::reactor_error::ReactorError;
use log::LevelFilter;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::str::FromStr;

pub const CONFIG_FILE: &str = "cstr_config.json";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppSettings {
    pub log_level: String,
    pub log_file: Option<String>,
    pub task_prefix: String,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_file: None,
            task_prefix: "cstr_task".to_string(),
        }
    }
}

impl AppSettings {
    /// Loads settings from `cstr_config.json`, falling back to defaults.
    pub fn new() -> Self {
        Self::load(Path::new(CONFIG_FILE))
    }

    pub fn load(path: &Path) -> Self {
        Self::load_config(path).unwrap_or_else(|e| {
            // the logger is not installed yet at this point
            eprintln!("cannot read {}: {}, using default settings", path.display(), e);
            Self::default()
        })
    }

    fn load_config(path: &Path) -> Result<Self, ReactorError> {
        if path.exists() {
            let content = fs::read_to_string(path)?;
            let settings: AppSettings = serde_json::from_str(&content)?;
            Ok(settings)
        } else {
            Ok(Self::default())
        }
    }

    pub fn save(&self, path: &Path) -> Result<(), ReactorError> {
        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }

    /// Unknown level names map to Info. Called before the logger exists.
    pub fn level_filter(&self) -> LevelFilter {
        self.parse_level().unwrap_or_else(|| {
            eprintln!("unknown log level '{}', using info", self.log_level);
            LevelFilter::Info
        })
    }

    /// None for an unknown level name
    pub fn parse_level(&self) -> Option<LevelFilter> {
        LevelFilter::from_str(self.log_level.trim()).ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_missing_file_gives_defaults() {
        let settings = AppSettings::load(Path::new("no_such_cstr_config.json"));
        assert_eq!(settings, AppSettings::default());
        assert_eq!(settings.level_filter(), LevelFilter::Info);
    }

    #[test]
    fn test_partial_file() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, r#"{{ "log_level": "Debug" }}"#).unwrap();
        let settings = AppSettings::load(file.path());
        assert_eq!(settings.level_filter(), LevelFilter::Debug);
        assert_eq!(settings.task_prefix, "cstr_task");
        assert_eq!(settings.log_file, None);
    }

    #[test]
    fn test_broken_file_gives_defaults() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "{{ log_level: ").unwrap();
        assert_eq!(AppSettings::load(file.path()), AppSettings::default());
    }

    #[test]
    fn test_save_and_load() {
        let file = NamedTempFile::new().unwrap();
        let settings = AppSettings {
            log_level: "warn".to_string(),
            log_file: Some("cstr.log".to_string()),
            task_prefix: "run".to_string(),
        };
        settings.save(file.path()).unwrap();
        let loaded = AppSettings::load(file.path());
        assert_eq!(loaded, settings);
        assert_eq!(loaded.level_filter(), LevelFilter::Warn);
    }

    #[test]
    fn test_unknown_level() {
        let settings = AppSettings {
            log_level: "loud".to_string(),
            ..AppSettings::default()
        };
        assert_eq!(settings.parse_level(), None);
        assert_eq!(settings.level_filter(), LevelFilter::Info);
    }
}
