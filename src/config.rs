//! Runtime configuration.

use std::path::{Path, PathBuf};

use derive_getters::Getters;
use derive_more::{Display, Error};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

use crate::game::{MatchSettings, Mode};

/// Environment variable overriding the history file location.
pub const HISTORY_PATH_ENV: &str = "RASTROS_HISTORY";

/// Crate configuration, loadable from a TOML file.
#[derive(Debug, Clone, Getters, Serialize, Deserialize)]
pub struct RastrosConfig {
    /// Where the win-history document lives.
    #[serde(default = "default_history_path")]
    history_path: PathBuf,

    /// Default match mode.
    #[serde(default = "default_mode")]
    mode: Mode,

    /// Default difficulty level (1-10).
    #[serde(default = "default_difficulty")]
    difficulty: u8,

    /// Default board row count (5-11).
    #[serde(default = "default_rows")]
    rows: usize,

    /// Default board column count (5-11).
    #[serde(default = "default_cols")]
    cols: usize,
}

fn default_history_path() -> PathBuf {
    PathBuf::from("rastros_history.json")
}

fn default_mode() -> Mode {
    Mode::HumanFirst
}

fn default_difficulty() -> u8 {
    5
}

fn default_rows() -> usize {
    7
}

fn default_cols() -> usize {
    7
}

impl Default for RastrosConfig {
    fn default() -> Self {
        Self {
            history_path: default_history_path(),
            mode: default_mode(),
            difficulty: default_difficulty(),
            rows: default_rows(),
            cols: default_cols(),
        }
    }
}

impl RastrosConfig {
    /// Loads configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when the file cannot be read, parsed, or
    /// holds out-of-range values.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        debug!("Loading config from file");
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::new(format!("Failed to read config file: {e}")))?;

        let config: Self = toml::from_str(&content)
            .map_err(|e| ConfigError::new(format!("Failed to parse config: {e}")))?;
        config.validate()?;

        info!(mode = %config.mode, "Config loaded");
        Ok(config)
    }

    /// Loads from a TOML file when it exists, otherwise the defaults.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when an existing file fails to load.
    pub fn load_or_default(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        if path.as_ref().exists() {
            Self::from_file(path)
        } else {
            debug!("No config file, using defaults");
            Ok(Self::default())
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if !(1..=10).contains(&self.difficulty) {
            return Err(ConfigError::new(format!(
                "difficulty must be 1-10, got {}",
                self.difficulty
            )));
        }
        for (name, value) in [("rows", self.rows), ("cols", self.cols)] {
            if !(5..=11).contains(&value) {
                return Err(ConfigError::new(format!(
                    "{name} must be 5-11, got {value}"
                )));
            }
        }
        Ok(())
    }

    /// The history location, honoring the environment override.
    pub fn resolved_history_path(&self) -> PathBuf {
        std::env::var(HISTORY_PATH_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|_| self.history_path.clone())
    }

    /// Match settings seeded from this configuration.
    pub fn settings(&self) -> MatchSettings {
        MatchSettings::default()
            .with_mode(self.mode)
            .with_difficulty(self.difficulty)
            .with_rows(self.rows)
            .with_cols(self.cols)
    }
}

/// Configuration error with caller location tracking.
#[derive(Debug, Clone, Display, Error)]
#[display("Config error: {} at {}:{}", message, file, line)]
pub struct ConfigError {
    /// Error message.
    pub message: String,
    /// Line number where the error was raised.
    pub line: u32,
    /// Source file where the error was raised.
    pub file: &'static str,
}

impl ConfigError {
    /// Creates a new configuration error with caller location tracking.
    #[track_caller]
    pub fn new(message: impl Into<String>) -> Self {
        let loc = std::panic::Location::caller();
        Self {
            message: message.into(),
            line: loc.line(),
            file: loc.file(),
        }
    }
}
