//! Host-supplied configuration for opening the core.
//!
//! The host app (mobile shell, desktop shell or tests) owns the data
//! directory; the core derives every path from it.

use crate::logging::{default_log_level, normalize_level, LoggingError};
use serde::Deserialize;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;

const DB_FILE_NAME: &str = "pocketnote.sqlite3";
const LOG_DIR_NAME: &str = "logs";

/// Configuration for [`crate::Notebook::open`].
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CoreConfig {
    /// Absolute directory owned by the app for its database and logs.
    pub data_dir: PathBuf,
    #[serde(default = "default_level")]
    pub log_level: String,
    /// Whether `open` starts file logging under `data_dir/logs`.
    #[serde(default = "default_log_to_file")]
    pub log_to_file: bool,
}

fn default_level() -> String {
    default_log_level().to_string()
}

fn default_log_to_file() -> bool {
    true
}

/// Invalid configuration values.
#[derive(Debug)]
pub enum ConfigError {
    EmptyDataDir,
    RelativeDataDir(PathBuf),
    Level(LoggingError),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyDataDir => write!(f, "data_dir cannot be empty"),
            Self::RelativeDataDir(path) => {
                write!(f, "data_dir must be an absolute path, got `{}`", path.display())
            }
            Self::Level(err) => write!(f, "{err}"),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Level(err) => Some(err),
            _ => None,
        }
    }
}

impl CoreConfig {
    /// Configuration with default log level and file logging enabled.
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            log_level: default_level(),
            log_to_file: default_log_to_file(),
        }
    }

    /// Parses a JSON configuration document handed over by the host.
    pub fn from_json(raw: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(raw)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.data_dir.as_os_str().is_empty() {
            return Err(ConfigError::EmptyDataDir);
        }
        if !self.data_dir.is_absolute() {
            return Err(ConfigError::RelativeDataDir(self.data_dir.clone()));
        }
        normalize_level(&self.log_level).map_err(ConfigError::Level)?;
        Ok(())
    }

    pub fn db_path(&self) -> PathBuf {
        self.data_dir.join(DB_FILE_NAME)
    }

    pub fn log_dir(&self) -> PathBuf {
        self.data_dir.join(LOG_DIR_NAME)
    }
}
