//! Configuration file
//!
//! A JSON object; every key is optional:
//!
//! ```json
//! {"database_limit": 500, "max_limit": 100000,
//!  "snapshot": "./fleet.json", "log_level": "warn"}
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::executor::DEFAULT_MAX_LIMIT;
use crate::query::DEFAULT_LIMIT;

use super::errors::{CliError, CliResult};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Page size used when a command gives no --limit
    #[serde(default = "default_database_limit")]
    pub database_limit: usize,

    /// Largest accepted --limit
    #[serde(default = "default_max_limit")]
    pub max_limit: usize,

    /// Fleet snapshot to query
    #[serde(default)]
    pub snapshot: Option<PathBuf>,

    /// Log filter used when RUST_LOG is unset
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_database_limit() -> usize {
    DEFAULT_LIMIT
}

fn default_max_limit() -> usize {
    DEFAULT_MAX_LIMIT
}

fn default_log_level() -> String {
    "warn".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_limit: default_database_limit(),
            max_limit: default_max_limit(),
            snapshot: None,
            log_level: default_log_level(),
        }
    }
}

impl Config {
    /// Load configuration from file
    pub fn load(path: &Path) -> CliResult<Self> {
        let content = fs::read_to_string(path)
            .map_err(|e| CliError::config(format!("Failed to read config: {}", e)))?;

        let config: Config = serde_json::from_str(&content)
            .map_err(|e| CliError::config(format!("Invalid config JSON: {}", e)))?;

        config.validate()?;

        Ok(config)
    }

    /// Loads the file when given, defaults otherwise
    pub fn resolve(path: Option<&Path>) -> CliResult<Self> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }

    fn validate(&self) -> CliResult<()> {
        if self.max_limit == 0 {
            return Err(CliError::config("max_limit must be > 0"));
        }

        if self.database_limit == 0 || self.database_limit > self.max_limit {
            return Err(CliError::config(format!(
                "database_limit must be between 1 and max_limit ({})",
                self.max_limit
            )));
        }

        Ok(())
    }
}
