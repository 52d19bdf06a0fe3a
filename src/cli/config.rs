//! Configuration file for `serve`
//!
//! ```json
//! { "schema_dir": "./schemas", "log_level": "info", "fail_fast_batch": false }
//! ```
//!
//! A relative `schema_dir` is resolved against the config file's directory.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::errors::{CliError, CliResult};
use crate::observability::Severity;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Directory of `*.json` schema documents (required)
    pub schema_dir: String,

    /// Lowest severity logged: trace, info, warn or error (default "info")
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Stop serving at the first malformed request line (default false)
    #[serde(default)]
    pub fail_fast_batch: bool,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Config {
    /// Load configuration from file
    pub fn load(path: &Path) -> CliResult<Self> {
        let content = fs::read_to_string(path)
            .map_err(|e| CliError::config_error(format!("Failed to read config: {}", e)))?;
        Self::from_json(&content)
    }

    /// Parse and validate configuration text
    pub fn from_json(content: &str) -> CliResult<Self> {
        let config: Config = serde_json::from_str(content)
            .map_err(|e| CliError::config_error(format!("Invalid config JSON: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> CliResult<()> {
        if self.schema_dir.trim().is_empty() {
            return Err(CliError::config_error("schema_dir must not be empty"));
        }

        if Severity::parse(&self.log_level).is_none() {
            return Err(CliError::config_error(format!(
                "Invalid log_level: '{}'. Expected trace, info, warn or error.",
                self.log_level
            )));
        }

        Ok(())
    }

    pub fn severity(&self) -> Severity {
        Severity::parse(&self.log_level).unwrap_or(Severity::Info)
    }

    /// Schema directory, resolved against the directory holding `config_path`
    pub fn schema_path(&self, config_path: &Path) -> PathBuf {
        let dir = Path::new(&self.schema_dir);
        if dir.is_absolute() {
            return dir.to_path_buf();
        }
        match config_path.parent() {
            Some(parent) => parent.join(dir),
            None => dir.to_path_buf(),
        }
    }
}
