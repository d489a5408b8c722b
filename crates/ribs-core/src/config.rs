//! Scheduler configuration.
//!
//! Loaded from TOML. Every key is optional:
//!
//! ```toml
//! worker_threads = 1
//! max_blocking_threads = 4
//! thread_name = "ribs-worker"
//! ```

use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

/// Errors that can occur while loading a configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file could not be read
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The configuration is not valid TOML or has unknown keys
    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    /// A value is out of range
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Thread pool settings for the [`Scheduler`](crate::scheduler::Scheduler).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SchedulerConfig {
    /// Threads driving callbacks and the prepare/value phases.
    pub worker_threads: usize,
    /// Upper bound on threads running process phases.
    pub max_blocking_threads: usize,
    /// Name given to runtime threads.
    pub thread_name: String,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            worker_threads: 1,
            max_blocking_threads: 4,
            thread_name: "ribs-worker".to_string(),
        }
    }
}

impl SchedulerConfig {
    /// Parse and validate a TOML document.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.worker_threads == 0 {
            return Err(ConfigError::Invalid(
                "worker_threads must be at least 1".to_string(),
            ));
        }
        if self.max_blocking_threads == 0 {
            return Err(ConfigError::Invalid(
                "max_blocking_threads must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}
