//! Runtime configuration.
//!
//! Values come from environment variables; blank values count as unset.
//!
//! | Variable            | Meaning                                     |
//! |---------------------|---------------------------------------------|
//! | `STANDUP_LOG_LEVEL` | `trace`, `debug`, `info`, `warn` or `error` |
//! | `STANDUP_LOG_DIR`   | absolute directory for rolling log files    |
//! | `STANDUP_SEED_DIR`  | directory with seed JSON collections        |

use crate::db::seed::SeedSource;
use crate::logging::{default_log_level, init_logging, normalize_level, LoggingError};
use std::path::PathBuf;

pub const LOG_LEVEL_ENV: &str = "STANDUP_LOG_LEVEL";
pub const LOG_DIR_ENV: &str = "STANDUP_LOG_DIR";
pub const SEED_DIR_ENV: &str = "STANDUP_SEED_DIR";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StandupConfig {
    pub log_level: String,
    /// Logging stays off when unset.
    pub log_dir: Option<PathBuf>,
    /// Embedded seed data is used when unset.
    pub seed_dir: Option<PathBuf>,
}

impl Default for StandupConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level().to_string(),
            log_dir: None,
            seed_dir: None,
        }
    }
}

impl StandupConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds a config from an arbitrary key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let read = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let defaults = Self::default();
        Self {
            log_level: read(LOG_LEVEL_ENV).unwrap_or(defaults.log_level),
            log_dir: read(LOG_DIR_ENV).map(PathBuf::from),
            seed_dir: read(SEED_DIR_ENV).map(PathBuf::from),
        }
    }

    pub fn seed_source(&self) -> SeedSource {
        match &self.seed_dir {
            Some(dir) => SeedSource::Directory(dir.clone()),
            None => SeedSource::Embedded,
        }
    }

    /// Starts file logging when a log directory is configured.
    ///
    /// Returns whether logging is active. An invalid level is reported even
    /// when no directory is set.
    pub fn init_logging(&self) -> Result<bool, LoggingError> {
        normalize_level(&self.log_level)?;
        match &self.log_dir {
            Some(dir) => init_logging(&self.log_level, dir).map(|()| true),
            None => Ok(false),
        }
    }
}
