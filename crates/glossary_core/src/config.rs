//! Store configuration resolved from the process environment.
//!
//! # Responsibility
//! - Resolve database path and logging settings for embedding callers.
//! - Keep resolution testable by reading through a lookup function.
//!
//! # Invariants
//! - Blank variables behave as unset.
//! - Logging stays disabled unless a log directory is configured.

use crate::db::{open_db, DbResult};
use crate::logging::{default_log_level, init_logging};
use rusqlite::Connection;
use std::path::PathBuf;

pub const DB_PATH_ENV: &str = "GLOSSARY_DB_PATH";
pub const LOG_LEVEL_ENV: &str = "GLOSSARY_LOG_LEVEL";
pub const LOG_DIR_ENV: &str = "GLOSSARY_LOG_DIR";

const DEFAULT_DB_FILE_NAME: &str = "glossary.sqlite3";

/// Resolved runtime settings for one store instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    pub db_path: PathBuf,
    pub log_level: String,
    pub log_dir: Option<PathBuf>,
}

impl StoreConfig {
    /// Resolves settings from `GLOSSARY_*` environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Resolves settings through `lookup`, which maps a variable name to its
    /// raw value.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let read = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        Self {
            db_path: read(DB_PATH_ENV)
                .map(PathBuf::from)
                .unwrap_or_else(|| std::env::temp_dir().join(DEFAULT_DB_FILE_NAME)),
            log_level: read(LOG_LEVEL_ENV).unwrap_or_else(|| default_log_level().to_string()),
            log_dir: read(LOG_DIR_ENV).map(PathBuf::from),
        }
    }

    /// Starts file logging when a log directory is configured.
    ///
    /// Returns `Ok(false)` when logging is not configured.
    pub fn init_logging(&self) -> Result<bool, String> {
        let Some(log_dir) = self.log_dir.as_ref() else {
            return Ok(false);
        };
        let log_dir = log_dir
            .to_str()
            .ok_or_else(|| format!("log_dir is not valid UTF-8: `{}`", log_dir.display()))?;
        init_logging(&self.log_level, log_dir)?;
        Ok(true)
    }
}

/// Opens and migrates the database named by `config`.
pub fn open_store(config: &StoreConfig) -> DbResult<Connection> {
    open_db(&config.db_path)
}
