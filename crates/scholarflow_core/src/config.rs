//! Environment-derived runtime configuration.
//!
//! # Responsibility
//! - Resolve the database path and logging settings shared by CLI and FFI.
//!
//! # Invariants
//! - Blank or whitespace-only variables count as unset.
//! - Defaults live under the OS temp directory, so resolution never fails.

use crate::logging::default_log_level;
use std::path::PathBuf;

pub const DB_PATH_ENV: &str = "SCHOLARFLOW_DB_PATH";
pub const LOG_DIR_ENV: &str = "SCHOLARFLOW_LOG_DIR";
pub const LOG_LEVEL_ENV: &str = "SCHOLARFLOW_LOG_LEVEL";

const DEFAULT_DB_FILE_NAME: &str = "scholarflow.sqlite3";
const DEFAULT_LOG_DIR_NAME: &str = "scholarflow-logs";

/// Resolved runtime settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoreConfig {
    pub db_path: PathBuf,
    pub log_dir: PathBuf,
    pub log_level: String,
}

impl CoreConfig {
    /// Reads settings from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Resolves settings through `lookup`, falling back to defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let read = |key: &str| {
            lookup(key)
                .map(|raw| raw.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        Self {
            db_path: read(DB_PATH_ENV)
                .map(PathBuf::from)
                .unwrap_or_else(|| std::env::temp_dir().join(DEFAULT_DB_FILE_NAME)),
            log_dir: read(LOG_DIR_ENV)
                .map(PathBuf::from)
                .unwrap_or_else(|| std::env::temp_dir().join(DEFAULT_LOG_DIR_NAME)),
            log_level: read(LOG_LEVEL_ENV).unwrap_or_else(|| default_log_level().to_string()),
        }
    }
}
