//! Runtime configuration resolved from the environment.
//!
//! # Invariants
//! - Blank or unset variables fall back to defaults under the temp directory.
//! - Resolution never fails; an invalid log level is left for
//!   `init_logging` to reject.

use crate::logging::default_log_level;
use std::path::PathBuf;

pub const ENV_CATALOG_PATH: &str = "CHORELIST_CATALOG_PATH";
pub const ENV_STATE_PATH: &str = "CHORELIST_STATE_PATH";
pub const ENV_LOG_DIR: &str = "CHORELIST_LOG_DIR";
pub const ENV_LOG_LEVEL: &str = "CHORELIST_LOG_LEVEL";

const DEFAULT_DIR_NAME: &str = "chorelist";
const DEFAULT_CATALOG_FILE: &str = "tasks.csv";
const DEFAULT_STATE_FILE: &str = "task_states.json";
const DEFAULT_LOG_DIR_NAME: &str = "logs";

/// File locations and log settings for one process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChecklistConfig {
    pub catalog_path: PathBuf,
    pub state_path: PathBuf,
    pub log_dir: PathBuf,
    pub log_level: String,
}

impl Default for ChecklistConfig {
    fn default() -> Self {
        let base = std::env::temp_dir().join(DEFAULT_DIR_NAME);
        Self {
            catalog_path: base.join(DEFAULT_CATALOG_FILE),
            state_path: base.join(DEFAULT_STATE_FILE),
            log_dir: base.join(DEFAULT_LOG_DIR_NAME),
            log_level: default_log_level().to_string(),
        }
    }
}

impl ChecklistConfig {
    /// Resolves configuration from process environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Resolves configuration through an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let value = |name: &str| {
            lookup(name)
                .map(|raw| raw.trim().to_string())
                .filter(|raw| !raw.is_empty())
        };

        let defaults = Self::default();
        Self {
            catalog_path: value(ENV_CATALOG_PATH)
                .map(PathBuf::from)
                .unwrap_or(defaults.catalog_path),
            state_path: value(ENV_STATE_PATH)
                .map(PathBuf::from)
                .unwrap_or(defaults.state_path),
            log_dir: value(ENV_LOG_DIR)
                .map(PathBuf::from)
                .unwrap_or(defaults.log_dir),
            log_level: value(ENV_LOG_LEVEL).unwrap_or(defaults.log_level),
        }
    }
}
