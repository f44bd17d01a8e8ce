//! Engine configuration, loadable from TOML. Missing keys fall back to defaults.

use crate::error::EngineResult;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// SQLite file backing the mastery store.
    pub database_path: PathBuf,
    /// Most-recent encounters kept per item.
    pub encounter_history_cap: usize,
    /// Oldest calibration records beyond this count are pruned.
    pub calibration_log_cap: usize,
    /// Oldest error records beyond this count are pruned.
    pub weakness_log_cap: usize,
    pub top_weakness_count: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            database_path: PathBuf::from("mastery.sqlite3"),
            encounter_history_cap: 20,
            calibration_log_cap: 500,
            weakness_log_cap: 500,
            top_weakness_count: 3,
        }
    }
}

impl EngineConfig {
    pub fn from_toml_str(contents: &str) -> EngineResult<Self> {
        Ok(toml::from_str(contents)?)
    }

    /// Reads the config file, or returns defaults when it does not exist.
    pub fn load(path: &Path) -> EngineResult<Self> {
        if !path.exists() {
            log::debug!("no config at {}, using defaults", path.display());
            return Ok(Self::default());
        }
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }
}
