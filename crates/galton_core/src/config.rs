//! # Experiment Configuration
//!
//! Everything needed to set up one bean counter experiment. Configs load from
//! JSON; any field left out falls back to its default.
//!
//! ```rust
//! use galton_core::config::ExperimentConfig;
//! use galton_core::BeanKind;
//!
//! let config = ExperimentConfig::new(20, 1000, BeanKind::Skill).with_seed(7);
//! assert!(config.validate().is_ok());
//! ```

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::bean::BeanKind;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid slot count: {0} (a machine needs at least one slot)")]
    InvalidSlotCount(usize),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] serde_json::Error),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExperimentConfig {
    /// Slots at the bottom of the board; also the number of peg rows.
    pub slot_count: usize,
    /// Beans dropped per run.
    pub bean_count: usize,
    pub mode: BeanKind,
    /// Master seed. `None` draws a fresh one per experiment.
    pub seed: Option<u64>,
    /// Print the board after every tick.
    pub debug: bool,
}

impl Default for ExperimentConfig {
    fn default() -> Self {
        Self { slot_count: 10, bean_count: 400, mode: BeanKind::Luck, seed: None, debug: false }
    }
}

impl ExperimentConfig {
    pub fn new(slot_count: usize, bean_count: usize, mode: BeanKind) -> Self {
        Self { slot_count, bean_count, mode, ..Self::default() }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.slot_count == 0 {
            return Err(ConfigError::InvalidSlotCount(self.slot_count));
        }
        Ok(())
    }

    /// Parse and validate a JSON config.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a JSON config file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let json = fs::read_to_string(path)?;
        let config = Self::from_json_str(&json)?;
        tracing::debug!(path = %path.display(), ?config, "loaded experiment config");
        Ok(config)
    }
}
