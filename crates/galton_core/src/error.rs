use thiserror::Error;

use crate::config::ConfigError;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BeanCounterError {
    #[error("Invalid configuration: slot count must be at least 1, got {slot_count}")]
    InvalidConfiguration { slot_count: usize },

    #[error("Machine used before reset: {operation} requires a prior reset")]
    UseBeforeReset { operation: &'static str },
}

/// Errors raised while setting up or driving a whole experiment.
#[derive(Error, Debug)]
pub enum ExperimentError {
    #[error(transparent)]
    Machine(#[from] BeanCounterError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

pub type Result<T> = std::result::Result<T, BeanCounterError>;
