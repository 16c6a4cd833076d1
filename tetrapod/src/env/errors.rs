use thiserror::Error;

use crate::reward::ConfigError;
use crate::sim::SimError;

#[derive(Error, Debug)]
pub enum EnvError {
    #[error("Environment config error: {0}")]
    Config(#[from] ConfigError),

    #[error("Simulator error: {0}")]
    Simulator(#[from] SimError),

    #[error("observation has {len} values, at least {min} required")]
    ObservationTooShort { len: usize, min: usize },

    #[error("observation has {actual} values, environment expects {expected}")]
    ObservationLength { expected: usize, actual: usize },

    #[error("action has {actual} values, environment expects {expected}")]
    ActionLength { expected: usize, actual: usize },

    #[error("batch length mismatch: {left} observations vs {right} next observations")]
    BatchMismatch { left: usize, right: usize },

    #[error("action count {actual} doesn't match environment count {expected}")]
    ActionCount { expected: usize, actual: usize },
}
