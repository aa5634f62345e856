use crate::config::ConfigError;
use thiserror::Error;

/// Failure of a single breeding call. None of these leave a record behind.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BreedError {
    #[error("unknown species: {0}")]
    UnknownSpecies(String),
    #[error("no saved individual named {0:?}")]
    UnknownIndividual(String),
    #[error("miscarriage: no viable offspring after {attempts} attempts")]
    Miscarriage { attempts: usize },
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum OptimizerError {
    #[error("no optimizer session is running")]
    NoActiveSession,
    #[error("an optimizer session is already running")]
    SessionAlreadyRunning,
    #[error("objective must name at least one stat")]
    EmptyObjective,
    #[error("unknown stat: {0}")]
    UnknownStat(String),
    #[error("target generation count must be positive")]
    ZeroGenerations,
    #[error(transparent)]
    Config(#[from] ConfigError),
}
