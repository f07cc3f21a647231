use cartage_core::EngineError;
use thiserror::Error;

/// Faults raised while generating or loading scenarios.
#[derive(Debug, Error)]
pub enum GenError {
    #[error("invalid generator configuration: {0}")]
    Config(String),

    #[error("parse error: {0}")]
    Parse(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Engine(#[from] EngineError),
}

pub type GenResult<T> = Result<T, GenError>;
