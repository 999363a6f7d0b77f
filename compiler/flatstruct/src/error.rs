//! Errors surfaced by the factories.

use flat_check::ValidationError;
use flat_emit::{ConstructError, EmitError};
use flat_ir::DefError;

/// Emission of a specialized type failed.
#[derive(Debug, thiserror::Error)]
#[error("failed to compile `{type_name}`")]
pub struct CompilationError {
    pub type_name: String,
    #[source]
    pub source: EmitError,
}

/// Failure to obtain a specialized type.
#[derive(Debug, thiserror::Error)]
pub enum SpecializeError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Compilation(#[from] CompilationError),
}

/// A specialized type exists but no instance could be made from it.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum InstantiationError {
    #[error("constructor takes {expected} argument(s), got {actual}")]
    ArityMismatch { expected: usize, actual: usize },

    #[error("array capacity {requested} exceeds the configured maximum of {max}")]
    CapacityExceeded { requested: usize, max: usize },
}

impl From<ConstructError> for InstantiationError {
    fn from(err: ConstructError) -> Self {
        match err {
            ConstructError::Arity { expected, actual } => {
                InstantiationError::ArityMismatch { expected, actual }
            }
        }
    }
}

/// Failure of a factory `create` call.
#[derive(Debug, thiserror::Error)]
pub enum CreateError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Compilation(#[from] CompilationError),
    #[error(transparent)]
    Instantiation(#[from] InstantiationError),
}

impl From<SpecializeError> for CreateError {
    fn from(err: SpecializeError) -> Self {
        match err {
            SpecializeError::Validation(err) => CreateError::Validation(err),
            SpecializeError::Compilation(err) => CreateError::Compilation(err),
        }
    }
}

/// Failure to load a contract from a declarative document.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error(transparent)]
    Definition(#[from] DefError),
    #[error(transparent)]
    Validation(#[from] ValidationError),
}

/// Failure to read an [`EngineConfig`](crate::EngineConfig).
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("malformed engine configuration: {0}")]
    Json(#[from] serde_json::Error),

    #[error("environment variable {var} has invalid value `{value}`")]
    InvalidEnv { var: &'static str, value: String },
}
