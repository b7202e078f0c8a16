use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::casting::resources::ResourceKind;
use crate::casting::state::CastState;
use crate::core::types::{CasterId, TechniqueId};

/// Why a cast attempt did not go ahead (carried by `CastFailed`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FailureReason {
    InvalidState,
    InsufficientResource(ResourceKind),
    UnknownSequence,
    UnknownCaster,
}

/// Runtime failures of the casting boundary operations
///
/// All of these are recovered locally: the caster keeps its prior state and
/// nothing is debited.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CastError {
    #[error("{caster} cannot start a cast while {state:?}")]
    InvalidState { caster: CasterId, state: CastState },

    #[error("{caster} lacks {pool:?}: needs {required}, has {available}")]
    InsufficientResource {
        caster: CasterId,
        pool: ResourceKind,
        required: f32,
        available: f32,
    },

    #[error("No casting context for {0}")]
    UnknownCaster(CasterId),
}

impl CastError {
    pub fn reason(&self) -> FailureReason {
        match self {
            CastError::InvalidState { .. } => FailureReason::InvalidState,
            CastError::InsufficientResource { pool, .. } => {
                FailureReason::InsufficientResource(*pool)
            }
            CastError::UnknownCaster(_) => FailureReason::UnknownCaster,
        }
    }
}

/// Content-authoring problems found while registering techniques
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CatalogError {
    #[error("Technique {0} has an empty sequence")]
    EmptySequence(TechniqueId),

    #[error("Technique id {0} is already bound to a different sequence")]
    DuplicateId(TechniqueId),

    #[error("Technique {id} has invalid cost {value} for {field}")]
    InvalidCost {
        id: TechniqueId,
        field: &'static str,
        value: f32,
    },
}

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Catalog error: {0}")]
    Catalog(#[from] CatalogError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, EngineError>;
