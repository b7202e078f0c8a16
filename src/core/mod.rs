pub mod config;
pub mod error;
pub mod types;

pub use config::EngineConfig;
pub use error::{CastError, CatalogError, EngineError, FailureReason, Result};
pub use types::{CasterId, ConceptId, KnowledgeState, SimTime, SymbolId, TechniqueId, Tick, Vec2};
