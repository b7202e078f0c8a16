//! Technique content: definitions, the catalog that owns them, and the
//! TOML loader that produces them.

pub mod catalog;
pub mod definition;
pub mod loader;

pub use catalog::TechniqueCatalog;
pub use definition::{EffectDescriptor, TechniqueCost, TechniqueDefinition};
pub use loader::{load_catalog, parse_catalog, DEFAULT_CATALOG};
