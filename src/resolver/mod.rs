//! Sequence resolution: which technique, if any, the pending inputs spell.

pub mod trie;

pub use trie::{SequenceResolver, TechniqueMatch};
