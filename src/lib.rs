//! Seal Weave - technique resolution and casting engine
//!
//! Symbol presses go into a per-caster buffer; each tick the longest
//! registered concept sequence at the front of the buffer is resolved into
//! a technique, paid for, and carried through its timed phases.

pub mod casting;
pub mod core;
pub mod input;
pub mod resolver;
pub mod simulation;
pub mod techniques;

pub use casting::{CastSignal, CastState, CasterStats, SignalSink};
pub use core::{CastError, CasterId, ConceptId, EngineConfig, SimTime, TechniqueId};
pub use simulation::TechniqueEngine;
pub use techniques::TechniqueDefinition;
