//! Engine orchestration: caster storage, the command queue, and the
//! per-tick step that ties input, resolution and casting together.

pub mod arena;
pub mod commands;
pub mod engine;
pub mod tick;

pub use arena::{CasterArena, CasterSlot};
pub use commands::{CommandSender, EngineCommand};
pub use engine::{TechniqueEngine, TickReport};
pub use tick::ResolutionOutcome;
