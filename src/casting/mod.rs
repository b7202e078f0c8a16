//! Casting lifecycle: resource gate, timed phases, interruption, signals.

pub mod machine;
pub mod resources;
pub mod signals;
pub mod state;

pub use machine::CastingStateMachine;
pub use resources::{CasterStats, CasterVitals, ResourceKind, ResourcePool, ResourceShortfall, VitalsLedger};
pub use signals::{CastSignal, MatchedInput, NullSink, SignalKind, SignalLog, SignalSink};
pub use state::{CastState, CastingContext};
