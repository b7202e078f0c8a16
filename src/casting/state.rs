//! Per-caster casting state

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

use crate::core::types::{CasterId, TechniqueId, Tick};
use crate::techniques::TechniqueDefinition;

/// Lifecycle phase of a caster
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum CastState {
    #[default]
    Idle,
    Preparing,
    Casting,
    Recovering,
    Interrupted,
}

impl CastState {
    pub fn is_idle(&self) -> bool {
        matches!(self, CastState::Idle)
    }

    /// Whether an interrupt can break this phase
    pub fn is_interruptible(&self) -> bool {
        matches!(
            self,
            CastState::Preparing | CastState::Casting | CastState::Recovering
        )
    }
}

/// Casting state component for one caster
#[derive(Debug, Clone)]
pub struct CastingContext {
    pub caster: CasterId,
    pub state: CastState,
    pub active_technique: Option<Arc<TechniqueDefinition>>,
    /// Time spent in the current state
    pub elapsed_in_state: Duration,
    /// Tick on which the current state was entered
    pub entered_at_tick: Tick,
}

impl CastingContext {
    pub fn new(caster: CasterId) -> Self {
        Self {
            caster,
            state: CastState::Idle,
            active_technique: None,
            elapsed_in_state: Duration::ZERO,
            entered_at_tick: 0,
        }
    }

    pub fn technique_id(&self) -> Option<TechniqueId> {
        self.active_technique.as_ref().map(|t| t.id.clone())
    }

    pub(crate) fn enter(&mut self, state: CastState, tick: Tick) {
        self.state = state;
        self.elapsed_in_state = Duration::ZERO;
        self.entered_at_tick = tick;
    }
}
