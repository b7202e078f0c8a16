//! Casting lifecycle transitions
//!
//! ```text
//! Idle --initiate--> Preparing --cast time--> Casting --> Recovering --recovery--> Idle
//!            any of Preparing/Casting/Recovering --interrupt--> Interrupted --delay--> Idle
//! ```
//!
//! Casting is instantaneous: the effect fires and the caster moves straight
//! on to Recovering within the same tick.

use std::sync::Arc;
use std::time::Duration;

use crate::casting::resources::CasterStats;
use crate::casting::signals::{CastSignal, SignalSink};
use crate::casting::state::{CastState, CastingContext};
use crate::core::config::EngineConfig;
use crate::core::error::CastError;
use crate::core::types::Tick;
use crate::techniques::TechniqueDefinition;

#[derive(Debug, Clone, PartialEq)]
pub struct CastingStateMachine {
    interrupted_delay: Duration,
    default_cast_speed: f32,
}

impl CastingStateMachine {
    pub fn new(interrupted_delay: Duration, default_cast_speed: f32) -> Self {
        Self {
            interrupted_delay,
            default_cast_speed,
        }
    }

    pub fn from_config(config: &EngineConfig) -> Self {
        Self::new(
            config.interrupted_recovery_delay(),
            config.default_cast_speed_multiplier,
        )
    }

    /// Idle -> Preparing, paying the technique's cost
    ///
    /// On error nothing changes: no state transition, no debit, no signal.
    pub fn initiate<P, S>(
        &self,
        ctx: &mut CastingContext,
        technique: Arc<TechniqueDefinition>,
        stats: &mut P,
        sink: &mut S,
        tick: Tick,
    ) -> Result<(), CastError>
    where
        P: CasterStats + ?Sized,
        S: SignalSink + ?Sized,
    {
        if !ctx.state.is_idle() {
            return Err(CastError::InvalidState {
                caster: ctx.caster,
                state: ctx.state,
            });
        }

        stats
            .try_debit(ctx.caster, technique.cost())
            .map_err(|shortfall| CastError::InsufficientResource {
                caster: ctx.caster,
                pool: shortfall.pool,
                required: shortfall.required,
                available: shortfall.available,
            })?;

        tracing::debug!("{} begins preparing {}", ctx.caster, technique.id);
        ctx.active_technique = Some(technique);
        self.transition(ctx, CastState::Preparing, sink, tick);
        Ok(())
    }

    /// Break an in-progress cast
    ///
    /// Returns false (and does nothing) when the caster is Idle or already
    /// Interrupted. Spent resources are not refunded.
    pub fn interrupt<S>(&self, ctx: &mut CastingContext, sink: &mut S, tick: Tick) -> bool
    where
        S: SignalSink + ?Sized,
    {
        if !ctx.state.is_interruptible() {
            return false;
        }
        tracing::debug!("{} interrupted while {:?}", ctx.caster, ctx.state);
        self.transition(ctx, CastState::Interrupted, sink, tick);
        true
    }

    /// Advance the state timer by `delta` and apply automatic transitions
    ///
    /// A state entered during `tick` is not advanced again in that tick.
    pub fn advance<P, S>(
        &self,
        ctx: &mut CastingContext,
        delta: Duration,
        stats: &P,
        sink: &mut S,
        tick: Tick,
    ) where
        P: CasterStats + ?Sized,
        S: SignalSink + ?Sized,
    {
        if ctx.state.is_idle() || ctx.entered_at_tick == tick {
            return;
        }
        ctx.elapsed_in_state += delta;

        loop {
            let next = match ctx.state {
                CastState::Idle => None,
                CastState::Preparing => {
                    let speed = stats
                        .cast_speed(ctx.caster)
                        .unwrap_or(self.default_cast_speed);
                    match &ctx.active_technique {
                        Some(t) if ctx.elapsed_in_state >= t.scaled_cast_duration(speed) => {
                            Some(CastState::Casting)
                        }
                        Some(_) => None,
                        None => Some(CastState::Idle),
                    }
                }
                CastState::Casting => {
                    self.execute_effect(ctx, stats, sink);
                    Some(CastState::Recovering)
                }
                CastState::Recovering => match &ctx.active_technique {
                    Some(t) if ctx.elapsed_in_state < t.recovery_duration => None,
                    _ => Some(CastState::Idle),
                },
                CastState::Interrupted => {
                    (ctx.elapsed_in_state >= self.interrupted_delay).then_some(CastState::Idle)
                }
            };

            match next {
                Some(state) => self.transition(ctx, state, sink, tick),
                None => break,
            }
            if ctx.state.is_idle() {
                break;
            }
        }
    }

    fn execute_effect<P, S>(&self, ctx: &CastingContext, stats: &P, sink: &mut S)
    where
        P: CasterStats + ?Sized,
        S: SignalSink + ?Sized,
    {
        let Some(technique) = &ctx.active_technique else {
            tracing::warn!("{} reached Casting with no technique", ctx.caster);
            return;
        };
        tracing::debug!("{} executes {}", ctx.caster, technique.id);
        sink.emit(CastSignal::EffectExecuted {
            caster: ctx.caster,
            technique: technique.id.clone(),
            effect: technique.effect.clone(),
            position: stats.position(ctx.caster),
        });
    }

    fn transition<S>(&self, ctx: &mut CastingContext, state: CastState, sink: &mut S, tick: Tick)
    where
        S: SignalSink + ?Sized,
    {
        let technique = ctx.technique_id();
        ctx.enter(state, tick);
        if state.is_idle() {
            ctx.active_technique = None;
        }
        sink.emit(CastSignal::CastStateChanged {
            caster: ctx.caster,
            new_state: state,
            technique,
        });
    }
}

impl Default for CastingStateMachine {
    fn default() -> Self {
        Self::from_config(&EngineConfig::default())
    }
}
