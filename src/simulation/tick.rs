//! Per-caster tick step
//!
//! advance timers -> (if Idle) resolve pending inputs -> initiate -> consume
//!
//! Inputs that fizzle are left alone; they simply age out of the combo
//! window. Physical eviction is the buffer's job and is capacity-driven.

use std::time::Duration;

use crate::casting::{CastSignal, CasterStats, CastingStateMachine, MatchedInput, SignalSink};
use crate::core::types::{SimTime, Tick};
use crate::resolver::SequenceResolver;
use crate::simulation::arena::{AttemptKey, CasterSlot};

/// Everything a caster step needs besides the caster itself
pub(crate) struct TickEnv<'a, P: ?Sized, S: ?Sized> {
    pub machine: &'a CastingStateMachine,
    pub resolver: &'a SequenceResolver,
    pub stats: &'a mut P,
    pub sink: &'a mut S,
    pub now: SimTime,
    pub delta: Duration,
    pub tick: Tick,
    pub combo_window: Duration,
}

/// What happened when an Idle caster's inputs were looked at
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolutionOutcome {
    /// Caster was busy; nothing resolved
    Busy,
    /// No unconsumed inputs inside the window
    NoInput,
    /// Inputs present but no technique terminates on them
    Fizzle,
    /// A technique matched and the cast began
    Started,
    /// A technique matched but the cast was refused
    Refused,
}

pub(crate) fn step_caster<P, S>(slot: &mut CasterSlot, env: &mut TickEnv<'_, P, S>) -> ResolutionOutcome
where
    P: CasterStats + ?Sized,
    S: SignalSink + ?Sized,
{
    env.machine
        .advance(&mut slot.context, env.delta, &*env.stats, &mut *env.sink, env.tick);

    if !slot.context.state.is_idle() {
        return ResolutionOutcome::Busy;
    }
    resolve_pending(slot, env)
}

/// Resolve an Idle caster's window and try to start the match
///
/// A refused match is reported once (`TechniqueResolved` then `CastFailed`)
/// and retried silently on later ticks. If a retry succeeds, for example
/// after the pools regenerate, the only new signal is the
/// `CastStateChanged(Preparing)` from the cast itself; no second
/// `TechniqueResolved` is emitted for the same inputs.
fn resolve_pending<P, S>(slot: &mut CasterSlot, env: &mut TickEnv<'_, P, S>) -> ResolutionOutcome
where
    P: CasterStats + ?Sized,
    S: SignalSink + ?Sized,
{
    let window = slot.buffer.unconsumed_within(env.now, env.combo_window);
    if window.is_empty() {
        slot.last_failed_attempt = None;
        return ResolutionOutcome::NoInput;
    }

    let Some(found) = env.resolver.resolve_longest_match(window.iter()) else {
        tracing::trace!("{} fizzled on {} pending inputs", slot.context.caster, window.len());
        slot.last_failed_attempt = None;
        return ResolutionOutcome::Fizzle;
    };

    let consumed = window.first_seqs(found.matched_len);
    let matched_sequence: Vec<MatchedInput> = window
        .iter()
        .take(found.matched_len)
        .map(|e| MatchedInput {
            symbol: e.symbol,
            concept: e.concept.clone(),
            knowledge: e.knowledge,
        })
        .collect();

    let attempt = AttemptKey {
        technique: found.technique.id.clone(),
        first_event: consumed[0],
        matched_len: found.matched_len,
    };
    let repeated = slot.last_failed_attempt.as_ref() == Some(&attempt);
    let caster = slot.context.caster;

    if !repeated {
        env.sink.emit(CastSignal::TechniqueResolved {
            caster,
            technique: attempt.technique.clone(),
            matched_sequence,
        });
    }

    match env.machine.initiate(
        &mut slot.context,
        found.technique,
        &mut *env.stats,
        &mut *env.sink,
        env.tick,
    ) {
        Ok(()) => {
            slot.buffer.mark_consumed(&consumed);
            slot.last_failed_attempt = None;
            ResolutionOutcome::Started
        }
        Err(err) => {
            if !repeated {
                tracing::debug!("{}", err);
                env.sink.emit(CastSignal::CastFailed {
                    caster,
                    technique: Some(attempt.technique.clone()),
                    reason: err.reason(),
                });
            }
            slot.last_failed_attempt = Some(attempt);
            ResolutionOutcome::Refused
        }
    }
}
