//! Lifecycle signals emitted to the presentation layer
//!
//! One sum type, one sink. Consumers match on the variant they care about.

use ahash::AHashMap;
use serde::{Deserialize, Serialize};
use std::sync::mpsc::Sender;

use crate::casting::state::CastState;
use crate::core::error::FailureReason;
use crate::core::types::{CasterId, ConceptId, KnowledgeState, SymbolId, TechniqueId, Vec2};
use crate::techniques::EffectDescriptor;

/// One input that took part in a resolved sequence
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchedInput {
    pub symbol: SymbolId,
    pub concept: ConceptId,
    pub knowledge: KnowledgeState,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum CastSignal {
    TechniqueResolved {
        caster: CasterId,
        technique: TechniqueId,
        matched_sequence: Vec<MatchedInput>,
    },
    CastFailed {
        caster: CasterId,
        technique: Option<TechniqueId>,
        reason: FailureReason,
    },
    CastStateChanged {
        caster: CasterId,
        new_state: CastState,
        technique: Option<TechniqueId>,
    },
    EffectExecuted {
        caster: CasterId,
        technique: TechniqueId,
        effect: EffectDescriptor,
        position: Option<Vec2>,
    },
}

/// Discriminant of a signal, for counting and filtering
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum SignalKind {
    TechniqueResolved,
    CastFailed,
    CastStateChanged,
    EffectExecuted,
}

impl CastSignal {
    pub fn kind(&self) -> SignalKind {
        match self {
            CastSignal::TechniqueResolved { .. } => SignalKind::TechniqueResolved,
            CastSignal::CastFailed { .. } => SignalKind::CastFailed,
            CastSignal::CastStateChanged { .. } => SignalKind::CastStateChanged,
            CastSignal::EffectExecuted { .. } => SignalKind::EffectExecuted,
        }
    }

    pub fn caster(&self) -> CasterId {
        match self {
            CastSignal::TechniqueResolved { caster, .. }
            | CastSignal::CastFailed { caster, .. }
            | CastSignal::CastStateChanged { caster, .. }
            | CastSignal::EffectExecuted { caster, .. } => *caster,
        }
    }
}

/// Fire-and-forget destination for signals
pub trait SignalSink {
    fn emit(&mut self, signal: CastSignal);
}

impl SignalSink for Vec<CastSignal> {
    fn emit(&mut self, signal: CastSignal) {
        self.push(signal);
    }
}

impl SignalSink for Sender<CastSignal> {
    fn emit(&mut self, signal: CastSignal) {
        // A dropped receiver means nobody is listening any more
        let _ = self.send(signal);
    }
}

/// Sink that discards everything
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl SignalSink for NullSink {
    fn emit(&mut self, _signal: CastSignal) {}
}

/// Recording sink with per-kind counters
#[derive(Debug, Clone, Default)]
pub struct SignalLog {
    signals: Vec<CastSignal>,
    counts: AHashMap<SignalKind, usize>,
    retain: bool,
}

impl SignalLog {
    /// Log that keeps every signal
    pub fn new() -> Self {
        Self {
            retain: true,
            ..Self::default()
        }
    }

    /// Log that only counts (for long headless runs)
    pub fn counting() -> Self {
        Self::default()
    }

    pub fn signals(&self) -> &[CastSignal] {
        &self.signals
    }

    pub fn count(&self, kind: SignalKind) -> usize {
        self.counts.get(&kind).copied().unwrap_or(0)
    }

    pub fn total(&self) -> usize {
        self.counts.values().sum()
    }

    /// Remove and return everything recorded so far (counts are kept)
    pub fn drain(&mut self) -> Vec<CastSignal> {
        std::mem::take(&mut self.signals)
    }

    pub fn of_kind(&self, kind: SignalKind) -> impl Iterator<Item = &CastSignal> {
        self.signals.iter().filter(move |s| s.kind() == kind)
    }
}

impl SignalSink for SignalLog {
    fn emit(&mut self, signal: CastSignal) {
        *self.counts.entry(signal.kind()).or_insert(0) += 1;
        if self.retain {
            self.signals.push(signal);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::mpsc;

    fn state_changed(state: CastState) -> CastSignal {
        CastSignal::CastStateChanged {
            caster: CasterId::new(0, 0),
            new_state: state,
            technique: None,
        }
    }

    #[test]
    fn test_log_counts_by_kind() {
        let mut log = SignalLog::new();
        log.emit(state_changed(CastState::Preparing));
        log.emit(state_changed(CastState::Idle));
        log.emit(CastSignal::CastFailed {
            caster: CasterId::new(0, 0),
            technique: None,
            reason: FailureReason::InvalidState,
        });

        assert_eq!(log.count(SignalKind::CastStateChanged), 2);
        assert_eq!(log.count(SignalKind::CastFailed), 1);
        assert_eq!(log.count(SignalKind::EffectExecuted), 0);
        assert_eq!(log.total(), 3);
        assert_eq!(log.of_kind(SignalKind::CastFailed).count(), 1);
    }

    #[test]
    fn test_counting_log_keeps_no_signals() {
        let mut log = SignalLog::counting();
        log.emit(state_changed(CastState::Preparing));
        assert!(log.signals().is_empty());
        assert_eq!(log.total(), 1);
    }

    #[test]
    fn test_channel_sink_delivers() {
        let (mut tx, rx) = mpsc::channel();
        tx.emit(state_changed(CastState::Casting));
        assert_eq!(rx.try_recv().unwrap().kind(), SignalKind::CastStateChanged);
    }

    #[test]
    fn test_channel_sink_tolerates_closed_receiver() {
        let (mut tx, rx) = mpsc::channel::<CastSignal>();
        drop(rx);
        tx.emit(state_changed(CastState::Casting));
    }
}
