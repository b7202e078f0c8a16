//! Technique engine - owns every caster and runs the tick loop
//!
//! The engine is single-threaded. Other threads reach it only through the
//! command queue (`command_sender`), which is drained at the start of each
//! tick before any caster is advanced.

use serde::Serialize;
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::Arc;
use std::time::Duration;

use crate::casting::{
    CastSignal, CastState, CasterStats, CastingContext, CastingStateMachine, SignalSink,
};
use crate::core::config::EngineConfig;
use crate::core::error::{CastError, CatalogError, EngineError, Result};
use crate::core::types::{CasterId, ConceptId, KnowledgeState, SimTime, SymbolId, Tick};
use crate::input::{EventSeq, InputSequenceBuffer};
use crate::resolver::{SequenceResolver, TechniqueMatch};
use crate::simulation::arena::CasterArena;
use crate::simulation::commands::{CommandSender, EngineCommand};
use crate::simulation::tick::{step_caster, ResolutionOutcome, TickEnv};
use crate::techniques::{TechniqueCatalog, TechniqueDefinition};

/// Summary of one tick, for headless runners
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TickReport {
    pub tick: Tick,
    pub commands: usize,
    pub started: usize,
    pub refused: usize,
    pub fizzled: usize,
}

pub struct TechniqueEngine<P, S> {
    config: EngineConfig,
    machine: CastingStateMachine,
    catalog: TechniqueCatalog,
    resolver: SequenceResolver,
    casters: CasterArena,
    stats: P,
    sink: S,
    commands_tx: Sender<EngineCommand>,
    commands_rx: Receiver<EngineCommand>,
    now: SimTime,
    current_tick: Tick,
}

impl<P: CasterStats, S: SignalSink> TechniqueEngine<P, S> {
    /// Build an engine around an injected stat provider and signal sink
    pub fn new(config: EngineConfig, stats: P, sink: S) -> Result<Self> {
        config.validate().map_err(EngineError::Config)?;
        let (commands_tx, commands_rx) = mpsc::channel();
        Ok(Self {
            machine: CastingStateMachine::from_config(&config),
            config,
            catalog: TechniqueCatalog::new(),
            resolver: SequenceResolver::new(),
            casters: CasterArena::new(),
            stats,
            sink,
            commands_tx,
            commands_rx,
            now: SimTime::ZERO,
            current_tick: 0,
        })
    }

    // === CONTENT ===

    /// Add a technique to the catalog and the resolver
    pub fn register_technique(
        &mut self,
        definition: TechniqueDefinition,
    ) -> std::result::Result<Arc<TechniqueDefinition>, CatalogError> {
        let (technique, _) = self.catalog.register(definition)?;
        if technique.sequence.len() > self.config.buffer_capacity {
            tracing::warn!(
                "{} needs {} inputs but buffers hold {}; it can never resolve",
                technique.id,
                technique.sequence.len(),
                self.config.buffer_capacity
            );
        }
        self.resolver.register(Arc::clone(&technique));
        Ok(technique)
    }

    /// Register a batch of techniques, stopping at the first invalid one
    pub fn register_catalog<I>(&mut self, definitions: I) -> std::result::Result<usize, CatalogError>
    where
        I: IntoIterator<Item = TechniqueDefinition>,
    {
        let mut count = 0;
        for definition in definitions {
            self.register_technique(definition)?;
            count += 1;
        }
        tracing::info!("Registered {} techniques", count);
        Ok(count)
    }

    // === CASTERS ===

    /// Create a caster in Idle with an empty buffer
    ///
    /// Its pools must be provided by the stat subsystem separately.
    pub fn spawn_caster(&mut self) -> CasterId {
        let id = self.casters.spawn(self.config.buffer_capacity);
        tracing::debug!("Spawned {}", id);
        id
    }

    /// Destroy a caster's context and buffer; returns false if unknown
    pub fn despawn_caster(&mut self, caster: CasterId) -> bool {
        let removed = self.casters.despawn(caster).is_some();
        if removed {
            tracing::debug!("Despawned {}", caster);
        }
        removed
    }

    // === BOUNDARY OPERATIONS ===

    /// Record a symbol press for a caster
    pub fn push_symbol(
        &mut self,
        caster: CasterId,
        symbol: SymbolId,
        concept: ConceptId,
        timestamp: SimTime,
        knowledge: KnowledgeState,
    ) -> std::result::Result<EventSeq, CastError> {
        let slot = self
            .casters
            .get_mut(caster)
            .ok_or_else(|| unknown_caster(caster))?;
        Ok(slot.buffer.push_symbol(symbol, concept, timestamp, knowledge))
    }

    /// Start a cast directly, bypassing resolution
    ///
    /// Failures are reported both as the returned error and as a
    /// `CastFailed` signal; an unknown caster is only logged.
    pub fn initiate_cast(
        &mut self,
        caster: CasterId,
        technique: Arc<TechniqueDefinition>,
    ) -> std::result::Result<(), CastError> {
        let slot = self
            .casters
            .get_mut(caster)
            .ok_or_else(|| unknown_caster(caster))?;
        let technique_id = technique.id.clone();

        self.machine
            .initiate(
                &mut slot.context,
                technique,
                &mut self.stats,
                &mut self.sink,
                self.current_tick,
            )
            .inspect_err(|err| {
                tracing::debug!("{}", err);
                self.sink.emit(CastSignal::CastFailed {
                    caster,
                    technique: Some(technique_id),
                    reason: err.reason(),
                });
            })
    }

    /// Break a caster's cast immediately
    ///
    /// Returns whether anything was interrupted (Idle and already
    /// Interrupted casters are left alone).
    pub fn interrupt(&mut self, caster: CasterId) -> std::result::Result<bool, CastError> {
        let slot = self
            .casters
            .get_mut(caster)
            .ok_or_else(|| unknown_caster(caster))?;
        Ok(self
            .machine
            .interrupt(&mut slot.context, &mut self.sink, self.current_tick))
    }

    /// Producer handle for other threads
    pub fn command_sender(&self) -> CommandSender {
        CommandSender::new(self.commands_tx.clone())
    }

    // === TICK LOOP ===

    /// Advance the simulation by `delta`
    ///
    /// Queued commands are applied first, then every caster advances its
    /// timers and, if Idle, tries to resolve its pending inputs.
    pub fn tick(&mut self, delta: Duration) -> TickReport {
        self.current_tick += 1;
        self.now += delta;

        let mut report = TickReport {
            tick: self.current_tick,
            commands: self.drain_commands(),
            ..TickReport::default()
        };

        let mut env = TickEnv {
            machine: &self.machine,
            resolver: &self.resolver,
            stats: &mut self.stats,
            sink: &mut self.sink,
            now: self.now,
            delta,
            tick: self.current_tick,
            combo_window: self.config.combo_window(),
        };

        for slot in self.casters.slots_mut() {
            match step_caster(slot, &mut env) {
                ResolutionOutcome::Started => report.started += 1,
                ResolutionOutcome::Refused => report.refused += 1,
                ResolutionOutcome::Fizzle => report.fizzled += 1,
                ResolutionOutcome::Busy | ResolutionOutcome::NoInput => {}
            }
        }

        report
    }

    fn drain_commands(&mut self) -> usize {
        let mut applied = 0;
        while let Ok(command) = self.commands_rx.try_recv() {
            applied += 1;
            // Unknown casters are logged inside the handlers
            match command {
                EngineCommand::PushSymbol {
                    caster,
                    symbol,
                    concept,
                    timestamp,
                    knowledge,
                } => {
                    let _ = self.push_symbol(caster, symbol, concept, timestamp, knowledge);
                }
                EngineCommand::Interrupt(caster) => {
                    let _ = self.interrupt(caster);
                }
            }
        }
        applied
    }

    // === QUERIES ===

    /// What the caster's pending inputs would resolve to right now
    ///
    /// Pure: nothing is consumed, debited or emitted.
    pub fn peek_resolution(&self, caster: CasterId) -> Option<TechniqueMatch> {
        let slot = self.casters.get(caster)?;
        let window = slot
            .buffer
            .unconsumed_within(self.now, self.config.combo_window());
        self.resolver.resolve_longest_match(window.iter())
    }

    /// Whether every pending input so far lies on the path of some technique
    ///
    /// Used for discovery hints: the caster is partway through a sequence
    /// and further presses may still complete it.
    pub fn has_partial_sequence(&self, caster: CasterId) -> bool {
        let Some(slot) = self.casters.get(caster) else {
            return false;
        };
        let pending: Vec<ConceptId> = slot
            .buffer
            .unconsumed_within(self.now, self.config.combo_window())
            .iter()
            .map(|e| e.concept.clone())
            .collect();
        !pending.is_empty() && self.resolver.has_prefix(&pending)
    }

    pub fn state(&self, caster: CasterId) -> Option<CastState> {
        self.casters.get(caster).map(|s| s.context.state)
    }

    pub fn context(&self, caster: CasterId) -> Option<&CastingContext> {
        self.casters.get(caster).map(|s| &s.context)
    }

    pub fn buffer(&self, caster: CasterId) -> Option<&InputSequenceBuffer> {
        self.casters.get(caster).map(|s| &s.buffer)
    }

    pub fn casters(&self) -> impl Iterator<Item = CasterId> + '_ {
        self.casters.ids()
    }

    pub fn caster_count(&self) -> usize {
        self.casters.len()
    }

    pub fn now(&self) -> SimTime {
        self.now
    }

    pub fn current_tick(&self) -> Tick {
        self.current_tick
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn catalog(&self) -> &TechniqueCatalog {
        &self.catalog
    }

    pub fn resolver(&self) -> &SequenceResolver {
        &self.resolver
    }

    pub fn stats(&self) -> &P {
        &self.stats
    }

    pub fn stats_mut(&mut self) -> &mut P {
        &mut self.stats
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }
}

fn unknown_caster(caster: CasterId) -> CastError {
    tracing::warn!("Ignoring operation on unknown {}", caster);
    CastError::UnknownCaster(caster)
}
