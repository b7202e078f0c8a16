//! Single-consumer command queue
//!
//! Anything that wants to touch caster state from outside the tick loop
//! (another thread, a network handler) sends a command here. The engine
//! drains the queue once at the start of each tick, before any caster is
//! advanced, so caster state only ever has one writer.

use serde::{Deserialize, Serialize};
use std::sync::mpsc::{SendError, Sender};

use crate::core::types::{CasterId, ConceptId, KnowledgeState, SimTime, SymbolId};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum EngineCommand {
    PushSymbol {
        caster: CasterId,
        symbol: SymbolId,
        concept: ConceptId,
        timestamp: SimTime,
        knowledge: KnowledgeState,
    },
    Interrupt(CasterId),
}

/// Clonable producer handle for the engine's command queue
#[derive(Debug, Clone)]
pub struct CommandSender {
    tx: Sender<EngineCommand>,
}

impl CommandSender {
    pub(crate) fn new(tx: Sender<EngineCommand>) -> Self {
        Self { tx }
    }

    pub fn send(&self, command: EngineCommand) -> Result<(), SendError<EngineCommand>> {
        self.tx.send(command)
    }

    pub fn interrupt(&self, caster: CasterId) -> Result<(), SendError<EngineCommand>> {
        self.send(EngineCommand::Interrupt(caster))
    }

    pub fn push_symbol(
        &self,
        caster: CasterId,
        symbol: SymbolId,
        concept: ConceptId,
        timestamp: SimTime,
        knowledge: KnowledgeState,
    ) -> Result<(), SendError<EngineCommand>> {
        self.send(EngineCommand::PushSymbol {
            caster,
            symbol,
            concept,
            timestamp,
            knowledge,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::mpsc;
    use std::thread;

    #[test]
    fn test_commands_cross_threads_in_order() {
        let (tx, rx) = mpsc::channel();
        let sender = CommandSender::new(tx);
        let caster = CasterId::new(0, 0);

        let worker = {
            let sender = sender.clone();
            thread::spawn(move || {
                sender.interrupt(caster).unwrap();
                sender
                    .push_symbol(
                        caster,
                        SymbolId(4),
                        ConceptId::new("Bloom"),
                        SimTime::ZERO,
                        KnowledgeState::Suspected,
                    )
                    .unwrap();
            })
        };
        worker.join().unwrap();

        let received: Vec<_> = rx.try_iter().collect();
        assert_eq!(received.len(), 2);
        assert_eq!(received[0], EngineCommand::Interrupt(caster));
        assert!(matches!(received[1], EngineCommand::PushSymbol { .. }));
    }
}
