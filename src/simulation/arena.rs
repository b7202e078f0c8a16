//! Dense storage for per-caster state
//!
//! Slots live in a `Vec` indexed by `CasterId::index`. Freed slots are
//! reused with a bumped generation so stale handles miss instead of
//! touching the new occupant.

use crate::core::types::{CasterId, TechniqueId};
use crate::casting::CastingContext;
use crate::input::{EventSeq, InputSequenceBuffer};

/// Identity of a resolution attempt, used to report repeated failures once
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct AttemptKey {
    pub technique: TechniqueId,
    pub first_event: EventSeq,
    pub matched_len: usize,
}

/// Everything the engine owns for one caster
#[derive(Debug, Clone)]
pub struct CasterSlot {
    pub context: CastingContext,
    pub buffer: InputSequenceBuffer,
    pub(crate) last_failed_attempt: Option<AttemptKey>,
}

#[derive(Debug, Clone)]
struct Entry {
    generation: u32,
    slot: Option<CasterSlot>,
}

#[derive(Debug, Clone, Default)]
pub struct CasterArena {
    entries: Vec<Entry>,
    free: Vec<u32>,
    live: usize,
}

impl CasterArena {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an Idle caster with an empty input buffer
    pub fn spawn(&mut self, buffer_capacity: usize) -> CasterId {
        let index = match self.free.pop() {
            Some(index) => index,
            None => {
                self.entries.push(Entry {
                    generation: 0,
                    slot: None,
                });
                (self.entries.len() - 1) as u32
            }
        };

        let entry = &mut self.entries[index as usize];
        let id = CasterId::new(index, entry.generation);
        entry.slot = Some(CasterSlot {
            context: CastingContext::new(id),
            buffer: InputSequenceBuffer::new(buffer_capacity),
            last_failed_attempt: None,
        });
        self.live += 1;
        id
    }

    /// Remove a caster, returning its final state
    pub fn despawn(&mut self, id: CasterId) -> Option<CasterSlot> {
        let entry = self.entries.get_mut(id.index as usize)?;
        if entry.generation != id.generation {
            return None;
        }
        let slot = entry.slot.take()?;
        entry.generation = entry.generation.wrapping_add(1);
        self.free.push(id.index);
        self.live -= 1;
        Some(slot)
    }

    pub fn get(&self, id: CasterId) -> Option<&CasterSlot> {
        self.entries
            .get(id.index as usize)
            .filter(|e| e.generation == id.generation)
            .and_then(|e| e.slot.as_ref())
    }

    pub fn get_mut(&mut self, id: CasterId) -> Option<&mut CasterSlot> {
        self.entries
            .get_mut(id.index as usize)
            .filter(|e| e.generation == id.generation)
            .and_then(|e| e.slot.as_mut())
    }

    pub fn contains(&self, id: CasterId) -> bool {
        self.get(id).is_some()
    }

    /// Live caster handles in slot order
    pub fn ids(&self) -> impl Iterator<Item = CasterId> + '_ {
        self.entries.iter().enumerate().filter_map(|(index, e)| {
            e.slot
                .as_ref()
                .map(|_| CasterId::new(index as u32, e.generation))
        })
    }

    pub fn slots_mut(&mut self) -> impl Iterator<Item = &mut CasterSlot> {
        self.entries.iter_mut().filter_map(|e| e.slot.as_mut())
    }

    pub fn len(&self) -> usize {
        self.live
    }

    pub fn is_empty(&self) -> bool {
        self.live == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spawn_assigns_dense_indices() {
        let mut arena = CasterArena::new();
        let a = arena.spawn(8);
        let b = arena.spawn(8);
        assert_eq!(a, CasterId::new(0, 0));
        assert_eq!(b, CasterId::new(1, 0));
        assert_eq!(arena.len(), 2);
        assert_eq!(arena.get(b).unwrap().context.caster, b);
    }

    #[test]
    fn test_stale_handle_misses_after_reuse() {
        let mut arena = CasterArena::new();
        let a = arena.spawn(8);
        assert!(arena.despawn(a).is_some());
        let b = arena.spawn(8);

        assert_eq!(b.index, a.index);
        assert_ne!(b.generation, a.generation);
        assert!(arena.get(a).is_none());
        assert!(arena.despawn(a).is_none());
        assert!(arena.contains(b));
    }

    #[test]
    fn test_ids_skip_free_slots() {
        let mut arena = CasterArena::new();
        let a = arena.spawn(8);
        let b = arena.spawn(8);
        let c = arena.spawn(8);
        arena.despawn(b);

        let ids: Vec<_> = arena.ids().collect();
        assert_eq!(ids, vec![a, c]);
        assert_eq!(arena.slots_mut().count(), 2);
    }

    #[test]
    fn test_buffer_uses_requested_capacity() {
        let mut arena = CasterArena::new();
        let a = arena.spawn(3);
        assert_eq!(arena.get(a).unwrap().buffer.capacity(), 3);
    }
}
