//! Fixed-capacity chronological log of a caster's inputs

use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::time::Duration;

use crate::core::types::{ConceptId, KnowledgeState, SimTime, SymbolId};

/// Position of an event in its buffer's arrival order
///
/// Never reused within a buffer, so it stays a valid name for an event
/// after older events have been evicted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EventSeq(pub u64);

/// A single symbol press, as seen by resolution
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InputEvent {
    pub seq: EventSeq,
    pub symbol: SymbolId,
    pub concept: ConceptId,
    pub timestamp: SimTime,
    pub knowledge: KnowledgeState,
    pub consumed: bool,
}

/// Per-caster input log
///
/// When full, the oldest event is evicted whether or not it was consumed.
#[derive(Debug, Clone)]
pub struct InputSequenceBuffer {
    events: VecDeque<InputEvent>,
    capacity: usize,
    next_seq: u64,
}

impl InputSequenceBuffer {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            events: VecDeque::with_capacity(capacity),
            capacity,
            next_seq: 0,
        }
    }

    /// Append an event, evicting the oldest one if over capacity
    ///
    /// A timestamp earlier than the newest buffered event is raised to it,
    /// keeping the log in time order.
    pub fn push_symbol(
        &mut self,
        symbol: SymbolId,
        concept: ConceptId,
        timestamp: SimTime,
        knowledge: KnowledgeState,
    ) -> EventSeq {
        let timestamp = match self.events.back() {
            Some(last) if timestamp < last.timestamp => {
                tracing::warn!(
                    "Out-of-order input at {} (newest is {}), clamping",
                    timestamp,
                    last.timestamp
                );
                last.timestamp
            }
            _ => timestamp,
        };

        if self.events.len() >= self.capacity {
            if let Some(evicted) = self.events.pop_front() {
                tracing::trace!("Evicted input {:?} ({})", evicted.seq, evicted.concept);
            }
        }

        let seq = EventSeq(self.next_seq);
        self.next_seq += 1;
        self.events.push_back(InputEvent {
            seq,
            symbol,
            concept,
            timestamp,
            knowledge,
            consumed: false,
        });
        seq
    }

    /// Unconsumed events no older than `window` at time `now`, oldest first
    pub fn unconsumed_within(&self, now: SimTime, window: Duration) -> InputWindow<'_> {
        InputWindow {
            events: &self.events,
            cutoff: now.saturating_sub(window),
        }
    }

    /// Flag events so future resolutions skip them
    ///
    /// Returns how many were newly consumed. Unknown or evicted sequence
    /// numbers are ignored.
    pub fn mark_consumed(&mut self, seqs: &[EventSeq]) -> usize {
        let mut marked = 0;
        for event in self.events.iter_mut() {
            if !event.consumed && seqs.contains(&event.seq) {
                event.consumed = true;
                marked += 1;
            }
        }
        marked
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Every buffered event, consumed or not
    pub fn iter(&self) -> impl Iterator<Item = &InputEvent> {
        self.events.iter()
    }
}

/// Restartable view over the resolvable part of a buffer
///
/// Holds no state of its own; each call to `iter` walks from the start.
#[derive(Debug, Clone, Copy)]
pub struct InputWindow<'a> {
    events: &'a VecDeque<InputEvent>,
    cutoff: SimTime,
}

impl<'a> InputWindow<'a> {
    pub fn iter(&self) -> impl Iterator<Item = &'a InputEvent> + Clone + 'a {
        let cutoff = self.cutoff;
        let events: &'a VecDeque<InputEvent> = self.events;
        events
            .iter()
            .filter(move |e| !e.consumed && e.timestamp >= cutoff)
    }

    pub fn len(&self) -> usize {
        self.iter().count()
    }

    pub fn is_empty(&self) -> bool {
        self.iter().next().is_none()
    }

    /// Sequence numbers of the first `count` events
    pub fn first_seqs(&self, count: usize) -> Vec<EventSeq> {
        self.iter().take(count).map(|e| e.seq).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn push(buffer: &mut InputSequenceBuffer, concept: &str, millis: u64) -> EventSeq {
        buffer.push_symbol(
            SymbolId(0),
            ConceptId::new(concept),
            SimTime::from_millis(millis),
            KnowledgeState::Known,
        )
    }

    fn concepts(window: &InputWindow<'_>) -> Vec<String> {
        window.iter().map(|e| e.concept.to_string()).collect()
    }

    #[test]
    fn test_empty_buffer_yields_empty_window() {
        let buffer = InputSequenceBuffer::new(4);
        let window = buffer.unconsumed_within(SimTime::from_millis(1000), Duration::from_secs(1));
        assert!(window.is_empty());
        assert_eq!(window.len(), 0);
    }

    #[test]
    fn test_window_preserves_arrival_order() {
        let mut buffer = InputSequenceBuffer::new(4);
        push(&mut buffer, "Bloom", 0);
        push(&mut buffer, "Consume", 100);
        push(&mut buffer, "Scatter", 200);

        let window = buffer.unconsumed_within(SimTime::from_millis(200), Duration::from_secs(1));
        assert_eq!(concepts(&window), vec!["Bloom", "Consume", "Scatter"]);
    }

    #[test]
    fn test_capacity_evicts_oldest() {
        let mut buffer = InputSequenceBuffer::new(2);
        push(&mut buffer, "Bloom", 0);
        push(&mut buffer, "Consume", 100);
        push(&mut buffer, "Scatter", 200);

        assert_eq!(buffer.len(), 2);
        let window = buffer.unconsumed_within(SimTime::from_millis(200), Duration::from_secs(1));
        assert_eq!(concepts(&window), vec!["Consume", "Scatter"]);
    }

    #[test]
    fn test_old_events_fall_out_of_window() {
        let mut buffer = InputSequenceBuffer::new(4);
        push(&mut buffer, "Bloom", 0);
        push(&mut buffer, "Consume", 2000);

        let window =
            buffer.unconsumed_within(SimTime::from_millis(2000), Duration::from_millis(1500));
        assert_eq!(concepts(&window), vec!["Consume"]);
        // Still physically present until capacity pushes it out
        assert_eq!(buffer.len(), 2);
    }

    #[test]
    fn test_window_boundary_is_inclusive() {
        let mut buffer = InputSequenceBuffer::new(4);
        push(&mut buffer, "Bloom", 500);

        let window =
            buffer.unconsumed_within(SimTime::from_millis(2000), Duration::from_millis(1500));
        assert_eq!(window.len(), 1);
    }

    #[test]
    fn test_mark_consumed_excludes_events() {
        let mut buffer = InputSequenceBuffer::new(4);
        let a = push(&mut buffer, "Bloom", 0);
        push(&mut buffer, "Consume", 100);

        assert_eq!(buffer.mark_consumed(&[a]), 1);
        assert_eq!(buffer.mark_consumed(&[a]), 0);

        let window = buffer.unconsumed_within(SimTime::from_millis(100), Duration::from_secs(1));
        assert_eq!(concepts(&window), vec!["Consume"]);
    }

    #[test]
    fn test_mark_consumed_ignores_evicted() {
        let mut buffer = InputSequenceBuffer::new(1);
        let a = push(&mut buffer, "Bloom", 0);
        push(&mut buffer, "Consume", 100);

        assert_eq!(buffer.mark_consumed(&[a]), 0);
    }

    #[test]
    fn test_out_of_order_timestamp_clamped() {
        let mut buffer = InputSequenceBuffer::new(4);
        push(&mut buffer, "Bloom", 300);
        push(&mut buffer, "Consume", 100);

        let stamps: Vec<SimTime> = buffer.iter().map(|e| e.timestamp).collect();
        assert_eq!(stamps, vec![SimTime::from_millis(300), SimTime::from_millis(300)]);
    }

    #[test]
    fn test_window_is_restartable() {
        let mut buffer = InputSequenceBuffer::new(4);
        push(&mut buffer, "Bloom", 0);
        push(&mut buffer, "Consume", 100);

        let window = buffer.unconsumed_within(SimTime::from_millis(100), Duration::from_secs(1));
        let first: Vec<_> = window.iter().map(|e| e.seq).collect();
        let second: Vec<_> = window.iter().map(|e| e.seq).collect();
        assert_eq!(first, second);
        assert_eq!(window.first_seqs(1), vec![first[0]]);
    }
}
