//! Property tests for longest-match resolution

use std::sync::Arc;
use std::time::Duration;

use proptest::prelude::*;

use seal_weave::core::types::{KnowledgeState, SymbolId};
use seal_weave::input::InputSequenceBuffer;
use seal_weave::resolver::SequenceResolver;
use seal_weave::{ConceptId, SimTime, TechniqueDefinition};

const CONCEPTS: [&str; 5] = ["Bloom", "Consume", "Scatter", "Anchor", "Yield"];
const WINDOW: Duration = Duration::from_millis(1500);

fn concept_seq(max_len: usize) -> impl Strategy<Value = Vec<&'static str>> {
    prop::collection::vec(prop::sample::select(CONCEPTS.to_vec()), 1..=max_len)
}

fn technique(id: &str, sequence: &[&str]) -> Arc<TechniqueDefinition> {
    Arc::new(TechniqueDefinition::new(id, sequence.iter().copied()))
}

fn buffer_of(concepts: &[&str]) -> InputSequenceBuffer {
    let mut buffer = InputSequenceBuffer::new(32);
    for (i, concept) in concepts.iter().enumerate() {
        buffer.push_symbol(
            SymbolId(i as u32),
            ConceptId::new(concept),
            SimTime::from_millis(i as u64 * 10),
            KnowledgeState::Known,
        );
    }
    buffer
}

fn now_for(concepts: &[&str]) -> SimTime {
    SimTime::from_millis(concepts.len() as u64 * 10)
}

proptest! {
    #[test]
    fn test_exact_sequence_resolves(
        sequences in prop::collection::vec(concept_seq(5), 1..8),
        pick in any::<prop::sample::Index>(),
    ) {
        let techniques: Vec<_> = sequences
            .iter()
            .enumerate()
            .map(|(i, s)| technique(&format!("T{}", i), s))
            .collect();
        let resolver = SequenceResolver::from_techniques(techniques.iter().cloned());

        let target = &sequences[pick.index(sequences.len())];
        let buffer = buffer_of(target);
        let found = resolver
            .resolve_longest_match(buffer.unconsumed_within(now_for(target), WINDOW).iter())
            .expect("registered sequence must resolve");

        // Later registrations win collisions, so compare sequences, not ids
        prop_assert_eq!(found.matched_len, target.len());
        let expected: Vec<ConceptId> = target.iter().map(|c| ConceptId::new(c)).collect();
        prop_assert_eq!(&found.technique.sequence, &expected);
    }

    #[test]
    fn test_longer_sequence_takes_precedence(
        prefix in concept_seq(3),
        suffix in concept_seq(3),
    ) {
        let full: Vec<&str> = prefix.iter().chain(suffix.iter()).copied().collect();
        let resolver = SequenceResolver::from_techniques([
            technique("Short", &prefix),
            technique("Long", &full),
        ]);

        let buffer = buffer_of(&full);
        let found = resolver
            .resolve_longest_match(buffer.unconsumed_within(now_for(&full), WINDOW).iter())
            .unwrap();

        prop_assert_eq!(found.technique.id.as_str(), "Long");
        prop_assert_eq!(found.matched_len, full.len());
    }

    #[test]
    fn test_reversed_pair_never_matches(
        (x, y) in (0..CONCEPTS.len(), 0..CONCEPTS.len()).prop_filter("distinct", |(x, y)| x != y),
    ) {
        let resolver = SequenceResolver::from_techniques([technique("XY", &[CONCEPTS[x], CONCEPTS[y]])]);

        let reversed = [CONCEPTS[y], CONCEPTS[x]];
        let buffer = buffer_of(&reversed);
        let found = resolver.resolve_longest_match(buffer.unconsumed_within(now_for(&reversed), WINDOW).iter());

        prop_assert!(found.is_none());
    }

    #[test]
    fn test_resolution_is_idempotent(
        sequences in prop::collection::vec(concept_seq(4), 1..6),
        inputs in concept_seq(8),
    ) {
        let resolver = SequenceResolver::from_techniques(
            sequences.iter().enumerate().map(|(i, s)| technique(&format!("T{}", i), s)),
        );
        let buffer = buffer_of(&inputs);
        let window = buffer.unconsumed_within(now_for(&inputs), WINDOW);

        let first = resolver.resolve_longest_match(window.iter());
        let second = resolver.resolve_longest_match(window.iter());

        prop_assert_eq!(first, second);
    }

    #[test]
    fn test_match_is_a_registered_prefix_of_input(
        sequences in prop::collection::vec(concept_seq(4), 1..6),
        inputs in concept_seq(8),
    ) {
        let resolver = SequenceResolver::from_techniques(
            sequences.iter().enumerate().map(|(i, s)| technique(&format!("T{}", i), s)),
        );
        let buffer = buffer_of(&inputs);

        if let Some(found) = resolver.resolve_longest_match(buffer.unconsumed_within(now_for(&inputs), WINDOW).iter()) {
            prop_assert!(found.matched_len <= resolver.max_depth());
            let matched: Vec<ConceptId> = inputs[..found.matched_len].iter().map(|c| ConceptId::new(c)).collect();
            prop_assert_eq!(&found.technique.sequence, &matched);
        }
    }
}
