//! Longest-match sequence resolution
//!
//! Techniques are stored in a prefix tree keyed by concept. Resolution walks
//! the tree one input at a time from the root and remembers the deepest node
//! that carried a technique. The walk stops at the first input that does not
//! extend the current path; it never restarts from a later input.

use ahash::AHashMap;
use std::sync::Arc;

use crate::core::types::ConceptId;
use crate::input::InputEvent;
use crate::techniques::TechniqueDefinition;

type NodeIndex = usize;

const ROOT: NodeIndex = 0;

#[derive(Debug, Clone, Default)]
struct TrieNode {
    children: AHashMap<ConceptId, NodeIndex>,
    technique: Option<Arc<TechniqueDefinition>>,
}

/// Result of a successful resolution
#[derive(Debug, Clone, PartialEq)]
pub struct TechniqueMatch {
    pub technique: Arc<TechniqueDefinition>,
    /// How many leading events of the window the match used
    pub matched_len: usize,
}

/// Prefix tree over registered technique sequences
#[derive(Debug, Clone)]
pub struct SequenceResolver {
    nodes: Vec<TrieNode>,
    max_depth: usize,
    technique_count: usize,
}

impl Default for SequenceResolver {
    fn default() -> Self {
        Self::new()
    }
}

impl SequenceResolver {
    pub fn new() -> Self {
        Self {
            nodes: vec![TrieNode::default()],
            max_depth: 0,
            technique_count: 0,
        }
    }

    /// Build a resolver holding every technique in `techniques`
    pub fn from_techniques<I>(techniques: I) -> Self
    where
        I: IntoIterator<Item = Arc<TechniqueDefinition>>,
    {
        let mut resolver = Self::new();
        for technique in techniques {
            resolver.register(technique);
        }
        resolver
    }

    /// Add a technique, returning the one it displaced on a sequence collision
    ///
    /// Empty sequences are ignored (the catalog rejects them earlier).
    pub fn register(&mut self, technique: Arc<TechniqueDefinition>) -> Option<Arc<TechniqueDefinition>> {
        if technique.sequence.is_empty() {
            tracing::warn!("Ignoring technique {} with empty sequence", technique.id);
            return None;
        }

        let mut node = ROOT;
        for concept in &technique.sequence {
            node = match self.nodes[node].children.get(concept) {
                Some(&child) => child,
                None => {
                    let child = self.nodes.len();
                    self.nodes.push(TrieNode::default());
                    self.nodes[node].children.insert(concept.clone(), child);
                    child
                }
            };
        }

        self.max_depth = self.max_depth.max(technique.sequence.len());
        let displaced = self.nodes[node].technique.replace(technique);
        match &displaced {
            Some(old) => {
                let new_id = self.nodes[node].technique.as_ref().map(|t| t.id.clone());
                tracing::warn!(
                    "Sequence collision on {:?}: {:?} overwrites {}",
                    old.sequence,
                    new_id,
                    old.id
                );
            }
            None => self.technique_count += 1,
        }
        displaced
    }

    /// Longest prefix of `events` that ends on a technique
    ///
    /// A path that runs past the last technique-bearing node without reaching
    /// another one is discarded (a fizzle for that tail).
    pub fn resolve_longest_match<'a, I>(&self, events: I) -> Option<TechniqueMatch>
    where
        I: IntoIterator<Item = &'a InputEvent>,
    {
        let mut node = ROOT;
        let mut best: Option<(NodeIndex, usize)> = None;

        for (walked, event) in events.into_iter().take(self.max_depth).enumerate() {
            match self.nodes[node].children.get(&event.concept) {
                Some(&child) => node = child,
                None => break,
            }
            if self.nodes[node].technique.is_some() {
                best = Some((node, walked + 1));
            }
        }

        best.and_then(|(node, matched_len)| {
            self.nodes[node]
                .technique
                .as_ref()
                .map(|technique| TechniqueMatch {
                    technique: Arc::clone(technique),
                    matched_len,
                })
        })
    }

    /// Whether some registered sequence starts with `prefix`
    pub fn has_prefix(&self, prefix: &[ConceptId]) -> bool {
        let mut node = ROOT;
        for concept in prefix {
            match self.nodes[node].children.get(concept) {
                Some(&child) => node = child,
                None => return false,
            }
        }
        true
    }

    /// Length of the longest registered sequence
    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    pub fn technique_count(&self) -> usize {
        self.technique_count
    }
}
