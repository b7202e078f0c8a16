//! Storage and lookup for technique definitions

use ahash::AHashMap;
use std::sync::Arc;

use crate::core::error::CatalogError;
use crate::core::types::{ConceptId, TechniqueId};
use crate::techniques::definition::TechniqueDefinition;

/// All registered techniques, unique by exact sequence
#[derive(Debug, Clone, Default)]
pub struct TechniqueCatalog {
    by_id: AHashMap<TechniqueId, Arc<TechniqueDefinition>>,
    by_sequence: AHashMap<Vec<ConceptId>, TechniqueId>,
}

impl TechniqueCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a definition
    ///
    /// A definition whose sequence is already registered replaces the old
    /// one, which is returned (the resolver reports the collision). Reusing
    /// an id for a different sequence is rejected.
    pub fn register(
        &mut self,
        definition: TechniqueDefinition,
    ) -> Result<(Arc<TechniqueDefinition>, Option<Arc<TechniqueDefinition>>), CatalogError> {
        definition.validate()?;

        if let Some(existing) = self.by_id.get(&definition.id) {
            if existing.sequence != definition.sequence {
                return Err(CatalogError::DuplicateId(definition.id.clone()));
            }
        }

        let displaced = self
            .by_sequence
            .get(&definition.sequence)
            .cloned()
            .and_then(|id| self.by_id.remove(&id));

        let definition = Arc::new(definition);
        self.by_sequence
            .insert(definition.sequence.clone(), definition.id.clone());
        self.by_id.insert(definition.id.clone(), Arc::clone(&definition));

        Ok((definition, displaced))
    }

    pub fn get(&self, id: &TechniqueId) -> Option<&Arc<TechniqueDefinition>> {
        self.by_id.get(id)
    }

    pub fn by_sequence(&self, sequence: &[ConceptId]) -> Option<&Arc<TechniqueDefinition>> {
        self.by_sequence
            .get(sequence)
            .and_then(|id| self.by_id.get(id))
    }

    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<TechniqueDefinition>> {
        self.by_id.values()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn concepts(names: &[&str]) -> Vec<ConceptId> {
        names.iter().map(|n| ConceptId::new(n)).collect()
    }

    #[test]
    fn test_register_and_lookup() {
        let mut catalog = TechniqueCatalog::new();
        catalog
            .register(TechniqueDefinition::new("Ember", ["Bloom", "Consume"]))
            .unwrap();

        assert_eq!(catalog.len(), 1);
        assert!(catalog.get(&TechniqueId::new("Ember")).is_some());
        assert!(catalog.by_sequence(&concepts(&["Bloom", "Consume"])).is_some());
        assert!(catalog.by_sequence(&concepts(&["Consume", "Bloom"])).is_none());
    }

    #[test]
    fn test_same_sequence_overwrites() {
        let mut catalog = TechniqueCatalog::new();
        catalog
            .register(TechniqueDefinition::new("Ember", ["Bloom", "Consume"]))
            .unwrap();
        let (_, displaced) = catalog
            .register(TechniqueDefinition::new("Cinder", ["Bloom", "Consume"]))
            .unwrap();

        assert_eq!(displaced.unwrap().id, TechniqueId::new("Ember"));
        assert_eq!(catalog.len(), 1);
        assert!(catalog.get(&TechniqueId::new("Ember")).is_none());
        assert_eq!(
            catalog.by_sequence(&concepts(&["Bloom", "Consume"])).unwrap().id,
            TechniqueId::new("Cinder")
        );
    }

    #[test]
    fn test_id_reuse_with_new_sequence_rejected() {
        let mut catalog = TechniqueCatalog::new();
        catalog
            .register(TechniqueDefinition::new("Ember", ["Bloom"]))
            .unwrap();
        let result = catalog.register(TechniqueDefinition::new("Ember", ["Consume"]));

        assert_eq!(result.unwrap_err(), CatalogError::DuplicateId(TechniqueId::new("Ember")));
        assert_eq!(catalog.len(), 1);
    }
}
