//! Technique definitions
//!
//! A definition is static content: which concept sequence unlocks it, what
//! it costs, and how long each phase lasts. What the technique *does* is an
//! opaque effect descriptor handed to the presentation layer untouched.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::core::error::CatalogError;
use crate::core::types::{duration_from_secs, secs, ConceptId, TechniqueId};

/// Opaque effect payload (damage, radius, etc. are decided elsewhere)
pub type EffectDescriptor = serde_json::Value;

/// Cost of starting a technique, debited from both pools at once
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct TechniqueCost {
    pub chakra: f32,
    pub stability: f32,
}

impl TechniqueCost {
    pub fn new(chakra: f32, stability: f32) -> Self {
        Self { chakra, stability }
    }
}

/// Immutable definition of a technique
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TechniqueDefinition {
    pub id: TechniqueId,
    /// Ordered concepts that unlock this technique (never empty)
    pub sequence: Vec<ConceptId>,
    #[serde(default)]
    pub chakra_cost: f32,
    #[serde(default)]
    pub stability_cost: f32,
    #[serde(with = "secs", rename = "cast_time", default)]
    pub cast_duration: Duration,
    #[serde(with = "secs", rename = "recovery_time", default)]
    pub recovery_duration: Duration,
    #[serde(default)]
    pub effect: EffectDescriptor,
}

impl TechniqueDefinition {
    pub fn new<I, C>(id: impl Into<TechniqueId>, sequence: I) -> Self
    where
        I: IntoIterator<Item = C>,
        C: Into<ConceptId>,
    {
        Self {
            id: id.into(),
            sequence: sequence.into_iter().map(Into::into).collect(),
            chakra_cost: 0.0,
            stability_cost: 0.0,
            cast_duration: Duration::ZERO,
            recovery_duration: Duration::ZERO,
            effect: EffectDescriptor::Null,
        }
    }

    pub fn with_costs(mut self, chakra: f32, stability: f32) -> Self {
        self.chakra_cost = chakra;
        self.stability_cost = stability;
        self
    }

    pub fn with_cast_duration(mut self, duration: Duration) -> Self {
        self.cast_duration = duration;
        self
    }

    pub fn with_recovery_duration(mut self, duration: Duration) -> Self {
        self.recovery_duration = duration;
        self
    }

    pub fn with_effect(mut self, effect: EffectDescriptor) -> Self {
        self.effect = effect;
        self
    }

    pub fn cost(&self) -> TechniqueCost {
        TechniqueCost::new(self.chakra_cost, self.stability_cost)
    }

    /// Preparation time once the caster's speed stat is applied
    ///
    /// Non-positive or non-finite multipliers leave the base duration as-is.
    pub fn scaled_cast_duration(&self, speed_multiplier: f32) -> Duration {
        if !speed_multiplier.is_finite() || speed_multiplier <= 0.0 || speed_multiplier == 1.0 {
            return self.cast_duration;
        }
        duration_from_secs(self.cast_duration.as_secs_f64() / speed_multiplier as f64)
    }

    pub fn validate(&self) -> Result<(), CatalogError> {
        if self.sequence.is_empty() {
            return Err(CatalogError::EmptySequence(self.id.clone()));
        }
        for (field, value) in [("chakra_cost", self.chakra_cost), ("stability_cost", self.stability_cost)] {
            if !value.is_finite() || value < 0.0 {
                return Err(CatalogError::InvalidCost {
                    id: self.id.clone(),
                    field,
                    value,
                });
            }
        }
        Ok(())
    }
}
