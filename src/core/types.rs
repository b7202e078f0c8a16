//! Core type definitions used throughout the codebase

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

/// Stable handle to a caster slot in the engine arena
///
/// The generation is bumped every time a slot is reused, so a handle held
/// past `despawn_caster` never aliases the caster that replaced it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CasterId {
    pub index: u32,
    pub generation: u32,
}

impl CasterId {
    pub fn new(index: u32, generation: u32) -> Self {
        Self { index, generation }
    }
}

impl fmt::Display for CasterId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "caster#{}v{}", self.index, self.generation)
    }
}

/// Raw input token identifier, as issued by the input layer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SymbolId(pub u32);

/// Semantic concept currently bound to a symbol (world-dependent)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConceptId(Arc<str>);

impl ConceptId {
    pub fn new(name: impl AsRef<str>) -> Self {
        Self(Arc::from(name.as_ref()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ConceptId {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl fmt::Display for ConceptId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Name of a technique in the catalog
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TechniqueId(Arc<str>);

impl TechniqueId {
    pub fn new(name: impl AsRef<str>) -> Self {
        Self(Arc::from(name.as_ref()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for TechniqueId {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl fmt::Display for TechniqueId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// How much the caster knows about what a symbol means
///
/// Not used for matching; carried through to discovery feedback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum KnowledgeState {
    #[default]
    Unknown,
    Suspected,
    Known,
}

/// Simulation timestamp measured from session start
///
/// Backed by integer nanoseconds so that summing tick deltas is exact.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SimTime(Duration);

impl SimTime {
    pub const ZERO: SimTime = SimTime(Duration::ZERO);

    pub fn from_secs_f64(secs: f64) -> Self {
        Self(duration_from_secs(secs))
    }

    pub fn from_millis(millis: u64) -> Self {
        Self(Duration::from_millis(millis))
    }

    pub fn as_secs_f64(&self) -> f64 {
        self.0.as_secs_f64()
    }

    /// Earlier time, floored at session start
    pub fn saturating_sub(&self, span: Duration) -> Self {
        Self(self.0.saturating_sub(span))
    }
}

impl std::ops::Add<Duration> for SimTime {
    type Output = Self;
    fn add(self, rhs: Duration) -> Self {
        Self(self.0 + rhs)
    }
}

impl std::ops::AddAssign<Duration> for SimTime {
    fn add_assign(&mut self, rhs: Duration) {
        self.0 += rhs;
    }
}

impl fmt::Display for SimTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.3}s", self.as_secs_f64())
    }
}

/// Convert float seconds to a duration rounded to the nearest nanosecond
///
/// Negative and non-finite inputs map to zero.
pub fn duration_from_secs(secs: f64) -> Duration {
    if !secs.is_finite() || secs <= 0.0 {
        return Duration::ZERO;
    }
    Duration::from_nanos((secs * 1e9).round() as u64)
}

/// Simulation tick counter
pub type Tick = u64;

/// 2D position
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// Serde adapter for durations written as float seconds (`cast_time = 0.5`)
pub mod secs {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(value.as_secs_f64())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        let secs = f64::deserialize(deserializer)?;
        if !secs.is_finite() || secs < 0.0 {
            return Err(serde::de::Error::custom(format!(
                "duration must be a non-negative number of seconds, got {}",
                secs
            )));
        }
        Ok(super::duration_from_secs(secs))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_concept_equality_by_name() {
        assert_eq!(ConceptId::new("Bloom"), ConceptId::from("Bloom"));
        assert_ne!(ConceptId::new("Bloom"), ConceptId::new("Consume"));
    }

    #[test]
    fn test_concept_serializes_as_plain_string() {
        let json = serde_json::to_string(&ConceptId::new("Bloom")).unwrap();
        assert_eq!(json, "\"Bloom\"");
    }

    #[test]
    fn test_sim_time_tick_sum_is_exact() {
        let mut t = SimTime::ZERO;
        for _ in 0..8 {
            t += Duration::from_millis(100);
        }
        assert_eq!(t, SimTime::from_millis(800));
        assert_eq!(t, SimTime::from_secs_f64(0.8));
    }

    #[test]
    fn test_duration_from_secs_rounds() {
        assert_eq!(duration_from_secs(0.3), Duration::from_millis(300));
        assert_eq!(duration_from_secs(-1.0), Duration::ZERO);
        assert_eq!(duration_from_secs(f64::NAN), Duration::ZERO);
    }

    #[test]
    fn test_sim_time_saturating_sub() {
        let t = SimTime::from_millis(300);
        assert_eq!(t.saturating_sub(Duration::from_secs(2)), SimTime::ZERO);
        assert_eq!(
            t.saturating_sub(Duration::from_millis(100)),
            SimTime::from_millis(200)
        );
    }

    #[test]
    fn test_caster_id_display() {
        assert_eq!(CasterId::new(3, 1).to_string(), "caster#3v1");
    }
}
