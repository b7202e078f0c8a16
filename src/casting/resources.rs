//! Chakra and stability pools
//!
//! The pools belong to the stat subsystem; the engine sees them through the
//! `CasterStats` trait and only ever asks for an atomic debit of both.

use ahash::AHashMap;
use serde::{Deserialize, Serialize};

use crate::core::types::{CasterId, Vec2};
use crate::techniques::TechniqueCost;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ResourceKind {
    Chakra,
    Stability,
}

/// A depletable value clamped to `[0, max]`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ResourcePool {
    current: f32,
    max: f32,
}

impl ResourcePool {
    pub fn new(current: f32, max: f32) -> Self {
        let max = max.max(0.0);
        Self {
            current: current.clamp(0.0, max),
            max,
        }
    }

    pub fn full(max: f32) -> Self {
        Self::new(max, max)
    }

    pub fn current(&self) -> f32 {
        self.current
    }

    pub fn max(&self) -> f32 {
        self.max
    }

    pub fn can_afford(&self, amount: f32) -> bool {
        self.current >= amount
    }

    fn debit(&mut self, amount: f32) {
        self.current = (self.current - amount).clamp(0.0, self.max);
    }

    /// Add (or with a negative amount, drain) and clamp
    pub fn restore(&mut self, amount: f32) {
        self.current = (self.current + amount).clamp(0.0, self.max);
    }
}

/// Shortfall found by an affordability check
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResourceShortfall {
    pub pool: ResourceKind,
    pub required: f32,
    pub available: f32,
}

/// Both pools of one caster
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CasterVitals {
    pub chakra: ResourcePool,
    pub stability: ResourcePool,
}

impl CasterVitals {
    pub fn new(chakra: ResourcePool, stability: ResourcePool) -> Self {
        Self { chakra, stability }
    }

    pub fn pool(&self, kind: ResourceKind) -> &ResourcePool {
        match kind {
            ResourceKind::Chakra => &self.chakra,
            ResourceKind::Stability => &self.stability,
        }
    }

    /// First pool (chakra before stability) that cannot cover `cost`
    pub fn check(&self, cost: TechniqueCost) -> Result<(), ResourceShortfall> {
        for (kind, required) in [
            (ResourceKind::Chakra, cost.chakra),
            (ResourceKind::Stability, cost.stability),
        ] {
            let pool = self.pool(kind);
            if !pool.can_afford(required) {
                return Err(ResourceShortfall {
                    pool: kind,
                    required,
                    available: pool.current(),
                });
            }
        }
        Ok(())
    }

    /// Debit both pools if both can pay, otherwise neither
    pub fn try_spend(&mut self, cost: TechniqueCost) -> Result<(), ResourceShortfall> {
        self.check(cost)?;
        self.chakra.debit(cost.chakra);
        self.stability.debit(cost.stability);
        Ok(())
    }

    pub fn regenerate(&mut self, chakra: f32, stability: f32) {
        self.chakra.restore(chakra);
        self.stability.restore(stability);
    }
}

/// The slice of the stat subsystem the engine depends on
///
/// Injected at engine construction; the engine never looks stats up any
/// other way.
pub trait CasterStats {
    /// Current pools, or `None` if the stat subsystem does not know the caster
    fn vitals(&self, caster: CasterId) -> Option<CasterVitals>;

    /// Debit both costs in one step, or nothing at all
    fn try_debit(&mut self, caster: CasterId, cost: TechniqueCost) -> Result<(), ResourceShortfall>;

    /// Cast speed stat, if the caster has one
    fn cast_speed(&self, _caster: CasterId) -> Option<f32> {
        None
    }

    /// Where the caster is, forwarded with effect execution
    fn position(&self, _caster: CasterId) -> Option<Vec2> {
        None
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct CasterRecord {
    vitals: CasterVitals,
    cast_speed: Option<f32>,
    position: Option<Vec2>,
}

/// Map-backed `CasterStats` for headless runs and tests
#[derive(Debug, Clone, Default)]
pub struct VitalsLedger {
    records: AHashMap<CasterId, CasterRecord>,
}

impl VitalsLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, caster: CasterId, vitals: CasterVitals) {
        self.records.insert(
            caster,
            CasterRecord {
                vitals,
                cast_speed: None,
                position: None,
            },
        );
    }

    pub fn remove(&mut self, caster: CasterId) -> Option<CasterVitals> {
        self.records.remove(&caster).map(|r| r.vitals)
    }

    pub fn set_cast_speed(&mut self, caster: CasterId, speed: f32) {
        if let Some(record) = self.records.get_mut(&caster) {
            record.cast_speed = Some(speed);
        }
    }

    pub fn set_position(&mut self, caster: CasterId, position: Vec2) {
        if let Some(record) = self.records.get_mut(&caster) {
            record.position = Some(position);
        }
    }

    /// Regenerate every caster's pools by the given amounts
    pub fn regenerate_all(&mut self, chakra: f32, stability: f32) {
        for record in self.records.values_mut() {
            record.vitals.regenerate(chakra, stability);
        }
    }
}

impl CasterStats for VitalsLedger {
    fn vitals(&self, caster: CasterId) -> Option<CasterVitals> {
        self.records.get(&caster).map(|r| r.vitals)
    }

    fn try_debit(&mut self, caster: CasterId, cost: TechniqueCost) -> Result<(), ResourceShortfall> {
        match self.records.get_mut(&caster) {
            Some(record) => record.vitals.try_spend(cost),
            // No pools at all: nothing can be paid
            None => Err(ResourceShortfall {
                pool: ResourceKind::Chakra,
                required: cost.chakra,
                available: 0.0,
            }),
        }
    }

    fn cast_speed(&self, caster: CasterId) -> Option<f32> {
        self.records.get(&caster).and_then(|r| r.cast_speed)
    }

    fn position(&self, caster: CasterId) -> Option<Vec2> {
        self.records.get(&caster).and_then(|r| r.position)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vitals(chakra: f32, stability: f32) -> CasterVitals {
        CasterVitals::new(ResourcePool::new(chakra, 100.0), ResourcePool::new(stability, 100.0))
    }

    #[test]
    fn test_pool_clamped() {
        let mut pool = ResourcePool::new(150.0, 100.0);
        assert_eq!(pool.current(), 100.0);
        pool.restore(-250.0);
        assert_eq!(pool.current(), 0.0);
    }

    #[test]
    fn test_spend_both_pools() {
        let mut v = vitals(50.0, 100.0);
        assert!(v.try_spend(TechniqueCost::new(5.0, 10.0)).is_ok());
        assert_eq!(v.chakra.current(), 45.0);
        assert_eq!(v.stability.current(), 90.0);
    }

    #[test]
    fn test_stability_short_debits_nothing() {
        let mut v = vitals(50.0, 4.0);
        let err = v.try_spend(TechniqueCost::new(5.0, 10.0)).unwrap_err();

        assert_eq!(err.pool, ResourceKind::Stability);
        assert_eq!(err.available, 4.0);
        assert_eq!(v.chakra.current(), 50.0);
        assert_eq!(v.stability.current(), 4.0);
    }

    #[test]
    fn test_chakra_short_debits_nothing() {
        let mut v = vitals(3.0, 100.0);
        let err = v.try_spend(TechniqueCost::new(5.0, 10.0)).unwrap_err();

        assert_eq!(err.pool, ResourceKind::Chakra);
        assert_eq!(v.chakra.current(), 3.0);
        assert_eq!(v.stability.current(), 100.0);
    }

    #[test]
    fn test_exact_amount_affordable() {
        let mut v = vitals(5.0, 0.0);
        assert!(v.try_spend(TechniqueCost::new(5.0, 0.0)).is_ok());
        assert_eq!(v.chakra.current(), 0.0);
    }

    #[test]
    fn test_ledger_unknown_caster_cannot_pay() {
        let mut ledger = VitalsLedger::new();
        let result = ledger.try_debit(CasterId::new(0, 0), TechniqueCost::new(1.0, 0.0));
        assert!(result.is_err());
    }

    #[test]
    fn test_ledger_speed_and_position() {
        let mut ledger = VitalsLedger::new();
        let id = CasterId::new(1, 0);
        ledger.insert(id, vitals(10.0, 10.0));
        assert_eq!(ledger.cast_speed(id), None);

        ledger.set_cast_speed(id, 1.5);
        ledger.set_position(id, Vec2::new(3.0, 4.0));
        assert_eq!(ledger.cast_speed(id), Some(1.5));
        assert_eq!(ledger.position(id), Some(Vec2::new(3.0, 4.0)));
    }
}
