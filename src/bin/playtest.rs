//! Scripted playtest - walks one caster through the canonical scenarios
//!
//! Each scenario prints the signals it produced and a PASS/FAIL line, so a
//! quick run shows whether the engine behaves the way a player expects.

use std::time::Duration;

use seal_weave::casting::{
    CastSignal, CastState, CasterVitals, ResourceKind, ResourcePool, SignalKind, SignalLog,
    VitalsLedger,
};
use seal_weave::core::error::FailureReason;
use seal_weave::core::types::{KnowledgeState, SymbolId};
use seal_weave::{CasterId, CasterStats, ConceptId, EngineConfig, SimTime, TechniqueDefinition, TechniqueEngine};

const STEP: Duration = Duration::from_millis(100);

type Engine = TechniqueEngine<VitalsLedger, SignalLog>;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    println!("=== Seal Weave Playtest ===\n");

    let results = [
        ("cast cycle", scenario_cast_cycle()),
        ("insufficient chakra", scenario_insufficient()),
        ("interrupted while preparing", scenario_interrupt()),
    ];

    println!("\n=== Summary ===");
    let mut failures = 0;
    for (name, passed) in results {
        println!("  {:<30} {}", name, if passed { "PASS" } else { "FAIL" });
        if !passed {
            failures += 1;
        }
    }
    if failures > 0 {
        std::process::exit(1);
    }
}

fn ember() -> TechniqueDefinition {
    TechniqueDefinition::new("T1", ["Bloom", "Consume"])
        .with_costs(5.0, 0.0)
        .with_cast_duration(Duration::from_millis(500))
        .with_recovery_duration(Duration::from_millis(300))
}

fn setup(chakra: f32) -> (Engine, CasterId) {
    let mut engine = TechniqueEngine::new(EngineConfig::default(), VitalsLedger::new(), SignalLog::new())
        .expect("default config is valid");
    engine.register_technique(ember()).expect("T1 is valid");
    let caster = engine.spawn_caster();
    engine.stats_mut().insert(
        caster,
        CasterVitals::new(ResourcePool::new(chakra, 100.0), ResourcePool::full(100.0)),
    );
    (engine, caster)
}

fn press(engine: &mut Engine, caster: CasterId, concept: &str, at: SimTime) {
    engine
        .push_symbol(caster, SymbolId(0), ConceptId::new(concept), at, KnowledgeState::Known)
        .expect("caster exists");
}

fn run_until(engine: &mut Engine, until: SimTime) {
    while engine.now() < until {
        engine.tick(STEP);
    }
}

fn print_signals(engine: &mut Engine) {
    for signal in engine.sink_mut().drain() {
        println!("  [{}] {:?}", signal.caster(), signal);
    }
}

fn chakra(engine: &Engine, caster: CasterId) -> f32 {
    engine
        .stats()
        .vitals(caster)
        .map(|v| v.chakra.current())
        .unwrap_or(0.0)
}

fn scenario_cast_cycle() -> bool {
    println!("--- cast cycle ---");
    let (mut engine, caster) = setup(50.0);

    press(&mut engine, caster, "Bloom", SimTime::ZERO);
    run_until(&mut engine, SimTime::from_millis(200));
    press(&mut engine, caster, "Consume", SimTime::from_millis(300));
    run_until(&mut engine, SimTime::from_millis(300));
    let prepared = engine.state(caster) == Some(CastState::Preparing) && chakra(&engine, caster) == 45.0;

    run_until(&mut engine, SimTime::from_millis(800));
    let executed = engine.sink().count(SignalKind::EffectExecuted) == 1;

    run_until(&mut engine, SimTime::from_millis(1100));
    let idle = engine.state(caster) == Some(CastState::Idle);

    print_signals(&mut engine);
    prepared && executed && idle
}

fn scenario_insufficient() -> bool {
    println!("--- insufficient chakra ---");
    let (mut engine, caster) = setup(3.0);

    press(&mut engine, caster, "Bloom", SimTime::ZERO);
    press(&mut engine, caster, "Consume", SimTime::ZERO);
    run_until(&mut engine, SimTime::from_millis(300));

    let failed = engine
        .sink()
        .of_kind(SignalKind::CastFailed)
        .any(|s| {
            matches!(
                s,
                CastSignal::CastFailed {
                    reason: FailureReason::InsufficientResource(ResourceKind::Chakra),
                    ..
                }
            )
        });
    let untouched = chakra(&engine, caster) == 3.0 && engine.state(caster) == Some(CastState::Idle);

    print_signals(&mut engine);
    failed && untouched
}

fn scenario_interrupt() -> bool {
    println!("--- interrupted while preparing ---");
    let (mut engine, caster) = setup(50.0);

    press(&mut engine, caster, "Bloom", SimTime::ZERO);
    press(&mut engine, caster, "Consume", SimTime::ZERO);
    engine.tick(STEP);
    engine.tick(STEP);
    let interrupted = engine.interrupt(caster).unwrap_or(false)
        && engine.state(caster) == Some(CastState::Interrupted);

    let delay = engine.config().interrupted_recovery_delay();
    let until = engine.now() + delay;
    run_until(&mut engine, until);

    let recovered = engine.state(caster) == Some(CastState::Idle);
    let no_effect = engine.sink().count(SignalKind::EffectExecuted) == 0;

    print_signals(&mut engine);
    interrupted && recovered && no_effect
}
