//! Headless cast simulation
//!
//! Spawns a crowd of casters, feeds each a seeded random stream of concept
//! presses, and reports how many casts resolved, started, failed and
//! fizzled.

use std::path::PathBuf;
use std::time::{Duration, Instant};

use clap::Parser;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::Serialize;

use seal_weave::casting::{CasterVitals, ResourcePool, SignalKind, SignalLog, VitalsLedger};
use seal_weave::core::error::Result;
use seal_weave::core::types::{KnowledgeState, SymbolId};
use seal_weave::techniques::{load_catalog, parse_catalog, DEFAULT_CATALOG};
use seal_weave::{ConceptId, EngineConfig, TechniqueEngine};

/// Headless cast simulation - random inputs through the full engine
#[derive(Parser, Debug)]
#[command(name = "cast_sim")]
#[command(about = "Run many casters against a technique catalog and summarise the signals")]
struct Args {
    /// Engine config TOML (defaults built in)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Technique catalog TOML (defaults built in)
    #[arg(long)]
    catalog: Option<PathBuf>,

    /// Number of casters
    #[arg(long, default_value_t = 100)]
    casters: usize,

    /// Ticks to simulate
    #[arg(long, default_value_t = 600)]
    ticks: u64,

    /// Tick length in milliseconds
    #[arg(long, default_value_t = 50)]
    tick_ms: u64,

    /// Chance per tick that a caster presses a symbol
    #[arg(long, default_value_t = 0.25, value_parser = probability)]
    press_chance: f64,

    /// Chance per tick that a busy caster is struck
    #[arg(long, default_value_t = 0.01, value_parser = probability)]
    hit_chance: f64,

    /// Chakra and stability regenerated per tick
    #[arg(long, default_value_t = 0.2)]
    regen: f32,

    /// Random seed for deterministic runs
    #[arg(long, default_value_t = 42)]
    seed: u64,

    /// Output format: json or text
    #[arg(long, default_value = "text")]
    format: String,
}

/// Parse a chance in [0, 1]
fn probability(s: &str) -> std::result::Result<f64, String> {
    let value: f64 = s.parse().map_err(|_| format!("`{}` is not a number", s))?;
    if (0.0..=1.0).contains(&value) {
        Ok(value)
    } else {
        Err(format!("{} is outside [0, 1]", value))
    }
}

#[derive(Debug, Serialize)]
struct Summary {
    casters: usize,
    ticks: u64,
    seed: u64,
    techniques: usize,
    resolved: usize,
    failed: usize,
    effects: usize,
    state_changes: usize,
    started: usize,
    refused: usize,
    fizzles: usize,
    elapsed_ms: u128,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .init();

    let args = Args::parse();

    let config = match &args.config {
        Some(path) => EngineConfig::load(path)?,
        None => EngineConfig::default(),
    };
    let definitions = match &args.catalog {
        Some(path) => load_catalog(path)?,
        None => parse_catalog(DEFAULT_CATALOG)?,
    };

    let concepts: Vec<ConceptId> = {
        let mut all: Vec<ConceptId> = definitions
            .iter()
            .flat_map(|d| d.sequence.iter().cloned())
            .collect();
        all.sort();
        all.dedup();
        all
    };

    let mut engine = TechniqueEngine::new(config, VitalsLedger::new(), SignalLog::counting())?;
    let techniques = engine.register_catalog(definitions)?;

    let mut rng = ChaCha8Rng::seed_from_u64(args.seed);
    let casters: Vec<_> = (0..args.casters)
        .map(|_| {
            let id = engine.spawn_caster();
            let chakra = rng.gen_range(20.0..80.0);
            let stability = rng.gen_range(20.0..80.0);
            engine.stats_mut().insert(
                id,
                CasterVitals::new(ResourcePool::full(chakra), ResourcePool::full(stability)),
            );
            engine.stats_mut().set_cast_speed(id, rng.gen_range(0.8..1.4));
            id
        })
        .collect();

    let tick = Duration::from_millis(args.tick_ms);
    let (mut started, mut refused, mut fizzles) = (0, 0, 0);
    let mut symbol = 0u32;
    let timer = Instant::now();

    for _ in 0..args.ticks {
        let now = engine.now() + tick;
        for &caster in &casters {
            if !concepts.is_empty() && rng.gen_bool(args.press_chance) {
                let concept = concepts[rng.gen_range(0..concepts.len())].clone();
                let knowledge = if rng.gen_bool(0.5) {
                    KnowledgeState::Known
                } else {
                    KnowledgeState::Suspected
                };
                let _ = engine.push_symbol(caster, SymbolId(symbol), concept, now, knowledge);
                symbol = symbol.wrapping_add(1);
            }
            let busy = engine.state(caster).is_some_and(|s| !s.is_idle());
            if busy && rng.gen_bool(args.hit_chance) {
                let _ = engine.interrupt(caster);
            }
        }

        let report = engine.tick(tick);
        started += report.started;
        refused += report.refused;
        fizzles += report.fizzled;
        engine.stats_mut().regenerate_all(args.regen, args.regen);
    }

    let log = engine.sink();
    let summary = Summary {
        casters: args.casters,
        ticks: args.ticks,
        seed: args.seed,
        techniques,
        resolved: log.count(SignalKind::TechniqueResolved),
        failed: log.count(SignalKind::CastFailed),
        effects: log.count(SignalKind::EffectExecuted),
        state_changes: log.count(SignalKind::CastStateChanged),
        started,
        refused,
        fizzles,
        elapsed_ms: timer.elapsed().as_millis(),
    };

    if args.format == "json" {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        println!("=== CAST SIM: {} casters x {} ticks (seed {}) ===", summary.casters, summary.ticks, summary.seed);
        println!("Techniques registered: {}", summary.techniques);
        println!("Resolved:      {}", summary.resolved);
        println!("Started:       {}", summary.started);
        println!("Refused:       {} ({} reported)", summary.refused, summary.failed);
        println!("Effects:       {}", summary.effects);
        println!("State changes: {}", summary.state_changes);
        println!("Fizzle ticks:  {}", summary.fizzles);
        println!("Wall time:     {} ms", summary.elapsed_ms);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_probability_bounds() {
        assert_eq!(probability("0"), Ok(0.0));
        assert_eq!(probability("1.0"), Ok(1.0));
        assert!(probability("1.5").is_err());
        assert!(probability("-0.1").is_err());
        assert!(probability("NaN").is_err());
        assert!(probability("often").is_err());
    }

    #[test]
    fn test_out_of_range_chance_rejected_by_cli() {
        assert!(Args::try_parse_from(["cast_sim", "--press-chance", "2"]).is_err());
        assert!(Args::try_parse_from(["cast_sim", "--hit-chance", "-1"]).is_err());

        let args = Args::try_parse_from(["cast_sim", "--press-chance", "0.5"]).unwrap();
        assert_eq!(args.press_chance, 0.5);
        assert_eq!(args.hit_chance, 0.01);
    }
}
