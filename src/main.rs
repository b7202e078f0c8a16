//! Seal Weave - interactive console
//!
//! Drives a single caster by hand: press concepts, advance ticks, interrupt,
//! and watch the signals the engine emits.

use seal_weave::casting::{CasterVitals, ResourcePool, SignalLog, VitalsLedger};
use seal_weave::core::error::Result;
use seal_weave::core::types::{KnowledgeState, SymbolId};
use seal_weave::techniques::{parse_catalog, DEFAULT_CATALOG};
use seal_weave::{CasterId, ConceptId, EngineConfig, TechniqueEngine};

use std::io::{self, Write};
use std::time::Duration;

const TICK: Duration = Duration::from_millis(100);

type ConsoleEngine = TechniqueEngine<VitalsLedger, SignalLog>;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("seal_weave=info")),
        )
        .init();

    tracing::info!("Seal Weave console starting...");

    let mut engine = TechniqueEngine::new(EngineConfig::default(), VitalsLedger::new(), SignalLog::new())?;
    engine.register_catalog(parse_catalog(DEFAULT_CATALOG)?)?;

    let caster = engine.spawn_caster();
    engine.stats_mut().insert(
        caster,
        CasterVitals::new(ResourcePool::full(50.0), ResourcePool::full(100.0)),
    );

    println!("\n=== SEAL WEAVE ===");
    println!("Commands:");
    println!("  <concept>       - Press a symbol bound to that concept (e.g. Bloom)");
    println!("  tick / t        - Advance one tick ({} ms)", TICK.as_millis());
    println!("  run <n>         - Advance n ticks");
    println!("  interrupt / i   - Strike the caster");
    println!("  rest <n>        - Regenerate n chakra and stability");
    println!("  list / l        - List known techniques");
    println!("  quit / q        - Exit");
    println!();

    let mut next_symbol = 0u32;

    loop {
        display_status(&engine, caster);

        print!("> ");
        io::stdout().flush()?;

        let mut input = String::new();
        if io::stdin().read_line(&mut input)? == 0 {
            break;
        }
        let input = input.trim();

        match input {
            "" => continue,
            "quit" | "q" => break,
            "tick" | "t" => advance(&mut engine, 1),
            "interrupt" | "i" => {
                if !engine.interrupt(caster).unwrap_or(false) {
                    println!("Nothing to interrupt.");
                }
            }
            "list" | "l" => {
                let mut techniques: Vec<_> = engine.catalog().iter().collect();
                techniques.sort_by(|a, b| a.id.cmp(&b.id));
                for t in techniques {
                    let sequence: Vec<&str> = t.sequence.iter().map(|c| c.as_str()).collect();
                    println!(
                        "  {:<12} {:<32} chakra {:>5.1}  stability {:>5.1}",
                        t.id.as_str(),
                        sequence.join(" > "),
                        t.chakra_cost,
                        t.stability_cost
                    );
                }
            }
            _ => {
                if let Some(n) = input.strip_prefix("run ") {
                    match n.trim().parse::<u32>() {
                        Ok(n) => advance(&mut engine, n),
                        Err(_) => println!("Usage: run <number>"),
                    }
                } else if let Some(n) = input.strip_prefix("rest ") {
                    match n.trim().parse::<f32>() {
                        Ok(amount) => engine.stats_mut().regenerate_all(amount, amount),
                        Err(_) => println!("Usage: rest <amount>"),
                    }
                } else {
                    let now = engine.now();
                    engine
                        .push_symbol(
                            caster,
                            SymbolId(next_symbol),
                            ConceptId::new(input),
                            now,
                            KnowledgeState::Known,
                        )
                        .ok();
                    next_symbol += 1;
                }
            }
        }

        for signal in engine.sink_mut().drain() {
            println!("  -> {:?}", signal);
        }
    }

    Ok(())
}

fn advance(engine: &mut ConsoleEngine, ticks: u32) {
    for _ in 0..ticks {
        engine.tick(TICK);
    }
}

fn display_status(engine: &ConsoleEngine, caster: CasterId) {
    use seal_weave::CasterStats;

    let Some(ctx) = engine.context(caster) else {
        return;
    };
    let vitals = engine.stats().vitals(caster);
    let pending: Vec<String> = engine
        .buffer(caster)
        .map(|b| {
            b.unconsumed_within(engine.now(), engine.config().combo_window())
                .iter()
                .map(|e| e.concept.to_string())
                .collect()
        })
        .unwrap_or_default();

    let hint = if engine.has_partial_sequence(caster) {
        " (partial)"
    } else {
        ""
    };

    println!(
        "[{}] {:?}{} | chakra {:.1} stability {:.1} | pending: {}{}",
        engine.now(),
        ctx.state,
        ctx.technique_id()
            .map(|id| format!(" ({})", id))
            .unwrap_or_default(),
        vitals.map(|v| v.chakra.current()).unwrap_or(0.0),
        vitals.map(|v| v.stability.current()).unwrap_or(0.0),
        if pending.is_empty() {
            "-".to_string()
        } else {
            pending.join(" ")
        },
        hint
    );
}
