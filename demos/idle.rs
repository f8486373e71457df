// demos/idle.rs
// Run with:
//   RUST_LOG=debug cargo run --example idle

use idle_accrual::config::EngineConfig;
use idle_accrual::genres::idle::IdleSession;
use idle_accrual::store::FileStore;
use idle_accrual::systems::offline_simulation::ProductionLine;
use idle_accrual::systems::sdk::{Clock, ManualClock, SystemClock};

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let dir = std::env::temp_dir().join("idle_accrual_demo");
    let store = match FileStore::open(&dir) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("cannot open save dir: {e}");
            return;
        }
    };

    // Start from wall-clock time, then drive it by hand.
    let clock = ManualClock::at(SystemClock.now_ms());
    let mut session = IdleSession::open(store, clock.clone(), EngineConfig::default());

    // Four mining lanes; rock HP grows ×2.15 per break, gold follows HP.
    let mut lanes: Vec<ProductionLine> = (1..=4)
        .map(|lvl| {
            ProductionLine::new(2.0 * 1.9f64.powi(lvl - 1), 7.2, 60.0).with_growth(2.15, 2.15)
        })
        .collect();

    // Two minutes of active play: a rock every 3 s, a tick every second.
    for sec in 0..120 {
        clock.advance(1_000);
        if sec % 3 == 0 {
            let g = session.on_event();
            if g.awarded > 0.0 {
                println!("t={sec:>3}s  raw {:>10.4}  awarded {:>6}", g.raw, g.awarded);
            }
        }
        if let Some(w) = session.tick() {
            println!(
                "window: {:.1}/min, difficulty {:.3} -> {:.3}",
                w.observed_per_min, w.difficulty_before, w.difficulty_after
            );
        }
    }

    // Background for three hours.
    session.suspend();
    clock.advance(3 * 3_600 * 1_000);
    let parked = session.resume(&mut lanes);
    println!("offline catch-up parked: {parked}");
    println!("collected: {}", session.collect_offline());

    match serde_json::to_string_pretty(&session.snapshot()) {
        Ok(s) => println!("{s}"),
        Err(e) => eprintln!("snapshot: {e}"),
    }
}
