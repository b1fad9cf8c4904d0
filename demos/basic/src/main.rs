//! basic — smallest example for the BDI social simulation engine.
//!
//! Runs 5 agents with varied personalities through a short simulated
//! afternoon, injects one world event partway through, and writes per-tick
//! metrics to CSV.

use std::path::Path;
use std::time::Instant;

use anyhow::Result;

use bdi_agent::agent::AgentStoreBuilder;
use bdi_agent::intention::IntentionStatus;
use bdi_agent::personality::Personality;
use bdi_core::WorldConfig;
use bdi_llm::fallback::FallbackAdvisor;
use bdi_output::{CsvWriter, WorldOutputObserver};
use bdi_world::{WorldBuilder, WorldObserver};

const AGENT_COUNT: usize = 5;
const SEED: u64 = 42;
const TOTAL_TICKS: u64 = 120;
const WORLD_EVENT_AT_TICK: u64 = 40;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    println!("=== basic — BDI social simulation ===");
    println!("Agents: {AGENT_COUNT}  |  Ticks: {TOTAL_TICKS}  |  Seed: {SEED}");
    println!();

    let agents = AgentStoreBuilder::new(SEED)
        .agent_with_personality("Ada", Personality::new(0.7, 0.6, 0.8, 0.7, 0.3))
        .agent_with_personality("Grace", Personality::new(0.6, 0.8, 0.5, 0.8, 0.2))
        .agent_with_personality("Ivan", Personality::new(0.3, 0.5, 0.2, 0.4, 0.7))
        .agent_with_personality("Nora", Personality::new(0.4, 0.4, 0.3, 0.3, 0.8))
        .agent_with_personality("Otto", Personality::new(0.5, 0.5, 0.5, 0.5, 0.5))
        .build();

    let config = WorldConfig {
        start_unix_secs: 1_700_000_000,
        base_tick_seconds: 5.0,
        time_speed: 1.0,
        total_ticks: Some(TOTAL_TICKS),
        seed: SEED,
        ..WorldConfig::default()
    };

    let mut world = WorldBuilder::new(config.clone(), agents)
        .advisor(Box::new(FallbackAdvisor))
        .build();

    std::fs::create_dir_all("output/basic")?;
    let writer = CsvWriter::new(Path::new("output/basic"))?;
    let mut obs = WorldOutputObserver::new(writer, &config);

    let t0 = Instant::now();
    let mut total_force_quits = 0u64;
    for tick in 0..TOTAL_TICKS {
        if tick == WORLD_EVENT_AT_TICK {
            world.inject_event("a fire alarm sounds across the building", Vec::new());
            tracing::info!(tick, "injected world event: fire alarm");
        }

        obs.on_tick_start(world.current_tick());
        let diagnostics = world.process_game_tick();
        obs.on_tick_end(world.current_tick(), &diagnostics);
        obs.on_snapshot(world.current_tick(), &world.agents);
        total_force_quits += diagnostics.force_quits as u64;
    }
    obs.on_run_end(world.current_tick());
    let elapsed = t0.elapsed();

    if let Some(e) = obs.take_error() {
        tracing::error!(error = %e, "output writer failed");
        eprintln!("output error: {e}");
    }

    println!();
    println!("Simulation complete in {:.3} s", elapsed.as_secs_f64());
    println!("  forced conversation endings: {total_force_quits}");
    println!("  agent_metrics.csv / tick_summaries.csv written to output/basic/");
    println!();

    println!(
        "{:<8} {:<6} {:<10} {:<10} {:<10}",
        "Agent", "Active", "Desires", "Battery", "Happiness"
    );
    println!("{}", "-".repeat(46));
    for agent in &world.agents {
        let active = agent
            .intentions
            .iter()
            .filter(|i| i.status == IntentionStatus::Active)
            .count();
        println!(
            "{:<8} {:<6} {:<10} {:<10.2} {:<10.2}",
            agent.name,
            active,
            agent.desires.len(),
            agent.social_battery,
            agent.emotion.happiness,
        );
    }

    Ok(())
}
