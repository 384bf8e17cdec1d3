#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that runs a tilewalk level headless.

mod input;
mod logging;
mod report;

use std::{fs, path::Path, path::PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use tilewalk_simulation::{Outcome, PlayerInput, Simulation, SimulationConfig};
use tilewalk_world::{LevelDefinition, World};

/// Runs a tilewalk level without rendering and reports where every agent ended up.
#[derive(Debug, Parser)]
#[command(name = "tilewalk", author, version, about, long_about = None)]
struct Args {
    /// Level definition in JSON.
    #[arg(short, long)]
    level: PathBuf,
    /// Simulation configuration in TOML; defaults apply to missing fields.
    #[arg(short, long)]
    config: Option<PathBuf>,
    /// Number of ticks to simulate.
    #[arg(short, long, default_value_t = 600)]
    ticks: u64,
    /// Keys held by the player on every tick, e.g. `wd` for up and right.
    #[arg(long, value_parser = input::parse_hold)]
    hold: Option<PlayerInput>,
    /// Overrides the configured seed.
    #[arg(long)]
    seed: Option<u64>,
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

/// Entry point for the tilewalk command-line interface.
fn main() -> Result<()> {
    let args = Args::parse();
    logging::init(args.verbose);

    let level: LevelDefinition = serde_json::from_str(&read(&args.level)?)
        .with_context(|| format!("failed to parse level json {}", args.level.display()))?;
    let mut config: SimulationConfig = match &args.config {
        Some(path) => toml::from_str(&read(path)?)
            .with_context(|| format!("failed to parse config toml {}", path.display()))?,
        None => SimulationConfig::default(),
    };
    if let Some(seed) = args.seed {
        config.seed = seed;
    }

    let world = World::from_definition(&level)
        .with_context(|| format!("invalid level {}", args.level.display()))?;
    let mut simulation = Simulation::new(world, config).context("invalid simulation config")?;

    let input = args.hold.unwrap_or(PlayerInput::IDLE);
    let mut events = Vec::new();
    while simulation.ticks() < args.ticks {
        events.clear();
        simulation.tick(input, &mut events);
        if simulation.outcome() != Outcome::Ongoing {
            log::info!("match decided after {} ticks", simulation.ticks());
            break;
        }
    }

    print!(
        "{}",
        report::render(
            &simulation.agent_view(),
            simulation.outcome(),
            simulation.ticks()
        )
    );
    Ok(())
}

fn read(path: &Path) -> Result<String> {
    fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))
}
