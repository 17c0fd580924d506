//! `fabric run` — build the switch from config and drive the simulation.

use std::path::Path;

use anyhow::Context;
use tracing::info;

use fabric_core::{Cycle, FabricConfig};
use fabric_switch::{RandomSource, Simulation, Switch};

pub fn run(
    config_path: Option<&Path>,
    cycles: Option<Cycle>,
    seed: Option<u64>,
    format: &str,
) -> anyhow::Result<()> {
    let config = load_config(config_path, cycles, seed)?;
    info!(
        seed = ?config.simulation.seed,
        cycles = config.simulation.cycles,
        "{}",
        describe_config(&config)
    );

    let switch = Switch::from_config(&config).context("building switch")?;
    let source = RandomSource::from_config(&config.requests, config.simulation.seed)?;
    let mut simulation = Simulation::new(switch, source);
    let report = simulation.run(config.simulation.cycles)?;

    match format {
        "json" => {
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        _ => {
            println!("{}", describe_config(&config));
            print!("{}", report.format_text());
        }
    }

    Ok(())
}

/// Load the config (or defaults), apply CLI overrides, and validate.
fn load_config(
    path: Option<&Path>,
    cycles: Option<Cycle>,
    seed: Option<u64>,
) -> anyhow::Result<FabricConfig> {
    let mut config = match path {
        Some(path) => FabricConfig::from_file(path)
            .with_context(|| format!("loading {}", path.display()))?,
        None => FabricConfig::default(),
    };

    if let Some(cycles) = cycles {
        config.simulation.cycles = cycles;
    }
    if seed.is_some() {
        config.simulation.seed = seed;
    }

    config.validate()?;
    Ok(config)
}

fn describe_config(config: &FabricConfig) -> String {
    format!(
        "Switch config: P={} S={} workers(P/S)={}/{} cooldown={} durations=[{},{}] cycles={}",
        config.primary.balancers,
        config.secondary.balancers,
        config.primary.workers_per_balancer,
        config.secondary.workers_per_balancer,
        config.scaling.cooldown_cycles,
        config.requests.min_duration,
        config.requests.max_duration,
        config.simulation.cycles,
    )
}
