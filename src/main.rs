use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use env_logger::Env;
use log::info;

use intersection_sim::simulation::{LightPolicy, Simulation, SimulationConfig, StatisticsCollector};

#[derive(Parser)]
#[command(name = "intersection_sim")]
#[command(about = "Four-way intersection traffic simulation")]
struct Cli {
    /// JSON configuration file; missing fields use their defaults
    #[arg(long)]
    config: Option<PathBuf>,

    /// Number of ticks to run, overrides the configuration
    #[arg(long)]
    ticks: Option<u64>,

    /// Seed for every random draw, overrides the configuration
    #[arg(long)]
    seed: Option<u64>,

    /// Use fixed green durations instead of the demand-adaptive lights
    #[arg(long)]
    simple_lights: bool,

    /// Print the summary as JSON on stdout
    #[arg(long)]
    json: bool,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("warn,intersection_sim=info"))
        .init();

    let cli = Cli::parse();
    let config = load_config(&cli)?;

    let simulation = Simulation::new(config)?;
    info!("Running headless with seed {}", simulation.seed());

    let stats = simulation.run(StatisticsCollector::new())?;
    let summary = stats
        .summary()
        .context("Simulation ended without a summary")?;
    summary.log();

    if cli.json {
        println!("{}", serde_json::to_string_pretty(summary)?);
    }
    Ok(())
}

/// Configuration file (or defaults) with the command-line overrides applied
fn load_config(cli: &Cli) -> Result<SimulationConfig> {
    let mut config = match &cli.config {
        Some(path) => SimulationConfig::from_file(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => SimulationConfig::default(),
    };

    if let Some(ticks) = cli.ticks {
        config.world.ticks = ticks;
    }
    if let Some(seed) = cli.seed {
        config.world.seed = Some(seed);
    }
    if cli.simple_lights {
        config.world.light_policy = LightPolicy::FixedTimer;
    }

    config.validate()?;
    Ok(config)
}
