//! Tileworld simulation binary.
//!
//! # Startup Sequence
//!
//! 1. Parse the command line
//! 2. Initialize structured logging (tracing, to stderr)
//! 3. Load configuration from `tileworld-config.yaml` (defaults if absent)
//! 4. Parse the startup description and build the world
//! 5. Bootstrap the executor and one actor per agent
//! 6. Run for the startup description's total time
//! 7. Print the final points report to stdout

mod error;
mod grid_printer;

use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Duration;

use clap::Parser;
use tileworld_core::{Simulation, SimulationConfig};
use tileworld_world::Scenario;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use crate::error::EngineError;
use crate::grid_printer::GridPrinter;

/// Default configuration file, looked up in the working directory.
const DEFAULT_CONFIG_PATH: &str = "tileworld-config.yaml";

/// Run a Tileworld simulation from a startup description.
#[derive(Debug, Parser)]
#[command(name = "tileworld-engine")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Startup description file
    #[arg(value_name = "SCENARIO", default_value = "system.txt")]
    scenario: PathBuf,

    /// Configuration file (defaults to ./tileworld-config.yaml if present)
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Seed for the agents' decision policies (overrides config and env)
    #[arg(long)]
    seed: Option<u64>,

    /// Do not print the grid after each tick
    #[arg(long)]
    no_render: bool,

    /// Emit logs as JSON lines
    #[arg(long)]
    json_logs: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.json_logs);

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!(error = %err, "tileworld-engine failed");
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

async fn run(cli: Cli) -> Result<(), EngineError> {
    info!(scenario = %cli.scenario.display(), "tileworld-engine starting");

    let config = load_config(&cli)?;
    info!(
        seed = ?config.simulation.seed,
        ops_per_tick = config.executor.ops_per_tick,
        max_pending = config.executor.max_pending,
        action_interval_ms = config.agents.action_interval_ms,
        render = config.render.enabled,
        "configuration loaded"
    );

    let scenario = Scenario::from_file(&cli.scenario)?;
    let world = scenario.build_world()?;
    info!(
        agents = scenario.agents.len(),
        width = scenario.width,
        height = scenario.height,
        obstacles = scenario.obstacles.len(),
        tiles = world.tile_count(),
        holes = scenario.holes.len(),
        operation_time_ms = scenario.operation_time_ms,
        total_time_ms = scenario.total_time_ms,
        "world built"
    );

    let mut simulation = Simulation::bootstrap(
        world,
        Duration::from_millis(scenario.operation_time_ms),
        &config,
    )?;
    if config.render.enabled {
        let printer = GridPrinter::new(std::io::stdout(), config.render.every_n_ticks);
        simulation = simulation.with_observer(Box::new(printer));
    }

    let report = simulation
        .run(Duration::from_millis(scenario.total_time_ms))
        .await?;

    let mut out = std::io::stdout().lock();
    for score in report.scores() {
        if writeln!(out, "{score}").is_err() {
            break;
        }
    }
    Ok(())
}

/// Load configuration: `--config` must exist; the default path is optional.
fn load_config(cli: &Cli) -> Result<SimulationConfig, EngineError> {
    let mut config = match &cli.config {
        Some(path) => SimulationConfig::from_file(path)?,
        None => {
            let default_path = Path::new(DEFAULT_CONFIG_PATH);
            if default_path.exists() {
                SimulationConfig::from_file(default_path)?
            } else {
                info!("config file not found, using defaults");
                let mut config = SimulationConfig::default();
                config.apply_env_overrides()?;
                config
            }
        }
    };
    apply_cli_overrides(&mut config, cli);
    Ok(config)
}

const fn apply_cli_overrides(config: &mut SimulationConfig, cli: &Cli) {
    if let Some(seed) = cli.seed {
        config.simulation.seed = Some(seed);
    }
    if cli.no_render {
        config.render.enabled = false;
    }
}
