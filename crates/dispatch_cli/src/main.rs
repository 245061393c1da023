use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use dispatch_core::{DispatchConfig, Dispatcher, RequirementTable, StrategyKind};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing_subscriber::prelude::*;

mod compare;
mod scenario_file;

#[derive(Parser)]
#[command(name = "dispatch", about = "Emergency dispatch engine runner")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the cycles of a scenario file and print one JSON line per cycle.
    Run {
        /// Path to the scenario JSON file.
        #[arg(long)]
        scenario: PathBuf,
        /// Matching strategy; overrides the config file.
        #[arg(long, env = "DISPATCH_STRATEGY")]
        strategy: Option<StrategyKind>,
        /// Engine configuration JSON (default: built-in defaults).
        #[arg(long)]
        config: Option<PathBuf>,
        /// Requirement table JSON (default: built-in table).
        #[arg(long)]
        requirements: Option<PathBuf>,
    },
    /// Compare greedy and optimal matching over seeded random cycles.
    Compare {
        #[arg(long, default_value_t = 42)]
        seed: u64,
        #[arg(long, default_value_t = 20)]
        runs: u64,
        #[arg(long, default_value_t = 10)]
        emergencies: usize,
        #[arg(long, default_value_t = 20)]
        resources: usize,
    },
}

fn init_tracing() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn load_config(path: Option<&Path>, strategy: Option<StrategyKind>) -> Result<DispatchConfig> {
    let mut config = match path {
        Some(path) => {
            let json = std::fs::read_to_string(path)
                .with_context(|| format!("reading config file: {}", path.display()))?;
            DispatchConfig::from_json_str(&json)
                .with_context(|| format!("parsing config file: {}", path.display()))?
        }
        None => DispatchConfig::default(),
    };
    if let Some(strategy) = strategy {
        config = config.with_strategy(strategy);
    }
    Ok(config)
}

fn load_requirements(path: Option<&Path>) -> Result<RequirementTable> {
    match path {
        Some(path) => RequirementTable::from_file(path)
            .with_context(|| format!("loading requirement table: {}", path.display())),
        None => Ok(RequirementTable::builtin()),
    }
}

fn run(
    scenario_path: &Path,
    strategy: Option<StrategyKind>,
    config_path: Option<&Path>,
    requirements_path: Option<&Path>,
) -> Result<()> {
    let config = load_config(config_path, strategy)?;
    let requirements = load_requirements(requirements_path)?;
    let dispatcher = Dispatcher::new(config, requirements).context("invalid engine configuration")?;
    let scenario = scenario_file::load_scenario(scenario_path)?;

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    for line in scenario_file::run_scenario(&dispatcher, scenario)? {
        let json = serde_json::to_string(&line).context("serializing cycle output")?;
        writeln!(out, "{json}").context("writing cycle output")?;
    }
    Ok(())
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            scenario,
            strategy,
            config,
            requirements,
        } => run(&scenario, strategy, config.as_deref(), requirements.as_deref()),
        Commands::Compare {
            seed,
            runs,
            emergencies,
            resources,
        } => {
            let summaries = compare::run_comparison(&compare::CompareParams {
                seed,
                runs,
                emergencies,
                resources,
            })?;
            compare::print_summary(&summaries);
            Ok(())
        }
    }
}
