//! The `cortex` binary: assigns one categorical trait per cell position.

mod error;
mod run;

use clap::Parser;
use cortex_config::{CliArgs, Config, default_config_dir};
use tracing::{error, info};

use crate::error::AppError;

fn main() {
    let args = CliArgs::parse();

    // Resolve config directory
    let config_dir = args.config.clone().unwrap_or_else(default_config_dir);

    // Load or create config, then apply CLI overrides
    let mut config = Config::load_or_create(&config_dir).unwrap_or_else(|e| {
        eprintln!("Failed to load config: {e}, using defaults");
        Config::default()
    });
    config.apply_cli_overrides(&args);

    let log_dir = config_dir.join("logs");
    cortex_log::init_logging(Some(&log_dir), cfg!(debug_assertions), Some(&config));

    if let Err(e) = execute(&config, &args) {
        error!("{e}");
        std::process::exit(1);
    }
}

fn execute(config: &Config, args: &CliArgs) -> Result<(), AppError> {
    info!(
        "seed={} threads={} recipe={} attribute={}",
        config.sampling.seed,
        config.sampling.threads,
        config.recipe.path.display(),
        config.recipe.attribute
    );

    let positions_path = args.positions.as_deref().ok_or(AppError::MissingPositions)?;
    let positions = run::load_positions(positions_path)?;

    let values = if args.random_synapse_class {
        run::assign_synapse_classes(config, &positions)?
    } else {
        run::assign_from_recipe(config, &positions)?
    };
    run::write_output(&values, args.output.as_deref())
}
