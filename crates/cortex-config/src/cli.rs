//! Command-line argument parsing.

use std::path::PathBuf;

use clap::Parser;

use crate::Config;

/// Assigns categorical traits (morphology, electrophysiology, synapse class)
/// to cell positions from a spatial recipe.
///
/// CLI values override settings loaded from `config.ron`.
#[derive(Parser, Debug, Default)]
#[command(name = "cortex", about = "Spatial trait assignment for cell populations")]
pub struct CliArgs {
    /// Run seed.
    #[arg(long)]
    pub seed: Option<u64>,

    /// Worker threads (0 = one per CPU).
    #[arg(long)]
    pub threads: Option<usize>,

    /// Recipe file (RON).
    #[arg(long)]
    pub recipe: Option<PathBuf>,

    /// Attribute to assign (e.g. mtype, etype, sClass).
    #[arg(long)]
    pub attribute: Option<String>,

    /// Cell positions file: a RON list of (x, y, z) tuples.
    #[arg(long)]
    pub positions: Option<PathBuf>,

    /// Output file for the assigned values (stdout if omitted).
    #[arg(long)]
    pub output: Option<PathBuf>,

    /// Assign synapse classes by a weighted coin flip instead of from the recipe.
    #[arg(long)]
    pub random_synapse_class: bool,

    /// Fraction of inhibitory cells for random synapse class assignment.
    #[arg(long)]
    pub inhibitory_proportion: Option<f64>,

    /// Log level (error, warn, info, debug, trace).
    #[arg(long)]
    pub log_level: Option<String>,

    /// Path to config directory (overrides default location).
    #[arg(long)]
    pub config: Option<PathBuf>,
}

impl Config {
    /// Apply CLI overrides to a loaded config.
    pub fn apply_cli_overrides(&mut self, args: &CliArgs) {
        if let Some(seed) = args.seed {
            self.sampling.seed = seed;
        }
        if let Some(threads) = args.threads {
            self.sampling.threads = threads;
        }
        if let Some(ref path) = args.recipe {
            self.recipe.path = path.clone();
        }
        if let Some(ref attribute) = args.attribute {
            self.recipe.attribute = attribute.clone();
        }
        if let Some(p) = args.inhibitory_proportion {
            self.synapse.inhibitory_proportion = p;
        }
        if let Some(ref level) = args.log_level {
            self.debug.log_level = level.clone();
        }
    }
}
