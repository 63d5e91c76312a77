//! Configuration for the cortex trait assignment tools.
//!
//! Settings persist to disk as a RON file (`config.ron`) and can be
//! overridden from the command line. Missing sections and fields fall back to
//! defaults, so older config files keep loading.

mod cli;
mod config;
mod error;

pub use cli::CliArgs;
pub use config::{
    CONFIG_FILE_NAME, Config, DebugConfig, RecipeConfig, SamplingConfig, SynapseConfig,
    default_config_dir,
};
pub use error::ConfigError;
