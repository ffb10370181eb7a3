//! Configuration for the terra planet generator.
//!
//! Settings persist to disk as `config.ron`, accept command-line overrides via
//! clap, and tolerate missing or unknown fields so older and newer files both
//! load.

mod cli;
mod config;
mod error;

pub use cli::CliArgs;
pub use config::{
    AnimationConfig, CONFIG_FILE_NAME, ChunkingConfig, CloudConfig, Config, DebugConfig,
    TerrainConfig, WaterConfig,
};
pub use error::ConfigError;
