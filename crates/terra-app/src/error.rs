//! Errors that end a `terra` run.

use terra_config::ConfigError;
use terra_planet::PlanetError;

use crate::platform::PlatformError;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error(transparent)]
    Platform(#[from] PlatformError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("planet generation failed: {0}")]
    Planet(#[from] PlanetError),
}
