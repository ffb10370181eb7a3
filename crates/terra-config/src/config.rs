//! Configuration structs with generator defaults and RON persistence.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// File name inside the config directory.
pub const CONFIG_FILE_NAME: &str = "config.ron";

/// Top-level generator configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Terrain shape and mesh density.
    pub terrain: TerrainConfig,
    /// Height gradient as `(hex color, position)` pairs. Order does not matter.
    pub palette: Vec<(String, f32)>,
    /// Sea shell.
    pub water: WaterConfig,
    /// Cloud shell.
    pub clouds: CloudConfig,
    /// Time slicing for large meshes.
    pub scheduler: ChunkingConfig,
    /// Cloud animation run by the binary.
    pub animation: AnimationConfig,
    /// Debug/development settings.
    pub debug: DebugConfig,
}

/// Terrain noise and mesh settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct TerrainConfig {
    pub seed: u32,
    /// Icosphere subdivision level (0 to 8).
    pub subdivisions: u32,
    pub amplitude: f64,
    pub frequency: f64,
    pub octaves: u32,
    pub persistence: f64,
    pub lacunarity: f64,
    pub base_radius: f32,
}

/// Water shell settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct WaterConfig {
    pub enabled: bool,
    /// Hex color, e.g. `"#3b4cc0"`.
    pub color: String,
    /// 0 puts the sea at radius 1, 1 at radius 2.
    pub level: f32,
}

/// Cloud shell settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct CloudConfig {
    pub enabled: bool,
    pub color: String,
    /// 0 puts clouds at radius 2, 1 at radius 3.
    pub level: f32,
    /// Noise offset per second of animation.
    pub speed: f64,
    /// Normalized noise below this is clear sky.
    pub threshold: f64,
    pub opacity: f32,
}

/// Chunked execution policy.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ChunkingConfig {
    /// Vertex counts below this run in one pass.
    pub sync_threshold: usize,
    /// Milliseconds of work per slice before yielding.
    pub slice_budget_ms: u64,
}

/// Headless cloud animation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AnimationConfig {
    /// Frames of cloud animation to run after generation.
    pub frames: u32,
    /// Frames per second. Must be positive.
    pub frame_rate: u32,
}

/// Debug/development configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DebugConfig {
    /// Log level override (e.g., "debug", "info", "warn").
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            terrain: TerrainConfig::default(),
            palette: vec![
                ("#ffffff".to_string(), 1.0),
                ("#8b6914".to_string(), 0.8),
                ("#32cd32".to_string(), 0.6),
                ("#8b6914".to_string(), 0.3),
            ],
            water: WaterConfig::default(),
            clouds: CloudConfig::default(),
            scheduler: ChunkingConfig::default(),
            animation: AnimationConfig::default(),
            debug: DebugConfig::default(),
        }
    }
}

impl Default for TerrainConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            subdivisions: 6,
            amplitude: 0.15,
            frequency: 2.0,
            octaves: 4,
            persistence: 0.55,
            lacunarity: 2.0,
            base_radius: 1.5,
        }
    }
}

impl Default for WaterConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            color: "#3b4cc0".to_string(),
            level: 0.5,
        }
    }
}

impl Default for CloudConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            color: "#ffffff".to_string(),
            level: 0.5,
            speed: 0.0001,
            threshold: 0.3,
            opacity: 0.8,
        }
    }
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            sync_threshold: 50_000,
            slice_budget_ms: 16,
        }
    }
}

impl Default for AnimationConfig {
    fn default() -> Self {
        Self {
            frames: 120,
            frame_rate: 60,
        }
    }
}

impl Default for DebugConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}

// --- Load / Save / Reload ---

impl Config {
    /// Path of the config file inside `config_dir`.
    pub fn path_in(config_dir: &Path) -> PathBuf {
        config_dir.join(CONFIG_FILE_NAME)
    }

    /// Load config from the given directory, or create a default config file.
    pub fn load_or_create(config_dir: &Path) -> Result<Self, ConfigError> {
        let config_path = Self::path_in(config_dir);

        if config_path.exists() {
            let config = Self::read(&config_path)?;
            log::info!("Loaded config from {}", config_path.display());
            Ok(config)
        } else {
            let config = Config::default();
            config.save(config_dir)?;
            log::info!("Created default config at {}", config_path.display());
            Ok(config)
        }
    }

    fn read(config_path: &Path) -> Result<Self, ConfigError> {
        let contents =
            std::fs::read_to_string(config_path).map_err(|source| ConfigError::ReadError {
                path: config_path.to_path_buf(),
                source,
            })?;
        let config: Config = ron::from_str(&contents).map_err(ConfigError::ParseError)?;
        config.validate()?;
        Ok(config)
    }

    /// Save config to the given directory as `config.ron`.
    pub fn save(&self, config_dir: &Path) -> Result<(), ConfigError> {
        let write_error = |source| ConfigError::WriteError {
            path: config_dir.to_path_buf(),
            source,
        };
        std::fs::create_dir_all(config_dir).map_err(write_error)?;

        let config_path = Self::path_in(config_dir);
        let pretty = ron::ser::PrettyConfig::new()
            .depth_limit(3)
            .separate_tuple_members(false)
            .enumerate_arrays(false);

        let serialized =
            ron::ser::to_string_pretty(self, pretty).map_err(ConfigError::SerializeError)?;

        std::fs::write(&config_path, serialized).map_err(write_error)?;
        Ok(())
    }

    /// Re-read the file: `Some(new_config)` if it differs from `self`, `None`
    /// otherwise.
    pub fn reload(&self, config_dir: &Path) -> Result<Option<Self>, ConfigError> {
        let new_config = Self::read(&Self::path_in(config_dir))?;

        if &new_config != self {
            log::info!("Config reloaded with changes");
            Ok(Some(new_config))
        } else {
            Ok(None)
        }
    }

    /// Reject values the generator cannot run with.
    ///
    /// Out-of-range overlay levels and malformed colors are not errors; they
    /// are clamped or substituted downstream.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.animation.frame_rate == 0 {
            return Err(ConfigError::InvalidValue {
                field: "animation.frame_rate",
                reason: "must be positive".to_string(),
            });
        }
        if !(0.0..1.0).contains(&self.clouds.threshold) {
            return Err(ConfigError::InvalidValue {
                field: "clouds.threshold",
                reason: format!("{} is outside [0, 1)", self.clouds.threshold),
            });
        }
        if !self.terrain.base_radius.is_finite() || self.terrain.base_radius <= 0.0 {
            return Err(ConfigError::InvalidValue {
                field: "terrain.base_radius",
                reason: format!("{} is not a positive radius", self.terrain.base_radius),
            });
        }
        Ok(())
    }
}
