//! Command-line overrides for the `terra` binary.

use std::path::PathBuf;

use clap::Parser;

use crate::Config;

/// Generate a procedural planet surface.
///
/// CLI values override settings loaded from `config.ron`.
#[derive(Parser, Debug, Default)]
#[command(name = "terra", about = "Procedural planet surface generator")]
pub struct CliArgs {
    /// Terrain noise seed.
    #[arg(long)]
    pub seed: Option<u32>,

    /// Icosphere subdivision level (0 to 8).
    #[arg(long)]
    pub subdivisions: Option<u32>,

    /// Amplitude of the first noise octave.
    #[arg(long)]
    pub amplitude: Option<f64>,

    /// Frequency of the first noise octave.
    #[arg(long)]
    pub frequency: Option<f64>,

    /// Number of noise octaves.
    #[arg(long)]
    pub octaves: Option<u32>,

    /// Enable or disable the water shell.
    #[arg(long)]
    pub water: Option<bool>,

    /// Enable or disable the cloud shell.
    #[arg(long)]
    pub clouds: Option<bool>,

    /// Frames of cloud animation to run.
    #[arg(long)]
    pub frames: Option<u32>,

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
            self.terrain.seed = seed;
        }
        if let Some(level) = args.subdivisions {
            self.terrain.subdivisions = level;
        }
        if let Some(amplitude) = args.amplitude {
            self.terrain.amplitude = amplitude;
        }
        if let Some(frequency) = args.frequency {
            self.terrain.frequency = frequency;
        }
        if let Some(octaves) = args.octaves {
            self.terrain.octaves = octaves;
        }
        if let Some(water) = args.water {
            self.water.enabled = water;
        }
        if let Some(clouds) = args.clouds {
            self.clouds.enabled = clouds;
        }
        if let Some(frames) = args.frames {
            self.animation.frames = frames;
        }
        if let Some(ref level) = args.log_level {
            self.debug.log_level = level.clone();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_override() {
        let mut config = Config::default();
        let args = CliArgs {
            seed: Some(7),
            octaves: Some(6),
            clouds: Some(true),
            ..Default::default()
        };
        config.apply_cli_overrides(&args);
        assert_eq!(config.terrain.seed, 7);
        assert_eq!(config.terrain.octaves, 6);
        assert!(config.clouds.enabled);
        // Non-overridden fields retain defaults
        assert_eq!(config.terrain.amplitude, 0.15);
        assert!(config.water.enabled);
    }

    #[test]
    fn test_cli_no_override() {
        let original = Config::default();
        let mut config = Config::default();
        config.apply_cli_overrides(&CliArgs::default());
        assert_eq!(config, original);
    }

    #[test]
    fn test_parse_flags() {
        let args = CliArgs::try_parse_from([
            "terra",
            "--seed",
            "99",
            "--subdivisions",
            "3",
            "--water",
            "false",
            "--log-level",
            "debug",
        ])
        .unwrap();
        assert_eq!(args.seed, Some(99));
        assert_eq!(args.subdivisions, Some(3));
        assert_eq!(args.water, Some(false));
        assert_eq!(args.log_level.as_deref(), Some("debug"));
        assert!(args.config.is_none());
    }
}
