//! Conversions from on-disk config sections to generator settings.
//!
//! Malformed colors never fail a run: they are replaced with the fallback
//! color and a warning is logged.

use std::time::Duration;

use terra_config::{ChunkingConfig, CloudConfig, Config, TerrainConfig, WaterConfig};
use terra_planet::{CloudSettings, ColorStop, Rgb, TerrainSettings, WaterSettings};
use terra_sched::SchedulerConfig;

pub fn terrain_settings(config: &TerrainConfig) -> TerrainSettings {
    TerrainSettings {
        seed: config.seed,
        amplitude: config.amplitude,
        frequency: config.frequency,
        octaves: config.octaves,
        persistence: config.persistence,
        lacunarity: config.lacunarity,
        base_radius: config.base_radius,
    }
}

/// Palette stops in file order; the gradient sorts them.
pub fn palette(config: &Config) -> Vec<ColorStop> {
    config
        .palette
        .iter()
        .map(|(hex, position)| ColorStop::from_hex(hex, *position))
        .collect()
}

pub fn water_settings(config: &WaterConfig) -> WaterSettings {
    WaterSettings {
        enabled: config.enabled,
        color: Rgb::parse_or_default(&config.color),
        level: config.level,
    }
}

pub fn cloud_settings(config: &CloudConfig) -> CloudSettings {
    CloudSettings {
        enabled: config.enabled,
        color: Rgb::parse_or_default(&config.color),
        level: config.level,
        speed: config.speed,
        threshold: config.threshold,
        opacity: config.opacity,
    }
}

pub fn scheduler_config(config: &ChunkingConfig) -> SchedulerConfig {
    SchedulerConfig {
        sync_threshold: config.sync_threshold,
        slice_budget: Duration::from_millis(config.slice_budget_ms),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use terra_planet::default_palette;

    #[test]
    fn test_defaults_line_up() {
        let config = Config::default();
        assert_eq!(terrain_settings(&config.terrain), TerrainSettings::default());
        assert_eq!(water_settings(&config.water), WaterSettings::default());
        assert_eq!(cloud_settings(&config.clouds), CloudSettings::default());
        assert_eq!(scheduler_config(&config.scheduler), SchedulerConfig::default());
        assert_eq!(palette(&config), default_palette());
    }

    #[test]
    fn test_malformed_colors_fall_back() {
        let mut config = Config::default();
        config.water.color = "ocean".to_string();
        config.palette = vec![("#12".to_string(), 0.5)];

        assert_eq!(water_settings(&config.water).color, Rgb::FALLBACK);
        let stops = palette(&config);
        assert_eq!(stops, vec![ColorStop::new(Rgb::FALLBACK, 0.5)]);
    }

    #[test]
    fn test_slice_budget_in_milliseconds() {
        let chunking = ChunkingConfig {
            sync_threshold: 10,
            slice_budget_ms: 4,
        };
        let config = scheduler_config(&chunking);
        assert_eq!(config.slice_budget, Duration::from_millis(4));
        assert_eq!(config.sync_threshold, 10);
    }
}
