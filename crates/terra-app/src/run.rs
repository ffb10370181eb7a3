//! One generation run, from config to disposed planet.

use terra_config::Config;
use terra_planet::{DisplaceReport, IcosphereProvider, Planet, PlanetStats};
use terra_sched::YieldPoint;
use tracing::{info, instrument};

use crate::error::AppError;
use crate::settings;

/// What a run produced, captured before the planet is disposed.
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub displacement: DisplaceReport,
    pub stats: Option<PlanetStats>,
    pub water: bool,
    pub clouds: bool,
    /// Cloud animation frames rendered.
    pub frames: u32,
}

/// Build the planet described by `config`, animate its clouds, and dispose
/// it. Long passes and every animation frame yield through `host`.
#[instrument(
    skip_all,
    fields(seed = config.terrain.seed, subdivisions = config.terrain.subdivisions)
)]
pub fn generate<Y: YieldPoint>(config: &Config, host: &mut Y) -> Result<RunSummary, AppError> {
    let terrain = settings::terrain_settings(&config.terrain);
    let mut planet = Planet::with_provider(
        IcosphereProvider,
        settings::scheduler_config(&config.scheduler),
    );

    let handle = planet.create_geometry(config.terrain.subdivisions)?;
    planet.set_palette(&settings::palette(config));
    let displacement = pollster::block_on(planet.displace(handle, &terrain, host))?;

    let water = planet
        .build_or_update_water(&settings::water_settings(&config.water))?
        .is_some();
    let clouds =
        planet.build_or_update_clouds(&settings::cloud_settings(&config.clouds), &terrain)?;

    let mut frames = 0;
    if let Some(clouds) = clouds {
        let frame_rate = f64::from(config.animation.frame_rate.max(1));
        for frame in 1..=config.animation.frames {
            pollster::block_on(host.next_frame());
            planet.animate_clouds(clouds, f64::from(frame) / frame_rate)?;
            frames = frame;
        }
        info!(frames, "cloud animation finished");
    }

    let stats = planet.stats();
    if let Some(stats) = stats {
        info!(
            vertices = stats.vertex_count,
            min_radius = stats.min_radius,
            max_radius = stats.max_radius,
            "planet generated"
        );
    }
    planet.dispose();

    Ok(RunSummary {
        displacement,
        stats,
        water,
        clouds: clouds.is_some(),
        frames,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use terra_planet::RecolorOutcome;
    use terra_sched::YieldNow;

    fn small_config() -> Config {
        let mut config = Config::default();
        config.terrain.subdivisions = 3;
        config.animation.frames = 4;
        config
    }

    #[test]
    fn test_generate_default_planet() {
        let summary = generate(&small_config(), &mut YieldNow).unwrap();

        let stats = summary.stats.unwrap();
        assert_eq!(stats.vertex_count, 642);
        assert!(stats.min_radius < stats.max_radius);
        assert!(matches!(summary.displacement.recolor, RecolorOutcome::Applied { .. }));
        assert!(summary.water);
        assert!(!summary.clouds);
        assert_eq!(summary.frames, 0);
    }

    #[test]
    fn test_generate_animates_clouds() {
        let mut config = small_config();
        config.clouds.enabled = true;
        config.water.enabled = false;

        let summary = generate(&config, &mut YieldNow).unwrap();

        assert!(summary.clouds);
        assert!(!summary.water);
        assert_eq!(summary.frames, 4);
    }

    #[test]
    fn test_generate_with_pacer() {
        let mut config = small_config();
        config.clouds.enabled = true;
        config.animation.frame_rate = 500;
        let mut pacer = crate::FramePacer::new(config.animation.frame_rate);

        let summary = generate(&config, &mut pacer).unwrap();

        assert_eq!(summary.frames, 4);
        assert_eq!(pacer.frames(), 4);
    }
}
