//! Water and cloud shells layered over the terrain.
//!
//! Each shell is its own unit sphere, never the displaced terrain mesh. The
//! shell radius is realized through a uniform scale so level changes never
//! touch vertex positions.

use glam::Vec3;
use terra_noise::{FbmParams, Seedable, SimplexNoise, fbm_3d};
use tracing::{debug, warn};

use crate::color::Rgb;
use crate::displacement::TerrainSettings;
use crate::error::PlanetError;
use crate::geometry::{COLOR_ATTRIBUTE, SphereGeometry};

/// Added to the terrain seed so cloud cover is decorrelated from terrain.
pub const CLOUD_SEED_OFFSET: u32 = 1000;

/// Octaves in the cloud mask.
pub const CLOUD_OCTAVES: u32 = 3;

fn clamp_level(level: f32, shell: &str) -> f32 {
    if (0.0..=1.0).contains(&level) {
        return level;
    }
    let clamped = if level.is_nan() { 0.0 } else { level.clamp(0.0, 1.0) };
    warn!(shell, level, clamped, "overlay level outside [0, 1]");
    clamped
}

/// Sea shell parameters.
#[derive(Clone, Debug, PartialEq)]
pub struct WaterSettings {
    pub enabled: bool,
    pub color: Rgb,
    /// Sea level in `[0, 1]`.
    pub level: f32,
}

impl Default for WaterSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            color: Rgb::from_u24(0x3b4cc0),
            level: 0.5,
        }
    }
}

impl WaterSettings {
    /// Shell radius, `1 + level`.
    pub fn radius(&self) -> f32 {
        1.0 + clamp_level(self.level, "water")
    }
}

/// Cloud shell parameters.
#[derive(Clone, Debug, PartialEq)]
pub struct CloudSettings {
    pub enabled: bool,
    /// Material tint; per-vertex brightness comes from the noise mask.
    pub color: Rgb,
    /// Cloud altitude in `[0, 1]`.
    pub level: f32,
    /// Noise-space offset per second of animation time, applied to all axes.
    pub speed: f64,
    /// Normalized noise below this value is fully clear.
    pub threshold: f64,
    /// Overall material opacity.
    pub opacity: f32,
}

impl Default for CloudSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            color: Rgb::WHITE,
            level: 0.5,
            speed: 0.0001,
            threshold: 0.3,
            opacity: 0.8,
        }
    }
}

impl CloudSettings {
    /// Shell radius, `2 + level`.
    pub fn radius(&self) -> f32 {
        2.0 + clamp_level(self.level, "clouds")
    }
}

/// The few material properties the core controls.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ShellMaterial {
    pub color: Rgb,
    pub opacity: f32,
    pub transparent: bool,
    pub vertex_colors: bool,
    pub double_sided: bool,
}

impl ShellMaterial {
    fn water(color: Rgb) -> Self {
        Self {
            color,
            opacity: 1.0,
            transparent: false,
            vertex_colors: false,
            double_sided: true,
        }
    }

    fn clouds(color: Rgb, opacity: f32) -> Self {
        Self {
            color,
            opacity: opacity.clamp(0.0, 1.0),
            transparent: true,
            vertex_colors: true,
            double_sided: true,
        }
    }
}

/// Soft threshold of a noise value already normalized to `[0, 1]`.
pub fn cloud_opacity(normalized: f64, threshold: f64) -> f32 {
    if threshold >= 1.0 {
        return 0.0;
    }
    ((normalized - threshold) / (1.0 - threshold)).clamp(0.0, 1.0) as f32
}

/// Single-color sea sphere.
#[derive(Debug)]
pub struct WaterShell<G> {
    mesh: G,
    material: ShellMaterial,
    scale: f32,
}

impl<G: SphereGeometry> WaterShell<G> {
    pub fn new(mesh: G, settings: &WaterSettings) -> Self {
        let mut shell = Self {
            mesh,
            material: ShellMaterial::water(settings.color),
            scale: 1.0,
        };
        shell.update(settings);
        shell
    }

    /// Rescale and recolor in place.
    pub fn update(&mut self, settings: &WaterSettings) {
        self.scale = settings.radius();
        self.material.color = settings.color;
    }

    pub fn mesh(&self) -> &G {
        &self.mesh
    }

    pub fn material(&self) -> &ShellMaterial {
        &self.material
    }

    /// Uniform scale applied to the unit mesh.
    pub fn scale(&self) -> f32 {
        self.scale
    }
}

/// Translucent sphere with an animated noise mask in its color attribute.
#[derive(Debug)]
pub struct CloudShell<G> {
    mesh: G,
    base_positions: Vec<Vec3>,
    noise: SimplexNoise,
    fbm: FbmParams,
    speed: f64,
    threshold: f64,
    material: ShellMaterial,
    scale: f32,
    time: f64,
}

impl<G: SphereGeometry> CloudShell<G> {
    /// Wrap a fresh unit sphere and paint its mask at time zero.
    pub fn new(
        mesh: G,
        settings: &CloudSettings,
        terrain: &TerrainSettings,
    ) -> Result<Self, PlanetError> {
        let base_positions = mesh.positions().to_vec();
        let mut shell = Self {
            mesh,
            base_positions,
            noise: SimplexNoise::new(cloud_seed(terrain.seed)),
            fbm: cloud_fbm(terrain),
            speed: settings.speed,
            threshold: settings.threshold,
            material: ShellMaterial::clouds(settings.color, settings.opacity),
            scale: settings.radius(),
            time: 0.0,
        };
        shell.animate(0.0)?;
        Ok(shell)
    }

    /// Apply new settings and repaint at time zero. The noise stream is only
    /// rebuilt when the terrain seed changed.
    pub fn update(
        &mut self,
        settings: &CloudSettings,
        terrain: &TerrainSettings,
    ) -> Result<(), PlanetError> {
        let seed = cloud_seed(terrain.seed);
        if self.noise.seed() != seed {
            self.noise = SimplexNoise::new(seed);
        }
        self.fbm = cloud_fbm(terrain);
        self.speed = settings.speed;
        self.threshold = settings.threshold;
        self.material = ShellMaterial::clouds(settings.color, settings.opacity);
        self.scale = settings.radius();
        self.animate(0.0)
    }

    /// Recompute the mask for `time_seconds`. Only the color attribute is
    /// written; positions stay as built.
    pub fn animate(&mut self, time_seconds: f64) -> Result<(), PlanetError> {
        let offset = time_seconds * self.speed;
        let colors = self
            .base_positions
            .iter()
            .map(|p| {
                let raw = fbm_3d(&self.noise, p.as_dvec3(), offset, &self.fbm);
                Rgb::gray(cloud_opacity((raw + 1.0) * 0.5, self.threshold))
            })
            .collect();
        self.mesh.set_color_attribute(COLOR_ATTRIBUTE, colors)?;
        self.time = time_seconds;
        debug!(time_seconds, offset, "cloud mask updated");
        Ok(())
    }

    pub fn mesh(&self) -> &G {
        &self.mesh
    }

    pub fn material(&self) -> &ShellMaterial {
        &self.material
    }

    pub fn scale(&self) -> f32 {
        self.scale
    }

    /// Animation time of the current mask.
    pub fn time(&self) -> f64 {
        self.time
    }

    pub fn seed(&self) -> u32 {
        self.noise.seed()
    }
}

fn cloud_seed(terrain_seed: u32) -> u32 {
    terrain_seed.wrapping_add(CLOUD_SEED_OFFSET)
}

fn cloud_fbm(terrain: &TerrainSettings) -> FbmParams {
    FbmParams {
        octaves: CLOUD_OCTAVES,
        frequency: terrain.frequency * 2.0,
        amplitude: 1.0,
        lacunarity: 2.0,
        persistence: 0.5,
    }
}
