//! Radial terrain displacement driven by seeded fBm noise.

use glam::Vec3;
use terra_noise::{FbmParams, NoiseFn, SimplexNoise, fbm_3d};
use terra_sched::{ChunkReport, ChunkedScheduler, YieldPoint};
use tracing::debug;

use crate::geometry::SphereGeometry;

/// Mean surface radius before noise is applied.
pub const DEFAULT_BASE_RADIUS: f32 = 1.5;

/// Smallest radius a displaced vertex may take. Negative fBm sums deeper
/// than the base radius are floored here instead of inverting through the
/// center.
pub const RADIUS_EPSILON: f32 = 1e-4;

/// Terrain generation parameters.
#[derive(Clone, Debug, PartialEq)]
pub struct TerrainSettings {
    /// Seed for the terrain noise field.
    pub seed: u32,
    /// Amplitude of the first octave.
    pub amplitude: f64,
    /// Frequency of the first octave.
    pub frequency: f64,
    /// Number of octaves. Zero leaves every vertex at `base_radius`.
    pub octaves: u32,
    /// Amplitude multiplier between octaves.
    pub persistence: f64,
    /// Frequency multiplier between octaves.
    pub lacunarity: f64,
    /// Radius the noise is added to.
    pub base_radius: f32,
}

impl Default for TerrainSettings {
    fn default() -> Self {
        Self {
            seed: 42,
            amplitude: 0.15,
            frequency: 2.0,
            octaves: 4,
            persistence: 0.55,
            lacunarity: 2.0,
            base_radius: DEFAULT_BASE_RADIUS,
        }
    }
}

impl TerrainSettings {
    /// Octave parameters for the fBm sum.
    pub fn fbm(&self) -> FbmParams {
        FbmParams {
            octaves: self.octaves,
            frequency: self.frequency,
            amplitude: self.amplitude,
            lacunarity: self.lacunarity,
            persistence: self.persistence,
        }
    }

    /// Largest possible `|radius - base_radius|`.
    pub fn max_displacement(&self) -> f64 {
        self.fbm().max_amplitude()
    }
}

/// Displace one undisplaced vertex along its radial direction.
///
/// Noise is sampled at `base * frequency` for each octave; the summed
/// height is added to `base_radius` and floored at [`RADIUS_EPSILON`].
pub fn displace_vertex(
    base: Vec3,
    noise: &impl NoiseFn<f64, 3>,
    settings: &TerrainSettings,
) -> Vec3 {
    let normal = base.normalize_or_zero();
    let height = fbm_3d(noise, base.as_dvec3(), 0.0, &settings.fbm());
    let radius = (settings.base_radius as f64 + height).max(RADIUS_EPSILON as f64);
    normal * radius as f32
}

/// Applies one set of [`TerrainSettings`] to whole vertex buffers.
#[derive(Clone, Debug)]
pub struct DisplacementEngine {
    noise: SimplexNoise,
    settings: TerrainSettings,
}

impl DisplacementEngine {
    pub fn new(settings: TerrainSettings) -> Self {
        Self {
            noise: SimplexNoise::new(settings.seed),
            settings,
        }
    }

    pub fn settings(&self) -> &TerrainSettings {
        &self.settings
    }

    /// Displaced position for a base vertex.
    pub fn displace(&self, base: Vec3) -> Vec3 {
        displace_vertex(base, &self.noise, &self.settings)
    }

    /// Rewrite every vertex of `geometry` from its counterpart in `base`.
    ///
    /// Each vertex is restored from `base` before being displaced, so running
    /// the same settings twice gives the same buffer as running them once.
    pub async fn run<G, Y>(
        &self,
        base: &[Vec3],
        geometry: &mut G,
        scheduler: &ChunkedScheduler,
        host: &mut Y,
    ) -> ChunkReport
    where
        G: SphereGeometry,
        Y: YieldPoint,
    {
        debug_assert_eq!(base.len(), geometry.vertex_count());
        let count = base.len().min(geometry.vertex_count());

        let report = scheduler
            .run(count, host, |i| geometry.set_position(i, self.displace(base[i])))
            .await;

        debug!(
            seed = self.settings.seed,
            octaves = self.settings.octaves,
            vertices = count,
            slices = report.slices,
            "displacement pass complete"
        );
        report
    }
}
