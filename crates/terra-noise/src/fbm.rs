//! Multi-octave fractal Brownian motion (fBm) over a 3D noise field.

use glam::DVec3;
use noise::NoiseFn;

/// Octave configuration for [`fbm_3d`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FbmParams {
    /// Number of octaves to composite. Zero yields a flat field.
    pub octaves: u32,
    /// Frequency of the first octave.
    pub frequency: f64,
    /// Amplitude of the first octave.
    pub amplitude: f64,
    /// Frequency multiplier between successive octaves.
    pub lacunarity: f64,
    /// Amplitude multiplier between successive octaves.
    pub persistence: f64,
}

impl Default for FbmParams {
    fn default() -> Self {
        Self {
            octaves: 4,
            frequency: 1.0,
            amplitude: 1.0,
            lacunarity: 2.0,
            persistence: 0.5,
        }
    }
}

impl FbmParams {
    /// Theoretical maximum of `|fbm_3d|` for a field bounded by `[-1, 1]`.
    pub fn max_amplitude(&self) -> f64 {
        let mut sum = 0.0;
        let mut amp = self.amplitude.abs();
        for _ in 0..self.octaves {
            sum += amp;
            amp *= self.persistence.abs();
        }
        sum
    }
}

/// Sum `octaves` samples of `noise`, each at a higher frequency and lower amplitude.
///
/// The point is scaled by the octave frequency on all three axes, then
/// `offset` is added before sampling. The result is not clamped.
pub fn fbm_3d(noise: &impl NoiseFn<f64, 3>, point: DVec3, offset: f64, params: &FbmParams) -> f64 {
    let mut total = 0.0;
    let mut frequency = params.frequency;
    let mut amplitude = params.amplitude;

    for _ in 0..params.octaves {
        let p = point * frequency + DVec3::splat(offset);
        total += noise.get(p.to_array()) * amplitude;

        frequency *= params.lacunarity;
        amplitude *= params.persistence;
    }

    total
}
