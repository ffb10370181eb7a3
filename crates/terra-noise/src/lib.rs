//! Seeded, platform-independent noise for planet surface generation.
//!
//! A 32-bit [`Mulberry32`] generator shuffles the permutation table of a 3D
//! [`SimplexNoise`] field, and [`fbm_3d`] composites octaves of any
//! [`noise::NoiseFn`] into fractal terrain height.

mod fbm;
mod rng;
mod simplex;

pub use fbm::{FbmParams, fbm_3d};
pub use rng::Mulberry32;
pub use simplex::{MulberryTable, SimplexNoise};

/// Re-exported so callers can sample and reseed fields without naming the
/// `noise` crate.
pub use noise::{NoiseFn, Seedable};
