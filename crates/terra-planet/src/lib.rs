//! Procedural planet surfaces: noise-displaced terrain, height-mapped vertex
//! colors, and water and cloud overlay shells.
//!
//! A [`Planet`] owns every buffer. Long per-vertex passes run through a
//! [`terra_sched::ChunkedScheduler`] and yield to a caller-supplied
//! [`terra_sched::YieldPoint`] between time slices.

mod color;
mod displacement;
mod error;
mod geometry;
mod overlay;
mod planet;

pub use color::{
    ColorBuffer, ColorParseError, ColorStop, FLAT_HEIGHT_TOLERANCE, Gradient, HeightColors, Rgb,
    SkipReason, default_palette, map_heights,
};
pub use displacement::{
    DEFAULT_BASE_RADIUS, DisplacementEngine, RADIUS_EPSILON, TerrainSettings, displace_vertex,
};
pub use error::PlanetError;
pub use geometry::{
    COLOR_ATTRIBUTE, GeometryProvider, IcoSphere, IcosphereProvider, MAX_SUBDIVISIONS,
    SphereGeometry,
};
pub use overlay::{
    CLOUD_OCTAVES, CLOUD_SEED_OFFSET, CloudSettings, CloudShell, ShellMaterial, WaterSettings,
    WaterShell, cloud_opacity,
};
pub use planet::{
    DisplaceReport, MeshHandle, OverlayHandle, OverlayKind, Planet, PlanetStats, RecolorOutcome,
};
