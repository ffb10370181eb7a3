//! Height-to-color mapping over a piecewise-linear gradient.
//!
//! Vertex heights (distance from the planet center) are normalized against
//! the global min/max of the mesh, then looked up in a [`Gradient`] built
//! from sorted [`ColorStop`]s.

use bytemuck::{Pod, Zeroable};
use glam::Vec3;
use static_assertions::assert_eq_size;
use terra_sched::{ChunkReport, ChunkedScheduler, YieldPoint};
use tracing::{debug, warn};

/// Linear RGB color with channels in `[0, 1]`.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable)]
pub struct Rgb {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

assert_eq_size!(Rgb, [f32; 3]);

/// Errors from [`Rgb::from_hex`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ColorParseError {
    /// Not 3 or 6 hex digits after an optional `#`.
    #[error("color `{0}` must have 3 or 6 hex digits")]
    InvalidLength(String),
    /// A character outside `[0-9a-fA-F]`.
    #[error("color `{0}` contains a non-hex digit")]
    InvalidDigit(String),
}

impl Rgb {
    pub const WHITE: Self = Self::new(1.0, 1.0, 1.0);
    pub const BLACK: Self = Self::new(0.0, 0.0, 0.0);

    /// Color substituted for malformed input.
    pub const FALLBACK: Self = Self::WHITE;

    pub const fn new(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }

    /// Grayscale color with all channels equal to `v`.
    pub const fn gray(v: f32) -> Self {
        Self::new(v, v, v)
    }

    /// Build from a packed `0xRRGGBB` value.
    pub const fn from_u24(rgb: u32) -> Self {
        Self::new(
            ((rgb >> 16) & 0xff) as f32 / 255.0,
            ((rgb >> 8) & 0xff) as f32 / 255.0,
            (rgb & 0xff) as f32 / 255.0,
        )
    }

    /// Parse `#rrggbb`, `rrggbb`, `#rgb` or `rgb`.
    pub fn from_hex(text: &str) -> Result<Self, ColorParseError> {
        let digits = text.trim();
        let digits = digits.strip_prefix('#').unwrap_or(digits);

        if !digits.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(ColorParseError::InvalidDigit(text.to_string()));
        }

        let packed = match digits.len() {
            6 => u32::from_str_radix(digits, 16)
                .map_err(|_| ColorParseError::InvalidDigit(text.to_string()))?,
            3 => digits.chars().try_fold(0u32, |acc, c| {
                let v = c
                    .to_digit(16)
                    .ok_or_else(|| ColorParseError::InvalidDigit(text.to_string()))?;
                Ok((acc << 8) | (v * 17))
            })?,
            _ => return Err(ColorParseError::InvalidLength(text.to_string())),
        };
        Ok(Self::from_u24(packed))
    }

    /// Parse a hex color, substituting [`Rgb::FALLBACK`] and logging a
    /// warning when the input is malformed.
    pub fn parse_or_default(text: &str) -> Self {
        match Self::from_hex(text) {
            Ok(color) => color,
            Err(err) => {
                warn!(%err, "substituting fallback color");
                Self::FALLBACK
            }
        }
    }

    /// Blend toward `other`; `u = 0` and `u = 1` return the endpoints exactly.
    #[inline]
    pub fn lerp(self, other: Self, u: f32) -> Self {
        let w = 1.0 - u;
        Self::new(
            self.r * w + other.r * u,
            self.g * w + other.g * u,
            self.b * w + other.b * u,
        )
    }

    pub fn to_array(self) -> [f32; 3] {
        [self.r, self.g, self.b]
    }
}

/// A color pinned to a normalized height.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ColorStop {
    pub color: Rgb,
    /// Normalized height in `[0, 1]`.
    pub position: f32,
}

impl ColorStop {
    pub const fn new(color: Rgb, position: f32) -> Self {
        Self { color, position }
    }

    /// Build a stop from a hex string, substituting the fallback color when
    /// the string is malformed.
    pub fn from_hex(hex: &str, position: f32) -> Self {
        Self::new(Rgb::parse_or_default(hex), position)
    }
}

/// Snow, rock, forest and lowland bands.
pub fn default_palette() -> Vec<ColorStop> {
    vec![
        ColorStop::new(Rgb::from_u24(0xffffff), 1.0),
        ColorStop::new(Rgb::from_u24(0x8b6914), 0.8),
        ColorStop::new(Rgb::from_u24(0x32cd32), 0.6),
        ColorStop::new(Rgb::from_u24(0x8b6914), 0.3),
    ]
}

/// Non-empty set of color stops, sorted ascending by position.
#[derive(Clone, Debug, PartialEq)]
pub struct Gradient {
    stops: Vec<ColorStop>,
}

impl Gradient {
    /// Sort `stops` by position. Returns `None` if there are no stops.
    ///
    /// The sort is stable, so among stops sharing a position the first one
    /// supplied stays first.
    pub fn new(stops: impl Into<Vec<ColorStop>>) -> Option<Self> {
        let mut stops = stops.into();
        if stops.is_empty() {
            return None;
        }
        stops.sort_by(|a, b| a.position.total_cmp(&b.position));
        Some(Self { stops })
    }

    pub fn stops(&self) -> &[ColorStop] {
        &self.stops
    }

    /// Color at normalized height `t`.
    ///
    /// The bracket is the first pair whose upper stop is at or above `t`.
    /// Heights outside the stop range clamp to the boundary stop's color, and
    /// a bracket of zero width yields its lower stop's color.
    pub fn sample(&self, t: f32) -> Rgb {
        let last = self.stops.len() - 1;
        let j = self
            .stops
            .windows(2)
            .position(|pair| t <= pair[1].position)
            .unwrap_or(last);

        let current = self.stops[j];
        match self.stops.get(j + 1) {
            Some(next) if next.position != current.position => {
                let u = ((t - current.position) / (next.position - current.position))
                    .clamp(0.0, 1.0);
                current.color.lerp(next.color, u)
            }
            _ => current.color,
        }
    }
}

/// Per-vertex colors, laid out for direct upload as a vertex attribute.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ColorBuffer {
    pub colors: Vec<Rgb>,
}

impl ColorBuffer {
    pub fn with_len(len: usize) -> Self {
        Self {
            colors: vec![Rgb::default(); len],
        }
    }

    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.colors)
    }

    pub fn len(&self) -> usize {
        self.colors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }

    pub fn byte_size(&self) -> usize {
        self.colors.len() * std::mem::size_of::<Rgb>()
    }
}

/// Height spread, relative to the largest height, below which a field is
/// treated as flat. About eight f32 ULPs: enough for the rounding left by
/// normalizing sphere vertices, not enough to swallow real low relief.
pub const FLAT_HEIGHT_TOLERANCE: f32 = 1e-6;

/// Why a pass left existing state untouched.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SkipReason {
    /// The mesh has no vertices.
    NoVertices,
    /// The color stop set is empty.
    NoColorStops,
    /// Every vertex has the same height, up to [`FLAT_HEIGHT_TOLERANCE`], or
    /// heights are not finite.
    FlatHeightField,
}

/// Colors produced by [`map_heights`], with the height range they span.
#[derive(Clone, Debug)]
pub struct HeightColors {
    pub buffer: ColorBuffer,
    pub min_height: f32,
    pub max_height: f32,
    pub height_pass: ChunkReport,
    pub color_pass: ChunkReport,
}

/// Map each vertex's distance from the origin to a gradient color.
///
/// Heights are gathered with their global min/max in one scheduled pass,
/// then colors are written in a second. A flat field is skipped rather than
/// dividing by a zero range.
pub async fn map_heights<Y: YieldPoint>(
    positions: &[Vec3],
    gradient: &Gradient,
    scheduler: &ChunkedScheduler,
    host: &mut Y,
) -> Result<HeightColors, SkipReason> {
    let count = positions.len();
    if count == 0 {
        return Err(SkipReason::NoVertices);
    }

    let mut heights = vec![0.0f32; count];
    let mut min_height = f32::INFINITY;
    let mut max_height = f32::NEG_INFINITY;
    let height_pass = scheduler
        .run(count, host, |i| {
            let h = positions[i].length();
            heights[i] = h;
            min_height = min_height.min(h);
            max_height = max_height.max(h);
        })
        .await;

    let range = max_height - min_height;
    if !(range.is_finite() && range > FLAT_HEIGHT_TOLERANCE * max_height.abs().max(1.0)) {
        debug!(min_height, max_height, "height field is flat");
        return Err(SkipReason::FlatHeightField);
    }

    let mut buffer = ColorBuffer::with_len(count);
    let color_pass = scheduler
        .run(count, host, |i| {
            let t = ((heights[i] - min_height) / range).clamp(0.0, 1.0);
            buffer.colors[i] = gradient.sample(t);
        })
        .await;

    Ok(HeightColors {
        buffer,
        min_height,
        max_height,
        height_pass,
        color_pass,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use terra_sched::YieldNow;

    const EPSILON: f32 = 1e-6;

    fn assert_close(a: Rgb, b: Rgb) {
        assert!(
            (a.r - b.r).abs() < EPSILON
                && (a.g - b.g).abs() < EPSILON
                && (a.b - b.b).abs() < EPSILON,
            "{a:?} != {b:?}"
        );
    }

    #[test]
    fn test_parse_six_digit_hex() {
        let c = Rgb::from_hex("#8b6914").unwrap();
        assert_eq!(c, Rgb::from_u24(0x8b6914));
        assert_eq!(Rgb::from_hex("FFFFFF").unwrap(), Rgb::WHITE);
    }

    #[test]
    fn test_parse_three_digit_hex() {
        assert_eq!(Rgb::from_hex("#fff").unwrap(), Rgb::WHITE);
        assert_eq!(Rgb::from_hex("#f00").unwrap(), Rgb::new(1.0, 0.0, 0.0));
    }

    #[test]
    fn test_parse_rejects_malformed() {
        assert!(matches!(
            Rgb::from_hex("#12345"),
            Err(ColorParseError::InvalidLength(_))
        ));
        assert!(matches!(
            Rgb::from_hex("#gg0000"),
            Err(ColorParseError::InvalidDigit(_))
        ));
        assert!(matches!(Rgb::from_hex(""), Err(ColorParseError::InvalidLength(_))));
    }

    #[test]
    fn test_malformed_color_substitutes_fallback() {
        assert_eq!(Rgb::parse_or_default("not a color"), Rgb::FALLBACK);
        let stop = ColorStop::from_hex("#zzz", 0.5);
        assert_eq!(stop.color, Rgb::FALLBACK);
        assert_eq!(stop.position, 0.5);
    }

    #[test]
    fn test_lerp_endpoints_exact() {
        let a = Rgb::from_u24(0x8b6914);
        let b = Rgb::from_u24(0x32cd32);
        assert_eq!(a.lerp(b, 0.0), a);
        assert_eq!(a.lerp(b, 1.0), b);
    }

    #[test]
    fn test_empty_gradient_is_none() {
        assert!(Gradient::new(Vec::new()).is_none());
    }

    #[test]
    fn test_gradient_sorts_stops() {
        let g = Gradient::new(default_palette()).unwrap();
        let positions: Vec<f32> = g.stops().iter().map(|s| s.position).collect();
        assert_eq!(positions, vec![0.3, 0.6, 0.8, 1.0]);
    }

    #[test]
    fn test_midpoint_interpolation() {
        let green = Rgb::from_u24(0x32cd32);
        let brown = Rgb::from_u24(0x8b6914);
        let g =
            Gradient::new(vec![ColorStop::new(green, 0.6), ColorStop::new(brown, 0.3)]).unwrap();

        let expected = Rgb::new(
            0.5 * green.r + 0.5 * brown.r,
            0.5 * green.g + 0.5 * brown.g,
            0.5 * green.b + 0.5 * brown.b,
        );
        assert_close(g.sample(0.45), expected);
    }

    #[test]
    fn test_out_of_range_clamps_to_boundary_stops() {
        let low = Rgb::new(0.1, 0.2, 0.3);
        let high = Rgb::new(0.9, 0.8, 0.7);
        let g = Gradient::new(vec![ColorStop::new(high, 0.8), ColorStop::new(low, 0.2)]).unwrap();
        assert_eq!(g.sample(0.0), low);
        assert_eq!(g.sample(0.2), low);
        assert_eq!(g.sample(0.8), high);
        assert_eq!(g.sample(1.0), high);
    }

    #[test]
    fn test_duplicate_positions_use_first_stop() {
        let a = Rgb::new(1.0, 0.0, 0.0);
        let b = Rgb::new(0.0, 1.0, 0.0);
        let c = Rgb::new(0.0, 0.0, 1.0);
        let g = Gradient::new(vec![
            ColorStop::new(a, 0.5),
            ColorStop::new(b, 0.5),
            ColorStop::new(c, 1.0),
        ])
        .unwrap();
        assert_eq!(g.sample(0.25), a);
        assert_eq!(g.sample(0.5), a);
        assert_close(g.sample(0.75), b.lerp(c, 0.5));
    }

    #[test]
    fn test_single_stop_is_constant() {
        let only = Rgb::new(0.4, 0.5, 0.6);
        let g = Gradient::new(vec![ColorStop::new(only, 0.5)]).unwrap();
        for t in [0.0, 0.3, 0.5, 0.9, 1.0] {
            assert_eq!(g.sample(t), only);
        }
    }

    #[test]
    fn test_map_heights_hits_boundary_colors() {
        let positions = vec![
            Vec3::new(1.0, 0.0, 0.0),
            Vec3::new(0.0, 1.5, 0.0),
            Vec3::new(0.0, 0.0, 2.0),
        ];
        let g = Gradient::new(default_palette()).unwrap();
        let sched = ChunkedScheduler::default();
        let mapped =
            pollster::block_on(map_heights(&positions, &g, &sched, &mut YieldNow)).unwrap();

        assert_eq!(mapped.min_height, 1.0);
        assert_eq!(mapped.max_height, 2.0);
        assert_eq!(mapped.buffer.colors[0], Rgb::from_u24(0x8b6914));
        assert_eq!(mapped.buffer.colors[2], Rgb::from_u24(0xffffff));
    }

    #[test]
    fn test_map_heights_flat_field_skips() {
        let positions = vec![Vec3::X, Vec3::Y, Vec3::Z, -Vec3::X];
        let g = Gradient::new(default_palette()).unwrap();
        let sched = ChunkedScheduler::default();
        let result = pollster::block_on(map_heights(&positions, &g, &sched, &mut YieldNow));
        assert_eq!(result.err(), Some(SkipReason::FlatHeightField));
    }

    #[test]
    fn test_map_heights_rounding_spread_is_flat() {
        let positions = vec![
            Vec3::new(1.5, 0.0, 0.0),
            Vec3::new(0.0, 1.500_000_4, 0.0),
            Vec3::new(0.0, 0.0, 1.499_999_8),
        ];
        let g = Gradient::new(default_palette()).unwrap();
        let sched = ChunkedScheduler::default();
        let result = pollster::block_on(map_heights(&positions, &g, &sched, &mut YieldNow));
        assert_eq!(result.err(), Some(SkipReason::FlatHeightField));
    }

    #[test]
    fn test_map_heights_low_relief_is_colored() {
        let positions = vec![
            Vec3::new(1.5, 0.0, 0.0),
            Vec3::new(0.0, 1.500_003, 0.0),
            Vec3::new(0.0, 0.0, 1.500_006),
        ];
        let g = Gradient::new(default_palette()).unwrap();
        let sched = ChunkedScheduler::default();
        let mapped = pollster::block_on(map_heights(&positions, &g, &sched, &mut YieldNow))
            .expect("a spread of a few micrometres is still terrain");

        assert!(mapped.max_height > mapped.min_height);
        assert_eq!(mapped.buffer.colors[0], Rgb::from_u24(0x8b6914));
        assert_eq!(mapped.buffer.colors[2], Rgb::from_u24(0xffffff));
    }

    #[test]
    fn test_map_heights_empty_skips() {
        let g = Gradient::new(default_palette()).unwrap();
        let sched = ChunkedScheduler::default();
        let result = pollster::block_on(map_heights(&[], &g, &sched, &mut YieldNow));
        assert_eq!(result.err(), Some(SkipReason::NoVertices));
    }

    #[test]
    fn test_color_buffer_bytes() {
        let mut buf = ColorBuffer::with_len(2);
        buf.colors[1] = Rgb::WHITE;
        assert_eq!(buf.byte_size(), 24);
        assert_eq!(buf.as_bytes().len(), 24);
    }
}
