//! Subdivided sphere geometry consumed by the displacement and color passes.
//!
//! [`SphereGeometry`] is the seam between the generation core and whatever
//! owns the GPU-side mesh. [`IcoSphere`] is the in-crate implementation: a
//! recursively split icosahedron holding only unique vertices.

use glam::Vec3;
use rustc_hash::FxHashMap;
use tracing::warn;

use crate::color::Rgb;
use crate::error::PlanetError;

/// Name of the per-vertex color attribute.
pub const COLOR_ATTRIBUTE: &str = "color";

/// Highest subdivision level honoured (655,362 vertices).
pub const MAX_SUBDIVISIONS: u32 = 8;

/// A sphere mesh with a fixed, unique vertex set.
pub trait SphereGeometry {
    /// Subdivision level the mesh was built at.
    fn subdivisions(&self) -> u32;

    /// Number of unique vertices.
    fn vertex_count(&self) -> usize;

    /// Position of vertex `index`.
    fn position(&self, index: usize) -> Vec3;

    /// Overwrite the position of vertex `index`.
    fn set_position(&mut self, index: usize, position: Vec3);

    /// All vertex positions.
    fn positions(&self) -> &[Vec3];

    /// Triangle list indexing into [`positions`](Self::positions).
    fn indices(&self) -> &[u32];

    /// Per-vertex normals as of the last [`recompute_normals`](Self::recompute_normals).
    fn normals(&self) -> &[Vec3];

    /// Rebuild normals from the current positions.
    fn recompute_normals(&mut self);

    /// Attach (or replace) a named per-vertex color attribute.
    fn set_color_attribute(&mut self, name: &str, colors: Vec<Rgb>) -> Result<(), PlanetError>;

    /// Read back a named per-vertex color attribute.
    fn color_attribute(&self, name: &str) -> Option<&[Rgb]>;
}

/// Creates sphere meshes at a requested subdivision level.
pub trait GeometryProvider {
    type Mesh: SphereGeometry;

    fn subdivided_sphere(&self, subdivisions: u32) -> Self::Mesh;
}

/// Provides [`IcoSphere`] meshes.
#[derive(Clone, Copy, Debug, Default)]
pub struct IcosphereProvider;

impl GeometryProvider for IcosphereProvider {
    type Mesh = IcoSphere;

    fn subdivided_sphere(&self, subdivisions: u32) -> IcoSphere {
        IcoSphere::new(subdivisions)
    }
}

/// Unit icosphere with shared vertices.
#[derive(Clone, Debug)]
pub struct IcoSphere {
    subdivisions: u32,
    positions: Vec<Vec3>,
    normals: Vec<Vec3>,
    indices: Vec<u32>,
    attributes: FxHashMap<String, Vec<Rgb>>,
}

impl IcoSphere {
    /// Build a unit icosphere. Level `n` has `10 * 4^n + 2` vertices and
    /// `20 * 4^n` triangles. Levels above [`MAX_SUBDIVISIONS`] are clamped.
    pub fn new(subdivisions: u32) -> Self {
        let subdivisions = if subdivisions > MAX_SUBDIVISIONS {
            warn!(
                requested = subdivisions,
                max = MAX_SUBDIVISIONS,
                "clamping icosphere subdivision level"
            );
            MAX_SUBDIVISIONS
        } else {
            subdivisions
        };

        let t = (1.0 + 5.0_f32.sqrt()) / 2.0;

        let mut positions: Vec<Vec3> = [
            Vec3::new(-1.0, t, 0.0),
            Vec3::new(1.0, t, 0.0),
            Vec3::new(-1.0, -t, 0.0),
            Vec3::new(1.0, -t, 0.0),
            Vec3::new(0.0, -1.0, t),
            Vec3::new(0.0, 1.0, t),
            Vec3::new(0.0, -1.0, -t),
            Vec3::new(0.0, 1.0, -t),
            Vec3::new(t, 0.0, -1.0),
            Vec3::new(t, 0.0, 1.0),
            Vec3::new(-t, 0.0, -1.0),
            Vec3::new(-t, 0.0, 1.0),
        ]
        .into_iter()
        .map(Vec3::normalize)
        .collect();

        let mut indices: Vec<u32> = vec![
            0, 11, 5, 0, 5, 1, 0, 1, 7, 0, 7, 10, 0, 10, 11, 1, 5, 9, 5, 11, 4, 11, 10, 2, 10, 7, 6,
            7, 1, 8, 3, 9, 4, 3, 4, 2, 3, 2, 6, 3, 6, 8, 3, 8, 9, 4, 9, 5, 2, 4, 11, 6, 2, 10, 8, 6,
            7, 9, 8, 1,
        ];

        let expected = Self::vertex_count_for(subdivisions);
        positions.reserve(expected - positions.len());

        for _ in 0..subdivisions {
            subdivide(&mut positions, &mut indices);
        }

        let normals = positions.clone();
        Self {
            subdivisions,
            positions,
            normals,
            indices,
            attributes: FxHashMap::default(),
        }
    }

    /// Unique vertex count at a given level.
    pub fn vertex_count_for(subdivisions: u32) -> usize {
        10 * 4usize.pow(subdivisions) + 2
    }
}

/// Split each triangle into four at its edge midpoints, reusing midpoints
/// shared between neighbouring triangles.
fn subdivide(positions: &mut Vec<Vec3>, indices: &mut Vec<u32>) {
    let mut midpoint_cache: FxHashMap<(u32, u32), u32> = FxHashMap::default();
    let mut new_indices = Vec::with_capacity(indices.len() * 4);

    let mut midpoint = |a: u32, b: u32, pos: &mut Vec<Vec3>| -> u32 {
        let key = if a < b { (a, b) } else { (b, a) };
        *midpoint_cache.entry(key).or_insert_with(|| {
            let mid = (pos[a as usize] + pos[b as usize]).normalize();
            pos.push(mid);
            (pos.len() - 1) as u32
        })
    };

    for tri in indices.chunks_exact(3) {
        let (a, b, c) = (tri[0], tri[1], tri[2]);
        let ab = midpoint(a, b, positions);
        let bc = midpoint(b, c, positions);
        let ca = midpoint(c, a, positions);

        new_indices.extend_from_slice(&[a, ab, ca]);
        new_indices.extend_from_slice(&[b, bc, ab]);
        new_indices.extend_from_slice(&[c, ca, bc]);
        new_indices.extend_from_slice(&[ab, bc, ca]);
    }

    *indices = new_indices;
}

impl SphereGeometry for IcoSphere {
    fn subdivisions(&self) -> u32 {
        self.subdivisions
    }

    fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    fn position(&self, index: usize) -> Vec3 {
        self.positions[index]
    }

    fn set_position(&mut self, index: usize, position: Vec3) {
        self.positions[index] = position;
    }

    fn positions(&self) -> &[Vec3] {
        &self.positions
    }

    fn indices(&self) -> &[u32] {
        &self.indices
    }

    fn normals(&self) -> &[Vec3] {
        &self.normals
    }

    /// Area-weighted average of incident face normals.
    fn recompute_normals(&mut self) {
        let mut acc = vec![Vec3::ZERO; self.positions.len()];
        for tri in self.indices.chunks_exact(3) {
            let [a, b, c] = [tri[0] as usize, tri[1] as usize, tri[2] as usize];
            let face = (self.positions[b] - self.positions[a])
                .cross(self.positions[c] - self.positions[a]);
            acc[a] += face;
            acc[b] += face;
            acc[c] += face;
        }

        self.normals = acc
            .into_iter()
            .zip(&self.positions)
            .map(|(n, p)| {
                let n = n.normalize_or_zero();
                if n == Vec3::ZERO { p.normalize_or_zero() } else { n }
            })
            .collect();
    }

    fn set_color_attribute(&mut self, name: &str, colors: Vec<Rgb>) -> Result<(), PlanetError> {
        if colors.len() != self.positions.len() {
            return Err(PlanetError::AttributeLength {
                name: name.to_string(),
                expected: self.positions.len(),
                actual: colors.len(),
            });
        }
        self.attributes.insert(name.to_string(), colors);
        Ok(())
    }

    fn color_attribute(&self, name: &str) -> Option<&[Rgb]> {
        self.attributes.get(name).map(Vec::as_slice)
    }
}
