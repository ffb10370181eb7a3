//! Seeded 3D simplex noise.
//!
//! The kernel is `noise::core::simplex::simplex_3d`; only the lattice hashing
//! is ours, so the field follows the [`Mulberry32`] stream for its seed.

use noise::core::simplex::simplex_3d;
use noise::permutationtable::NoiseHasher;
use noise::{NoiseFn, Seedable};
use rand::seq::SliceRandom;

use crate::Mulberry32;

const TABLE_SIZE: usize = 256;

/// Byte permutation shuffled by a [`Mulberry32`] stream.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct MulberryTable {
    values: [u8; TABLE_SIZE],
}

impl MulberryTable {
    pub fn new(seed: u32) -> Self {
        let mut values: [u8; TABLE_SIZE] = std::array::from_fn(|i| i as u8);
        values.shuffle(&mut Mulberry32::new(seed));
        Self { values }
    }
}

impl NoiseHasher for MulberryTable {
    fn hash(&self, to_hash: &[isize]) -> usize {
        let index = to_hash
            .iter()
            .map(|&a| (a & 0xff) as usize)
            .fold(0, |acc, b| self.values[acc] as usize ^ b);
        self.values[index] as usize
    }
}

impl std::fmt::Debug for MulberryTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "MulberryTable {{ .. }}")
    }
}

/// A 3D simplex noise field whose lattice hashing is derived from a seed.
///
/// `get` returns values in `[-1, 1]`. The field is a pure function of
/// `(seed, point)`.
#[derive(Clone, Debug)]
pub struct SimplexNoise {
    seed: u32,
    table: MulberryTable,
}

impl SimplexNoise {
    /// Default seed, matching the `noise` crate's generators.
    pub const DEFAULT_SEED: u32 = 0;

    pub fn new(seed: u32) -> Self {
        Self {
            seed,
            table: MulberryTable::new(seed),
        }
    }

    /// Evaluate the field at `(x, y, z)`.
    pub fn noise3d(&self, x: f64, y: f64, z: f64) -> f64 {
        let (value, _) = simplex_3d([x, y, z].into(), &self.table);
        value.clamp(-1.0, 1.0)
    }
}

impl Default for SimplexNoise {
    fn default() -> Self {
        Self::new(Self::DEFAULT_SEED)
    }
}

impl NoiseFn<f64, 3> for SimplexNoise {
    fn get(&self, point: [f64; 3]) -> f64 {
        self.noise3d(point[0], point[1], point[2])
    }
}

impl Seedable for SimplexNoise {
    fn set_seed(self, seed: u32) -> Self {
        if seed == self.seed {
            return self;
        }
        Self::new(seed)
    }

    fn seed(&self) -> u32 {
        self.seed
    }
}
