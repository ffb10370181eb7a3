//! Mulberry32: a tiny 32-bit state generator with multiplicative mixing.
//!
//! Output depends only on wrapping integer arithmetic, so a given seed yields
//! the same sequence on every platform and toolchain.

use rand::{RngCore, SeedableRng};

/// Increment added to the state on every step (Weyl sequence).
const GAMMA: u32 = 0x6D2B_79F5;

/// Seeded 32-bit pseudo-random generator.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Mulberry32 {
    state: u32,
}

impl Mulberry32 {
    /// Create a generator from a 32-bit seed.
    pub fn new(seed: u32) -> Self {
        Self { state: seed }
    }

    /// Uniform float in `[0, 1)`.
    #[inline]
    pub fn next_f64(&mut self) -> f64 {
        self.next_u32() as f64 / 4_294_967_296.0
    }

    #[inline]
    fn step(&mut self) -> u32 {
        self.state = self.state.wrapping_add(GAMMA);
        let mut t = self.state;
        t = (t ^ (t >> 15)).wrapping_mul(t | 1);
        t ^= t.wrapping_add((t ^ (t >> 7)).wrapping_mul(t | 61));
        t ^ (t >> 14)
    }
}

impl RngCore for Mulberry32 {
    #[inline]
    fn next_u32(&mut self) -> u32 {
        self.step()
    }

    fn next_u64(&mut self) -> u64 {
        let lo = self.step() as u64;
        let hi = self.step() as u64;
        (hi << 32) | lo
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        for chunk in dest.chunks_mut(4) {
            let bytes = self.step().to_le_bytes();
            chunk.copy_from_slice(&bytes[..chunk.len()]);
        }
    }
}

impl SeedableRng for Mulberry32 {
    type Seed = [u8; 4];

    fn from_seed(seed: Self::Seed) -> Self {
        Self::new(u32::from_le_bytes(seed))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_seed_same_sequence() {
        let mut a = Mulberry32::new(42);
        let mut b = Mulberry32::new(42);
        for _ in 0..1000 {
            assert_eq!(a.next_u32(), b.next_u32());
        }
    }

    #[test]
    fn test_known_outputs() {
        let mut rng = Mulberry32::new(0);
        assert_eq!(rng.next_u32(), 1_144_304_738);
        assert_eq!(rng.next_u32(), 1_416_247);
        assert_eq!(rng.next_u32(), 958_946_056);

        let mut rng = Mulberry32::new(42);
        assert_eq!(rng.next_u32(), 2_581_720_956);
        assert_eq!(rng.next_u32(), 1_925_393_290);
        assert_eq!(rng.next_u32(), 3_661_312_704);
    }

    #[test]
    fn test_different_seeds_diverge() {
        let mut a = Mulberry32::new(1);
        let mut b = Mulberry32::new(2);
        let same = (0..64).filter(|_| a.next_u32() == b.next_u32()).count();
        assert!(same < 4, "seeds 1 and 2 produced {same} equal outputs");
    }

    #[test]
    fn test_floats_in_unit_interval() {
        let mut rng = Mulberry32::new(12345);
        for _ in 0..10_000 {
            let f = rng.next_f64();
            assert!((0.0..1.0).contains(&f), "value {f} outside [0, 1)");
        }
    }

    #[test]
    fn test_floats_roughly_uniform() {
        let mut rng = Mulberry32::new(7);
        let n = 20_000;
        let mean = (0..n).map(|_| rng.next_f64()).sum::<f64>() / n as f64;
        assert!((mean - 0.5).abs() < 0.02, "mean {mean} too far from 0.5");
    }

    #[test]
    fn test_from_seed_matches_new() {
        let mut a = Mulberry32::from_seed(99u32.to_le_bytes());
        let mut b = Mulberry32::new(99);
        assert_eq!(a.next_u64(), b.next_u64());
    }

    #[test]
    fn test_fill_bytes_partial_chunk() {
        let mut rng = Mulberry32::new(5);
        let mut buf = [0u8; 7];
        rng.fill_bytes(&mut buf);

        let mut check = Mulberry32::new(5);
        let w0 = check.next_u32().to_le_bytes();
        let w1 = check.next_u32().to_le_bytes();
        assert_eq!(&buf[..4], &w0);
        assert_eq!(&buf[4..], &w1[..3]);
    }
}
