//! Random draw helpers shared by the cluster generator and the star sampler.
//!
//! Wraps a [`SmallRng`] the same way every generator needs it: seeded from
//! [`GalaxyParams::seed`](crate::params::GalaxyParams::seed) when one is set,
//! otherwise from entropy, with one independent stream per consumer so that
//! regenerating stars never perturbs cluster placement.

use std::f32::consts::TAU;

use glam::Vec3;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

/// Stream id for the cluster generator.
pub const CLUSTER_STREAM: u64 = 0x636c_7573;
/// Stream id for the star sampler.
pub const STAR_STREAM: u64 = 0x7374_6172;

/// Seeded random source with galaxy-specific draw helpers.
pub struct SampleRng {
    rng: SmallRng,
}

impl SampleRng {
    /// Deterministic source for `seed`.
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: SmallRng::seed_from_u64(seed),
        }
    }

    /// Source for one consumer `stream`. `None` seeds from entropy.
    pub fn for_stream(seed: Option<u64>, stream: u64) -> Self {
        match seed {
            Some(seed) => Self::seeded(seed ^ stream.rotate_left(32)),
            None => Self {
                rng: SmallRng::from_entropy(),
            },
        }
    }

    // ========== Random primitives ==========

    /// Random f32 in `[0, 1)`.
    #[inline]
    pub fn random(&mut self) -> f32 {
        self.rng.gen()
    }

    /// Random f32 in the given range; returns `min` for an empty range.
    #[inline]
    pub fn random_range(&mut self, min: f32, max: f32) -> f32 {
        if max > min {
            self.rng.gen_range(min..max)
        } else {
            min
        }
    }

    /// Random index in `0..len`. `len` must be non-zero.
    #[inline]
    pub fn random_index(&mut self, len: usize) -> usize {
        self.rng.gen_range(0..len)
    }

    /// Random angle in `[0, TAU)`.
    #[inline]
    pub fn angle(&mut self) -> f32 {
        self.rng.gen_range(0.0..TAU)
    }

    /// True with probability `p`.
    #[inline]
    pub fn chance(&mut self, p: f32) -> bool {
        self.random() < p
    }

    /// Symmetric offset `(u - 0.5) * span`, in `[-span/2, span/2)`.
    #[inline]
    pub fn centered(&mut self, span: f32) -> f32 {
        (self.random() - 0.5) * span
    }

    // ========== Distribution helpers ==========

    /// Inverse-CDF draw from a sech² (logistic) profile: `ln(u / (1 - u))`.
    ///
    /// `u` is clamped to `[u_min, 1 - u_min]`, which bounds the result to
    /// `±ln((1 - u_min) / u_min)`.
    pub fn sech2(&mut self, u_min: f32) -> f32 {
        let u = self.random().clamp(u_min, 1.0 - u_min);
        (u / (1.0 - u)).ln()
    }

    /// Index drawn with probability proportional to `weights[i]`.
    ///
    /// Falls back to the last index when rounding leaves the draw past the
    /// cumulative total, and to 0 for an empty or all-zero table.
    pub fn weighted_index(&mut self, weights: &[f32]) -> usize {
        let total: f32 = weights.iter().map(|w| w.max(0.0)).sum();
        if weights.is_empty() || total <= 0.0 {
            return 0;
        }
        let mut target = self.random() * total;
        for (i, w) in weights.iter().enumerate() {
            target -= w.max(0.0);
            if target < 0.0 {
                return i;
            }
        }
        weights.len() - 1
    }

    /// Per-channel independent interpolation between two colours.
    pub fn color_between(&mut self, min: Vec3, max: Vec3) -> Vec3 {
        Vec3::new(
            min.x + (max.x - min.x) * self.random(),
            min.y + (max.y - min.y) * self.random(),
            min.z + (max.z - min.z) * self.random(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seeded_streams_are_reproducible() {
        let mut a = SampleRng::for_stream(Some(7), STAR_STREAM);
        let mut b = SampleRng::for_stream(Some(7), STAR_STREAM);
        for _ in 0..16 {
            assert_eq!(a.random(), b.random());
        }
    }

    #[test]
    fn test_streams_differ() {
        let mut a = SampleRng::for_stream(Some(7), STAR_STREAM);
        let mut b = SampleRng::for_stream(Some(7), CLUSTER_STREAM);
        let va: Vec<f32> = (0..8).map(|_| a.random()).collect();
        let vb: Vec<f32> = (0..8).map(|_| b.random()).collect();
        assert_ne!(va, vb);
    }

    #[test]
    fn test_sech2_bounded() {
        let mut rng = SampleRng::seeded(1);
        let bound = (0.999_f32 / 0.001).ln() + 1e-4;
        for _ in 0..10_000 {
            let z = rng.sech2(0.001);
            assert!(z.abs() <= bound);
        }
    }

    #[test]
    fn test_sech2_is_symmetric() {
        let mut rng = SampleRng::seeded(2);
        let mean: f32 = (0..20_000).map(|_| rng.sech2(0.001)).sum::<f32>() / 20_000.0;
        assert!(mean.abs() < 0.1);
    }

    #[test]
    fn test_weighted_index_respects_weights() {
        let mut rng = SampleRng::seeded(3);
        let weights = [0.0, 1.0, 3.0];
        let mut counts = [0usize; 3];
        for _ in 0..8000 {
            counts[rng.weighted_index(&weights)] += 1;
        }
        assert_eq!(counts[0], 0);
        let ratio = counts[2] as f32 / counts[1] as f32;
        assert!((ratio - 3.0).abs() < 0.4);
    }

    #[test]
    fn test_weighted_index_degenerate_tables() {
        let mut rng = SampleRng::seeded(4);
        assert_eq!(rng.weighted_index(&[]), 0);
        assert_eq!(rng.weighted_index(&[0.0, 0.0]), 0);
    }

    #[test]
    fn test_random_range_empty() {
        let mut rng = SampleRng::seeded(5);
        assert_eq!(rng.random_range(2.0, 2.0), 2.0);
    }

    #[test]
    fn test_color_between_in_box() {
        let mut rng = SampleRng::seeded(6);
        let lo = Vec3::new(0.2, 0.4, 0.6);
        let hi = Vec3::new(0.3, 0.5, 1.0);
        for _ in 0..100 {
            let c = rng.color_between(lo, hi);
            assert!(c.cmpge(lo).all() && c.cmple(hi).all());
        }
    }
}
