//! Star-forming cluster anchors.
//!
//! A fixed-size list of weighted anchor points, most of them sitting on the
//! spiral arm centerlines and the rest scattered through a thicker halo. The
//! list is generated once per structural parameter change and handed as a
//! read-only `Arc<[ClusterCenter]>` snapshot to both the star sampler and the
//! density field builder, so cluster stars and bright gas knots coincide.

use std::f32::consts::TAU;

use glam::Vec3;

use crate::density::{SpiralArms, EPSILON};
use crate::params::GalaxyParams;
use crate::sampling::SampleRng;

/// Share of clusters placed on the arms; the remainder form the halo.
pub const ARM_CLUSTER_FRACTION: f64 = 0.7;
/// Extra influence of arm clusters in the density field.
pub const ARM_CLUSTER_BONUS: f32 = 0.3;
/// Arm clusters are spread from the base radius out to this fraction of the radius.
const ARM_OUTER_FRACTION: f32 = 0.85;
/// Hard outer limit for arm clusters.
const ARM_MAX_FRACTION: f32 = 0.92;
/// Halo clusters live inside this fraction of the radius.
const HALO_FRACTION: f32 = 0.7;
/// Exponent biasing halo radii toward the centre.
const HALO_RADIUS_EXPONENT: f32 = 1.5;

/// One cluster anchor.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ClusterCenter {
    /// World position.
    pub position: Vec3,
    /// Influence radius.
    pub radius: f32,
    /// Weight in `[0, 1]`.
    pub density: f32,
    /// Arm this cluster sits on, or -1 for the halo.
    pub arm_index: i32,
}

impl ClusterCenter {
    /// Whether the cluster belongs to a spiral arm.
    #[inline]
    pub fn is_arm(&self) -> bool {
        self.arm_index >= 0
    }

    /// Distance from the galactic axis.
    #[inline]
    pub fn planar_radius(&self) -> f32 {
        self.position.truncate().length()
    }

    /// Polar angle in the disc plane.
    #[inline]
    pub fn angle(&self) -> f32 {
        self.position.y.atan2(self.position.x)
    }

    /// Exponential influence of this cluster at `p`.
    pub fn influence_at(&self, p: Vec3) -> f32 {
        let d = p.distance(self.position);
        let mut weight = self.density * (-d / self.radius.max(EPSILON)).exp();
        if self.is_arm() {
            weight *= 1.0 + ARM_CLUSTER_BONUS;
        }
        weight
    }
}

/// Summed influence of every cluster at `p`.
pub fn total_influence(clusters: &[ClusterCenter], p: Vec3) -> f32 {
    clusters.iter().map(|c| c.influence_at(p)).sum()
}

/// Inputs to [`generate_clusters`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ClusterSpec {
    /// Total number of clusters.
    pub count: u32,
    /// Radius the clusters are distributed within.
    pub radius: f32,
    /// Arm geometry (width is unused).
    pub arms: SpiralArms,
    /// Vertical scale height in world units.
    pub vertical_scale: f32,
}

impl ClusterSpec {
    /// Spec derived from `params`.
    pub fn from_params(params: &GalaxyParams) -> Self {
        Self {
            count: params.cluster_count,
            radius: params.galactic_radius * params.cluster_radius_fraction,
            arms: SpiralArms::from_params(params),
            vertical_scale: params.vertical_scale_height_world(),
        }
    }
}

/// Clusters per arm for `count` clusters over `arms` arms; zero when there are no arms.
pub fn clusters_per_arm(count: u32, arms: u32) -> u32 {
    if arms == 0 {
        return 0;
    }
    // The epsilon keeps exact products such as 20 * 0.7 from flooring down.
    ((count as f64 * ARM_CLUSTER_FRACTION) / arms as f64 + 1e-9).floor() as u32
}

/// Generate exactly `spec.count` cluster anchors.
///
/// The first `arms * clusters_per_arm` entries are arm clusters (grouped by
/// arm), the rest are halo clusters with `arm_index == -1`. Zero arms is
/// rejected by [`GalaxyParams::validate`]; if it slips through, the result is
/// all halo rather than NaN.
pub fn generate_clusters(spec: &ClusterSpec, rng: &mut SampleRng) -> Vec<ClusterCenter> {
    let radius = spec.radius.max(EPSILON);
    let per_arm = clusters_per_arm(spec.count, spec.arms.count);
    let arm_total = per_arm * spec.arms.count;
    let mut clusters = Vec::with_capacity(spec.count as usize);

    let base = spec.arms.base_radius;
    for arm in 0..spec.arms.count {
        for i in 0..per_arm {
            let t = (i as f32 + 0.5) / per_arm as f32;
            let r = (base + t * (ARM_OUTER_FRACTION * radius - base))
                .clamp(base * 0.5, ARM_MAX_FRACTION * radius);
            let theta = spec.arms.centerline_angle(r, arm);

            let jitter = (0.3 + 0.5 * rng.random()) * 0.12 * r;
            let nr = r / radius;
            let local_scale = spec.vertical_scale * (0.6 + 0.4 * nr);
            let z = (rng.sech2(0.01) * 0.25 * local_scale)
                .clamp(-1.5 * local_scale, 1.5 * local_scale)
                + rng.centered(0.2 * local_scale);

            let position = Vec3::new(
                r * theta.cos() + rng.centered(jitter),
                r * theta.sin() + rng.centered(jitter),
                z,
            );
            clusters.push(ClusterCenter {
                position,
                radius: (0.15 + 0.25 * rng.random()) * radius / 10.0,
                density: 0.3 + 0.4 * rng.random(),
                arm_index: arm as i32,
            });
        }
    }

    for _ in arm_total..spec.count {
        let r = rng.random().powf(HALO_RADIUS_EXPONENT) * HALO_FRACTION * radius;
        let theta = rng.random() * TAU;
        let nr = r / radius;
        let local_scale = spec.vertical_scale * (1.0 + 0.5 * nr);
        let z = (rng.sech2(0.01) * 0.35 * local_scale).clamp(-2.0 * local_scale, 2.0 * local_scale);

        clusters.push(ClusterCenter {
            position: Vec3::new(r * theta.cos(), r * theta.sin(), z),
            radius: (0.8 + 1.4 * rng.random()) * radius / 10.0,
            density: 0.2 + 0.3 * rng.random(),
            arm_index: -1,
        });
    }

    log::debug!(
        "generated {} clusters ({} on arms, {} halo)",
        clusters.len(),
        arm_total,
        clusters.len() as u32 - arm_total
    );
    clusters
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spec(count: u32, arms: u32) -> ClusterSpec {
        let params = GalaxyParams::default().with_spiral_arms(arms);
        ClusterSpec {
            count,
            ..ClusterSpec::from_params(&params)
        }
    }

    #[test]
    fn test_exact_count_and_split() {
        for &(count, arms) in &[(20, 2), (20, 3), (7, 4), (1, 1), (0, 2), (100, 5), (33, 6)] {
            let mut rng = SampleRng::seeded(count as u64 * 31 + arms as u64);
            let clusters = generate_clusters(&spec(count, arms), &mut rng);
            assert_eq!(clusters.len(), count as usize);

            let expected_arm = arms * ((count * 7) / (10 * arms));
            let on_arm = clusters.iter().filter(|c| c.arm_index >= 0).count() as u32;
            assert_eq!(on_arm, expected_arm, "count {count} arms {arms}");
            assert!(clusters
                .iter()
                .filter(|c| !c.is_arm())
                .all(|c| c.arm_index == -1));
        }
    }

    #[test]
    fn test_zero_arms_degenerates_to_halo() {
        let mut rng = SampleRng::seeded(9);
        let clusters = generate_clusters(&spec(10, 0), &mut rng);
        assert_eq!(clusters.len(), 10);
        assert!(clusters.iter().all(|c| c.arm_index == -1));
        assert!(clusters.iter().all(|c| c.position.is_finite()));
    }

    #[test]
    fn test_arm_clusters_follow_centerline() {
        let s = spec(40, 2);
        let mut rng = SampleRng::seeded(11);
        let clusters = generate_clusters(&s, &mut rng);
        for c in clusters.iter().filter(|c| c.is_arm()) {
            let r = c.planar_radius();
            // Jitter moves a cluster by at most 0.068 r, which also shifts the
            // centerline angle it is measured against.
            let d = s.arms.nearest_distance(r, c.angle());
            assert!(d < 0.35 * r + 0.05, "cluster {c:?} is {d} from its arm");
        }
    }

    #[test]
    fn test_clusters_within_radius_and_ranges() {
        let s = spec(60, 3);
        let mut rng = SampleRng::seeded(12);
        for c in generate_clusters(&s, &mut rng) {
            assert!(c.planar_radius() <= s.radius * 1.1);
            assert!(c.position.z.abs() <= 3.0 * s.vertical_scale + 1e-5);
            assert!((0.0..=1.0).contains(&c.density));
            assert!(c.radius > 0.0);
        }
    }

    #[test]
    fn test_per_arm_count() {
        assert_eq!(clusters_per_arm(20, 2), 7);
        assert_eq!(clusters_per_arm(20, 3), 4);
        assert_eq!(clusters_per_arm(10, 1), 7);
        assert_eq!(clusters_per_arm(10, 0), 0);
    }

    #[test]
    fn test_influence_falls_off() {
        let c = ClusterCenter {
            position: Vec3::ZERO,
            radius: 0.5,
            density: 0.5,
            arm_index: -1,
        };
        assert!((c.influence_at(Vec3::ZERO) - 0.5).abs() < 1e-6);
        assert!(c.influence_at(Vec3::X) < c.influence_at(Vec3::X * 0.5));

        let arm = ClusterCenter { arm_index: 0, ..c };
        assert!((arm.influence_at(Vec3::ZERO) - 0.65).abs() < 1e-6);
        assert!((total_influence(&[c, arm], Vec3::ZERO) - 1.15).abs() < 1e-5);
    }
}
