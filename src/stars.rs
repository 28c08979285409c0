//! Star catalog sampling.
//!
//! Stars are drawn once per generation and never mutated afterwards: each
//! [`StarRecord`] keeps its *initial* polar angle and the displayed angle is
//! recomputed every frame by [`orbit`](crate::orbit).
//!
//! # Sampling
//!
//! 1. A [`RadialCdf`] is built from the angularly averaged surface density
//!    weighted by `r`, so radii are drawn proportional to the mass in each
//!    annulus.
//! 2. With probability `cluster_influence` a star snaps to a random cluster.
//!    Otherwise its radius comes from the CDF, its angle from a bounded
//!    rejection search that favours the arms, and its height from a sech²
//!    profile that thins out on the arms.
//! 3. A radius-dependent weighted draw picks the [`StarType`], which fixes
//!    colour and size ranges.
//!
//! ```ignore
//! let catalog = generate_stars(&params, &clusters, &mut rng);
//! queue.write_buffer(&buffer, 0, bytemuck::cast_slice(&catalog.to_instances()));
//! ```

use std::sync::Arc;

use bytemuck::{Pod, Zeroable};
use glam::Vec3;

use crate::clusters::ClusterCenter;
use crate::density::{sanitize, DensityModel};
use crate::orbit;
use crate::params::GalaxyParams;
use crate::sampling::SampleRng;

/// Radial bins in the CDF.
pub const RADIAL_BINS: usize = 1000;
/// Angular samples averaged per radial bin.
pub const ANGULAR_SAMPLES: usize = 32;
/// Extra candidate angles tried per field star.
pub const ARM_REJECTION_ATTEMPTS: u32 = 8;
/// Arm factor above which a candidate may be accepted immediately.
pub const ARM_ACCEPT_THRESHOLD: f32 = 0.7;
/// Probability of accepting a candidate above the threshold.
pub const ARM_EARLY_ACCEPT_CHANCE: f32 = 0.8;
/// Cluster stars land within this fraction of the cluster radius.
pub const CLUSTER_JITTER_FRACTION: f32 = 0.3;
/// Visual size multiplier applied on top of `star_size`.
const SIZE_MULTIPLIER: f32 = 15.0;

/// Stellar classification.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum StarType {
    O,
    B,
    A,
    F,
    G,
    K,
    M,
    RedGiant,
    WhiteDwarf,
    BrownDwarf,
}

/// Colour and luminosity ranges of a [`StarType`].
#[derive(Clone, Copy, Debug)]
pub struct StarTypeInfo {
    /// Display name.
    pub name: &'static str,
    /// Lower colour bound.
    pub color_min: Vec3,
    /// Upper colour bound.
    pub color_max: Vec3,
    /// Luminosity range.
    pub luminosity: (f32, f32),
    /// Extra size multiplier.
    pub size_scale: f32,
}

const fn info(
    name: &'static str,
    color_min: [f32; 3],
    color_max: [f32; 3],
    luminosity: (f32, f32),
    size_scale: f32,
) -> StarTypeInfo {
    StarTypeInfo {
        name,
        color_min: Vec3::from_array(color_min),
        color_max: Vec3::from_array(color_max),
        luminosity,
        size_scale,
    }
}

const STAR_TYPES: [StarTypeInfo; 10] = [
    info("O", [0.2, 0.2, 0.9], [0.4, 0.4, 1.0], (2.5, 5.0), 1.3),
    info("B", [0.6, 0.7, 1.0], [0.8, 0.9, 1.0], (2.0, 4.0), 1.3),
    info("A", [0.8, 0.8, 0.95], [0.9, 0.9, 1.0], (1.5, 2.5), 1.0),
    info("F", [0.95, 0.95, 0.8], [1.0, 1.0, 0.9], (1.2, 1.8), 1.0),
    info("G", [1.0, 0.95, 0.7], [1.0, 1.0, 0.8], (0.9, 1.3), 1.0),
    info("K", [1.0, 0.6, 0.4], [1.0, 0.8, 0.6], (0.6, 1.0), 1.0),
    info("M", [1.0, 0.3, 0.3], [1.0, 0.5, 0.5], (0.4, 0.7), 1.0),
    info("Red Giant", [1.0, 0.4, 0.2], [1.0, 0.6, 0.4], (2.0, 4.0), 2.0),
    info("White Dwarf", [0.7, 0.7, 0.9], [0.9, 0.9, 1.0], (0.8, 1.5), 0.3),
    info("Brown Dwarf", [0.3, 0.15, 0.1], [0.5, 0.3, 0.2], (0.1, 0.3), 1.0),
];

/// Type weights inside 0.3 R; hot young stars are more common near the core.
pub const INNER_TYPE_WEIGHTS: [f32; 10] = [0.02, 0.08, 0.15, 0.20, 0.25, 0.15, 0.10, 0.03, 0.01, 0.01];
/// Type weights between 0.3 R and 0.7 R.
pub const MIDDLE_TYPE_WEIGHTS: [f32; 10] = [0.01, 0.05, 0.10, 0.15, 0.25, 0.20, 0.15, 0.05, 0.03, 0.01];
/// Type weights beyond 0.7 R.
///
/// These add up to 1.025; draws are normalized by the total, so every entry
/// (Brown Dwarfs included) keeps a share of `w / 1.025`.
pub const OUTER_TYPE_WEIGHTS: [f32; 10] = [0.005, 0.02, 0.05, 0.10, 0.20, 0.25, 0.25, 0.08, 0.05, 0.02];

impl StarType {
    /// Every type in table order.
    pub const ALL: [StarType; 10] = [
        StarType::O,
        StarType::B,
        StarType::A,
        StarType::F,
        StarType::G,
        StarType::K,
        StarType::M,
        StarType::RedGiant,
        StarType::WhiteDwarf,
        StarType::BrownDwarf,
    ];

    /// Colour, luminosity and size data for this type.
    pub fn info(self) -> &'static StarTypeInfo {
        &STAR_TYPES[self as usize]
    }

    /// Type weight table for a normalized radius `r / R`.
    pub fn weights_for(normalized_radius: f32) -> &'static [f32; 10] {
        if normalized_radius < 0.3 {
            &INNER_TYPE_WEIGHTS
        } else if normalized_radius < 0.7 {
            &MIDDLE_TYPE_WEIGHTS
        } else {
            &OUTER_TYPE_WEIGHTS
        }
    }
}

/// One generated star.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StarRecord {
    /// Polar radius.
    pub r: f32,
    /// Initial polar angle; never changes after generation.
    pub theta0: f32,
    /// Height above the disc plane.
    pub z: f32,
    /// Stellar type.
    pub star_type: StarType,
    /// Display colour.
    pub color: Vec3,
    /// Display size.
    pub size: f32,
}

impl StarRecord {
    /// Position at `time` under differential rotation.
    #[inline]
    pub fn position_at(&self, time: f32, time_scale: f32) -> Vec3 {
        orbit::star_position(self.r, self.theta0, self.z, time, time_scale)
    }
}

/// GPU layout of a star: the vertex shader applies the rotation law itself.
#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
pub struct StarInstance {
    /// `(r, theta0, z)`.
    pub init_pos: [f32; 3],
    /// Display size.
    pub size: f32,
    /// Display colour.
    pub color: [f32; 3],
    pub _pad: f32,
}

impl From<&StarRecord> for StarInstance {
    fn from(star: &StarRecord) -> Self {
        Self {
            init_pos: [star.r, star.theta0, star.z],
            size: star.size,
            color: star.color.to_array(),
            _pad: 0.0,
        }
    }
}

/// Immutable set of stars from one generation; replaced wholesale on regeneration.
#[derive(Clone, Debug)]
pub struct StarCatalog {
    stars: Arc<[StarRecord]>,
}

impl Default for StarCatalog {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

impl StarCatalog {
    /// Wrap a list of records.
    pub fn new(stars: Vec<StarRecord>) -> Self {
        Self {
            stars: stars.into(),
        }
    }

    /// All records.
    pub fn stars(&self) -> &[StarRecord] {
        &self.stars
    }

    /// Number of stars.
    pub fn len(&self) -> usize {
        self.stars.len()
    }

    /// Whether the catalog is empty.
    pub fn is_empty(&self) -> bool {
        self.stars.is_empty()
    }

    /// Whether both handles refer to the same generated set.
    pub fn ptr_eq(&self, other: &StarCatalog) -> bool {
        Arc::ptr_eq(&self.stars, &other.stars)
    }

    /// GPU upload data.
    pub fn to_instances(&self) -> Vec<StarInstance> {
        self.stars.iter().map(StarInstance::from).collect()
    }

    /// Every star's position at `time`.
    pub fn positions_at(&self, time: f32, time_scale: f32) -> Vec<Vec3> {
        self.stars
            .iter()
            .map(|s| s.position_at(time, time_scale))
            .collect()
    }
}

/// Cumulative distribution of star radii.
#[derive(Clone, Debug)]
pub struct RadialCdf {
    cdf: Vec<f32>,
    radius: f32,
}

impl RadialCdf {
    /// Build from the angularly averaged surface density of `model`.
    ///
    /// Falls back to a uniform-in-area distribution if the density integrates
    /// to zero or a non-finite value.
    pub fn build(model: &DensityModel, bins: usize, angular_samples: usize) -> Self {
        let bins = bins.max(1);
        let angular_samples = angular_samples.max(1);
        let radius = model.galactic_radius;

        let mut weights: Vec<f32> = (0..bins)
            .map(|i| {
                let r = i as f32 / bins as f32 * radius;
                let sum: f32 = (0..angular_samples)
                    .map(|j| {
                        let theta = std::f32::consts::TAU * j as f32 / angular_samples as f32;
                        model.surface_density(r, theta)
                    })
                    .sum();
                sanitize(sum / angular_samples as f32 * r).max(0.0)
            })
            .collect();

        let total: f32 = weights.iter().sum();
        if !(total.is_finite() && total > 0.0) {
            log::warn!("radial density integrates to {total}, falling back to uniform area sampling");
            weights = (0..bins).map(|i| (i as f32 + 0.5) / bins as f32).collect();
        }

        let mut acc = 0.0;
        let mut cdf: Vec<f32> = weights
            .iter()
            .map(|w| {
                acc += w;
                acc
            })
            .collect();
        let total = acc;
        for c in &mut cdf {
            *c /= total;
        }
        if let Some(last) = cdf.last_mut() {
            *last = 1.0;
        }
        Self { cdf, radius }
    }

    /// The normalized cumulative weights, one per bin.
    pub fn values(&self) -> &[f32] {
        &self.cdf
    }

    /// Invert the CDF: `u` picks the bin, `v` the position inside it.
    pub fn sample(&self, u: f32, v: f32) -> f32 {
        let bins = self.cdf.len();
        let index = self.cdf.partition_point(|&c| c < u).min(bins - 1);
        ((index as f32 + v) / bins as f32 * self.radius).clamp(0.0, self.radius)
    }
}

/// Tunable constants of the star sampler.
#[derive(Clone, Debug, PartialEq)]
pub struct StarSamplerConfig {
    /// Radial CDF resolution.
    pub radial_bins: usize,
    /// Angular samples per bin.
    pub angular_samples: usize,
    /// Extra candidate angles per field star.
    pub rejection_attempts: u32,
    /// Arm factor that qualifies a candidate for early acceptance.
    pub accept_threshold: f32,
}

impl Default for StarSamplerConfig {
    fn default() -> Self {
        Self {
            radial_bins: RADIAL_BINS,
            angular_samples: ANGULAR_SAMPLES,
            rejection_attempts: ARM_REJECTION_ATTEMPTS,
            accept_threshold: ARM_ACCEPT_THRESHOLD,
        }
    }
}

impl StarSamplerConfig {
    /// Set the number of extra candidate angles.
    pub fn with_rejection_attempts(mut self, attempts: u32) -> Self {
        self.rejection_attempts = attempts;
        self
    }

    /// Set the CDF resolution.
    pub fn with_radial_bins(mut self, bins: usize) -> Self {
        self.radial_bins = bins.max(1);
        self
    }
}

/// Jitter radius used when a star snaps to `cluster`.
#[inline]
pub fn jitter_scale(cluster: &ClusterCenter) -> f32 {
    CLUSTER_JITTER_FRACTION * cluster.radius
}

/// Draws stars for one parameter set.
pub struct StarSampler<'a> {
    params: &'a GalaxyParams,
    clusters: &'a [ClusterCenter],
    model: DensityModel,
    cdf: RadialCdf,
    config: StarSamplerConfig,
}

impl<'a> StarSampler<'a> {
    /// Sampler with default tuning.
    pub fn new(params: &'a GalaxyParams, clusters: &'a [ClusterCenter]) -> Self {
        Self::with_config(params, clusters, StarSamplerConfig::default())
    }

    /// Sampler with custom tuning.
    pub fn with_config(
        params: &'a GalaxyParams,
        clusters: &'a [ClusterCenter],
        config: StarSamplerConfig,
    ) -> Self {
        let model = DensityModel::from_params(params);
        let cdf = RadialCdf::build(&model, config.radial_bins, config.angular_samples);
        Self {
            params,
            clusters,
            model,
            cdf,
            config,
        }
    }

    /// The radial CDF in use.
    pub fn cdf(&self) -> &RadialCdf {
        &self.cdf
    }

    /// Draw one star.
    pub fn sample(&self, rng: &mut SampleRng) -> StarRecord {
        let radius = self.params.galactic_radius;
        let limit = self.params.height_limit();

        let (r, theta0, z) = if !self.clusters.is_empty() && rng.chance(self.params.cluster_influence) {
            let cluster = &self.clusters[rng.random_index(self.clusters.len())];
            self.cluster_position(cluster, rng)
        } else {
            self.field_position(rng)
        };

        let r = sanitize(r).clamp(0.0, radius);
        let z = sanitize(z).clamp(-limit, limit);
        let theta0 = sanitize(theta0);

        let star_type = StarType::ALL[rng.weighted_index(StarType::weights_for(r / radius))];
        let info = star_type.info();
        let color = rng.color_between(info.color_min, info.color_max);
        let luminosity = rng.random_range(info.luminosity.0, info.luminosity.1);
        let size = ((0.3 + luminosity * 0.25) * info.size_scale).clamp(0.15, 3.0)
            * self.params.star_size
            * SIZE_MULTIPLIER;

        StarRecord {
            r,
            theta0,
            z,
            star_type,
            color,
            size,
        }
    }

    /// Polar position near a cluster centre, within [`jitter_scale`] of it.
    fn cluster_position(&self, cluster: &ClusterCenter, rng: &mut SampleRng) -> (f32, f32, f32) {
        let jitter = jitter_scale(cluster);
        let rc = cluster.planar_radius();
        let r = (rc + rng.centered(0.6 * jitter)).max(0.0);
        // Angular jitter scaled so the arc length stays below 0.3 jitter.
        let arc_radius = (rc + 0.3 * jitter).max(jitter).max(f32::EPSILON);
        let theta = cluster.angle() + rng.centered(0.6 * jitter) / arc_radius;
        let z = cluster.position.z + rng.centered(0.6 * jitter);
        (r, theta, z)
    }

    /// Polar position of a field star.
    fn field_position(&self, rng: &mut SampleRng) -> (f32, f32, f32) {
        let r = self.cdf.sample(rng.random(), rng.random());

        let mut theta = rng.angle();
        let mut best = self.model.arm_factor(r, theta);
        for _ in 0..self.config.rejection_attempts {
            let candidate = rng.angle();
            let factor = self.model.arm_factor(r, candidate);
            if factor > best {
                best = factor;
                theta = candidate;
            }
            if factor > self.config.accept_threshold && rng.chance(ARM_EARLY_ACCEPT_CHANCE) {
                break;
            }
        }

        let z = self.field_height(r, best, rng);
        (r, theta, z)
    }

    /// sech² height with a bulge-aware flaring scale, compressed on the arms.
    fn field_height(&self, r: f32, arm_factor: f32, rng: &mut SampleRng) -> f32 {
        let nr = r / self.params.galactic_radius.max(f32::EPSILON);
        let base = self.params.vertical_scale_height_world();
        let bulge = self.params.bulge_radius;
        let local = if nr < 2.0 * bulge {
            base * (1.0 + 0.5 * (-nr / (2.0 * bulge).max(f32::EPSILON)).exp())
        } else {
            base * (0.8 + 0.2 * nr)
        };

        let mut z = (rng.sech2(0.001) * local * 0.3).clamp(-2.5 * local, 2.5 * local);
        if arm_factor > 0.3 {
            z *= 1.0 - 0.6 * arm_factor;
        }
        z
    }
}

/// Generate exactly `params.num_stars` stars.
pub fn generate_stars(
    params: &GalaxyParams,
    clusters: &[ClusterCenter],
    rng: &mut SampleRng,
) -> StarCatalog {
    let sampler = StarSampler::new(params, clusters);
    let stars: Vec<StarRecord> = (0..params.num_stars).map(|_| sampler.sample(rng)).collect();
    log::debug!("sampled {} stars", stars.len());
    StarCatalog::new(stars)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clusters::{generate_clusters, ClusterSpec};

    fn small_params() -> GalaxyParams {
        GalaxyParams::default().with_num_stars(2000).with_seed(5)
    }

    fn clusters_for(params: &GalaxyParams) -> Vec<ClusterCenter> {
        let mut rng = SampleRng::seeded(1);
        generate_clusters(&ClusterSpec::from_params(params), &mut rng)
    }

    #[test]
    fn test_cdf_monotone_and_normalized() {
        let model = DensityModel::from_params(&GalaxyParams::default());
        let cdf = RadialCdf::build(&model, RADIAL_BINS, ANGULAR_SAMPLES);
        let values = cdf.values();
        assert_eq!(values.len(), RADIAL_BINS);
        assert!(values.windows(2).all(|w| w[1] >= w[0]));
        assert_eq!(*values.last().unwrap(), 1.0);
        assert_eq!(values[0], 0.0);
    }

    #[test]
    fn test_cdf_degenerate_density_falls_back() {
        let mut model = DensityModel::from_params(&GalaxyParams::default());
        model.galactic_radius = 0.0;
        let cdf = RadialCdf::build(&model, 100, 4);
        assert!(cdf.values().iter().all(|c| c.is_finite()));
        assert_eq!(*cdf.values().last().unwrap(), 1.0);
    }

    #[test]
    fn test_cdf_sample_bounds() {
        let model = DensityModel::from_params(&GalaxyParams::default());
        let cdf = RadialCdf::build(&model, 200, 8);
        let radius = model.galactic_radius;
        for &(u, v) in &[(0.0, 0.0), (1.0, 1.0), (0.5, 0.5), (0.999_999, 0.99)] {
            let r = cdf.sample(u, v);
            assert!((0.0..=radius).contains(&r));
        }
    }

    #[test]
    fn test_no_arm_boost_matches_plain_profile() {
        let params = GalaxyParams::default().with_arm_density_multiplier(0.0);
        let model = DensityModel::from_params(&params);
        let cdf = RadialCdf::build(&model, 500, 16);

        let weights: Vec<f32> = (0..500)
            .map(|i| {
                let r = i as f32 / 500.0 * params.galactic_radius;
                model.base_density(r) * r
            })
            .collect();
        let total: f32 = weights.iter().sum();
        let mut acc = 0.0;
        for (i, w) in weights.iter().enumerate() {
            acc += w;
            assert!((cdf.values()[i] - acc / total).abs() < 1e-4);
        }

        let twisted = params.clone().with_pitch(35.0).with_arm_shape(1.0, 0.1);
        let other = RadialCdf::build(&DensityModel::from_params(&twisted), 500, 16);
        for (a, b) in cdf.values().iter().zip(other.values()) {
            assert!((a - b).abs() < 1e-5);
        }
    }

    #[test]
    fn test_exact_star_count() {
        let params = small_params();
        let clusters = clusters_for(&params);
        let mut rng = SampleRng::seeded(2);
        let catalog = generate_stars(&params, &clusters, &mut rng);
        assert_eq!(catalog.len(), 2000);
        assert_eq!(catalog.to_instances().len(), 2000);
    }

    #[test]
    fn test_star_bounds() {
        let params = small_params().with_cluster_influence(0.5);
        let clusters = clusters_for(&params);
        let mut rng = SampleRng::seeded(3);
        let catalog = generate_stars(&params, &clusters, &mut rng);
        let limit = params.height_limit();
        for star in catalog.stars() {
            assert!(star.r >= 0.0 && star.r <= params.galactic_radius);
            assert!(star.z.abs() <= limit);
            assert!(star.size > 0.0);
            assert!(star.theta0.is_finite());
        }
    }

    #[test]
    fn test_no_clusters_means_field_stars_only() {
        let params = small_params().with_cluster_influence(1.0);
        let mut rng = SampleRng::seeded(4);
        let catalog = generate_stars(&params, &[], &mut rng);
        assert_eq!(catalog.len(), 2000);
    }

    #[test]
    fn test_full_cluster_influence_stays_near_clusters() {
        let params = small_params().with_cluster_influence(1.0);
        let clusters = clusters_for(&params);
        let mut rng = SampleRng::seeded(6);
        let catalog = generate_stars(&params, &clusters, &mut rng);
        for star in catalog.stars() {
            let p = star.position_at(0.0, 0.0);
            assert!(clusters
                .iter()
                .any(|c| p.distance(c.position) <= jitter_scale(c) + 1e-4));
        }
    }

    #[test]
    fn test_zero_rejection_attempts_still_terminates() {
        let params = small_params().with_cluster_influence(0.0);
        let sampler = StarSampler::with_config(
            &params,
            &[],
            StarSamplerConfig::default().with_rejection_attempts(0),
        );
        let mut rng = SampleRng::seeded(7);
        for _ in 0..100 {
            assert!(sampler.sample(&mut rng).r.is_finite());
        }
    }

    #[test]
    fn test_type_weights_shift_outward() {
        // Outer discs hold fewer O/B stars and more K/M stars.
        assert!(OUTER_TYPE_WEIGHTS[0] < INNER_TYPE_WEIGHTS[0]);
        assert!(OUTER_TYPE_WEIGHTS[6] > INNER_TYPE_WEIGHTS[6]);
        for table in [&INNER_TYPE_WEIGHTS, &MIDDLE_TYPE_WEIGHTS] {
            assert!((table.iter().sum::<f32>() - 1.0).abs() < 1e-3);
        }
        assert!((OUTER_TYPE_WEIGHTS.iter().sum::<f32>() - 1.025).abs() < 1e-3);
        assert!(std::ptr::eq(StarType::weights_for(0.1), &INNER_TYPE_WEIGHTS));
        assert!(std::ptr::eq(StarType::weights_for(0.5), &MIDDLE_TYPE_WEIGHTS));
        assert!(std::ptr::eq(StarType::weights_for(0.9), &OUTER_TYPE_WEIGHTS));
    }

    #[test]
    fn test_outer_type_mix_matches_normalized_weights() {
        let mut rng = SampleRng::seeded(31);
        let draws = 200_000;
        let mut counts = [0u32; 10];
        for _ in 0..draws {
            counts[rng.weighted_index(&OUTER_TYPE_WEIGHTS)] += 1;
        }
        let total: f32 = OUTER_TYPE_WEIGHTS.iter().sum();
        for (i, (&count, &w)) in counts.iter().zip(&OUTER_TYPE_WEIGHTS).enumerate() {
            let share = count as f32 / draws as f32;
            let expected = w / total;
            assert!(
                (share - expected).abs() < 0.005,
                "{:?}: {share:.4} vs {expected:.4}",
                StarType::ALL[i]
            );
        }
        // The last entry is reachable even though the table overshoots 1.
        let brown = counts[9] as f32 / draws as f32;
        assert!((brown - 0.02 / 1.025).abs() < 0.003);
        let white = counts[8] as f32 / draws as f32;
        assert!((white - 0.05 / 1.025).abs() < 0.003);
    }

    #[test]
    fn test_colors_within_type_range() {
        let params = small_params();
        let mut rng = SampleRng::seeded(8);
        let catalog = generate_stars(&params, &[], &mut rng);
        for star in catalog.stars() {
            let info = star.star_type.info();
            assert!(star.color.cmpge(info.color_min - 1e-6).all());
            assert!(star.color.cmple(info.color_max + 1e-6).all());
        }
    }

    #[test]
    fn test_instance_layout() {
        assert_eq!(std::mem::size_of::<StarInstance>(), 32);
        let star = StarRecord {
            r: 1.0,
            theta0: 2.0,
            z: 3.0,
            star_type: StarType::G,
            color: Vec3::ONE,
            size: 0.5,
        };
        let inst = StarInstance::from(&star);
        assert_eq!(inst.init_pos, [1.0, 2.0, 3.0]);
        assert_eq!(inst.size, 0.5);
    }
}
