//! Voxelized gas and dust density.
//!
//! The density field is a regular `S×S×S` grid of `(density, temperature)`
//! pairs covering a box centred on the origin: the XY half-extent is the
//! galactic radius and the Z half-extent is half of that. It is baked once per
//! parameter change (usually on a background thread, see
//! [`builder`](crate::builder)) and then sampled by the raymarcher at
//! co-rotated positions, so it never needs re-baking as the galaxy turns.
//!
//! # Layout
//!
//! The flat buffer is row-major by `x + y·S + z·S²`, two floats per cell:
//!
//! ```text
//! data[2 * idx]     = density      (>= 0, at most MAX_DENSITY)
//! data[2 * idx + 1] = temperature  (0..=1)
//! ```
//!
//! # Memory Usage
//!
//! - 64³ = 2MB
//! - 128³ = 16MB
//! - 256³ = 128MB

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

use glam::{UVec3, Vec3};
use rayon::prelude::*;

use crate::clusters::{total_influence, ClusterCenter};
use crate::density::{sanitize, SpiralArms, EPSILON};
use crate::error::BuildError;
use crate::noise::{fbm3_unit, FIELD_OCTAVES};
use crate::params::GalaxyParams;

/// Floats stored per voxel.
pub const CHANNELS: usize = 2;
/// Upper clamp on voxel density.
pub const MAX_DENSITY: f32 = 8.0;
/// Displacement of the noise lookup along the arm tangent, scaled by arm membership.
const ARM_NOISE_STREAK: f32 = 2.0;
/// Radius (fraction of R) inside which the bulge boost applies.
const BULGE_BOOST_FRACTION: f32 = 0.2;
/// Exponential scale (fraction of R) of the bulge boost.
const BULGE_BOOST_SCALE: f32 = 0.08;

/// Axis-aligned world box covered by a field.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FieldBounds {
    /// Minimum corner.
    pub min: Vec3,
    /// Maximum corner.
    pub max: Vec3,
}

impl FieldBounds {
    /// Box for a galaxy of radius `radius`: ±R in XY, ±R/2 in Z.
    pub fn for_radius(radius: f32) -> Self {
        let half = Vec3::new(radius, radius, radius * 0.5);
        Self {
            min: -half,
            max: half,
        }
    }

    /// Edge lengths.
    #[inline]
    pub fn size(&self) -> Vec3 {
        self.max - self.min
    }

    /// Whether `p` lies inside (inclusive).
    #[inline]
    pub fn contains(&self, p: Vec3) -> bool {
        p.cmpge(self.min).all() && p.cmple(self.max).all()
    }

    /// Slab test. Returns the entry and exit distances along the ray, with the
    /// entry clamped to zero, or `None` on a miss.
    pub fn intersect_ray(&self, origin: Vec3, dir: Vec3) -> Option<(f32, f32)> {
        let inv = dir.recip();
        let t1 = (self.min - origin) * inv;
        let t2 = (self.max - origin) * inv;
        let tmin = t1.min(t2);
        let tmax = t1.max(t2);
        let t_enter = tmin.max_element().max(0.0);
        let t_exit = tmax.min_element();
        if t_enter.is_nan() || t_exit.is_nan() || t_enter > t_exit {
            None
        } else {
            Some((t_enter, t_exit))
        }
    }
}

/// Parameters of the gas distribution, authored the same way as [`GalaxyParams`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FieldBoxParams {
    /// World radius.
    pub galactic_radius: f32,
    /// Vertical scale height, fraction of the radius.
    pub vertical_scale_height: f32,
    /// Disc scale length, fraction of the radius.
    pub disc_scale_length: f32,
    /// Number of arms.
    pub spiral_arms: u32,
    /// Pitch angle in degrees.
    pub spiral_pitch_angle: f32,
    /// Spiral base radius, world units.
    pub base_radius: f32,
    /// Arm width, world units.
    pub arm_width: f32,
    /// On-arm density boost.
    pub arm_density_multiplier: f32,
}

impl FieldBoxParams {
    /// Subset of `params` the field depends on.
    pub fn from_params(params: &GalaxyParams) -> Self {
        Self {
            galactic_radius: params.galactic_radius,
            vertical_scale_height: params.vertical_scale_height,
            disc_scale_length: params.disc_scale_length,
            spiral_arms: params.spiral_arms,
            spiral_pitch_angle: params.spiral_pitch_angle,
            base_radius: params.base_radius,
            arm_width: params.arm_width,
            arm_density_multiplier: params.arm_density_multiplier,
        }
    }

    /// Arm geometry.
    pub fn arms(&self) -> SpiralArms {
        SpiralArms {
            count: self.spiral_arms,
            base_radius: self.base_radius,
            pitch: self.spiral_pitch_angle.to_radians(),
            width: self.arm_width,
        }
    }
}

/// Everything a field build needs; sent to the background builder.
#[derive(Clone, Debug)]
pub struct FieldBuildRequest {
    /// Voxels per axis.
    pub grid_size: u32,
    /// Gas distribution.
    pub box_params: FieldBoxParams,
    /// Noise frequency.
    pub noise_scale: f32,
    /// Shared cluster snapshot.
    pub clusters: Arc<[ClusterCenter]>,
}

impl FieldBuildRequest {
    /// Request for `params` with the given cluster snapshot.
    pub fn from_params(params: &GalaxyParams, clusters: Arc<[ClusterCenter]>) -> Self {
        Self {
            grid_size: params.density_grid_size,
            box_params: FieldBoxParams::from_params(params),
            noise_scale: params.noise_scale,
            clusters,
        }
    }

    /// World box the field will cover.
    pub fn bounds(&self) -> FieldBounds {
        FieldBounds::for_radius(self.box_params.galactic_radius)
    }
}

/// Raw output of a build: `grid_size³ × 2` floats.
#[derive(Debug)]
pub struct FieldBuildResult {
    /// Voxels per axis.
    pub grid_size: u32,
    /// Interleaved `(density, temperature)` values.
    pub data: Vec<f32>,
}

/// Per-voxel evaluation with request-derived constants hoisted out.
pub struct VoxelModel<'a> {
    arms: SpiralArms,
    radius: f32,
    vertical_scale: f32,
    disc_scale: f32,
    arm_density_multiplier: f32,
    noise_scale: f32,
    clusters: &'a [ClusterCenter],
}

impl<'a> VoxelModel<'a> {
    /// Model for one request.
    pub fn new(request: &'a FieldBuildRequest) -> Self {
        let p = &request.box_params;
        Self {
            arms: p.arms(),
            radius: p.galactic_radius,
            vertical_scale: (p.vertical_scale_height * p.galactic_radius).max(EPSILON),
            disc_scale: (p.disc_scale_length * p.galactic_radius).max(EPSILON),
            arm_density_multiplier: p.arm_density_multiplier,
            noise_scale: request.noise_scale,
            clusters: &request.clusters,
        }
    }

    /// `(density, temperature)` at world position `p`.
    ///
    /// Noise is looked up at `p` displaced along the circular tangent by
    /// `2 * arm`, so streaks line up with the arms. Temperature runs cooler on
    /// the arms (dusty) and warmer between them.
    pub fn evaluate(&self, p: Vec3) -> (f32, f32) {
        let r = p.truncate().length();
        let theta = p.y.atan2(p.x);
        let arm = self.arms.factor(r, theta);

        let warped = p + SpiralArms::tangent(theta) * arm * ARM_NOISE_STREAK;
        let noise = fbm3_unit(warped * self.noise_scale, FIELD_OCTAVES);

        let arm_gain = 1.0 + (self.arm_density_multiplier - 1.0) * arm;
        let cluster = total_influence(self.clusters, p);
        let disc = (-p.z.abs() / self.vertical_scale).exp() * (-r / self.disc_scale).exp();
        let bulge = if r < BULGE_BOOST_FRACTION * self.radius {
            1.0 + 0.5 * (-r / (BULGE_BOOST_SCALE * self.radius).max(EPSILON)).exp()
        } else {
            1.0
        };

        let density = 2.0 * noise * disc * bulge * arm_gain * (0.4 + 1.6 * cluster);
        let temperature = 0.7 + (0.35 - 0.7) * arm + 0.15 * noise + 0.15 * cluster;

        (
            sanitize(density).clamp(0.0, MAX_DENSITY),
            sanitize(temperature).clamp(0.0, 1.0),
        )
    }
}

/// Voxelize `request`. Runs data-parallel over z-slices.
///
/// `cancel` is polled once per slice; once it is set the build stops early
/// and returns [`BuildError::Cancelled`].
pub fn build_density_field(
    request: &FieldBuildRequest,
    cancel: &AtomicBool,
) -> Result<FieldBuildResult, BuildError> {
    let start = Instant::now();
    let size = request.grid_size.max(1) as usize;
    let bounds = request.bounds();
    let cell = bounds.size() / size as f32;
    let model = VoxelModel::new(request);

    let mut data = vec![0.0f32; size * size * size * CHANNELS];
    data.par_chunks_mut(size * size * CHANNELS)
        .enumerate()
        .for_each(|(z, slice)| {
            if cancel.load(Ordering::Relaxed) {
                return;
            }
            let wz = bounds.min.z + (z as f32 + 0.5) * cell.z;
            for y in 0..size {
                let wy = bounds.min.y + (y as f32 + 0.5) * cell.y;
                for x in 0..size {
                    let wx = bounds.min.x + (x as f32 + 0.5) * cell.x;
                    let (density, temperature) = model.evaluate(Vec3::new(wx, wy, wz));
                    let idx = (x + y * size) * CHANNELS;
                    slice[idx] = density;
                    slice[idx + 1] = temperature;
                }
            }
        });

    if cancel.load(Ordering::Relaxed) {
        return Err(BuildError::Cancelled);
    }
    log::debug!(
        "voxelized {}³ density field in {:.1?}",
        size,
        start.elapsed()
    );
    Ok(FieldBuildResult {
        grid_size: size as u32,
        data,
    })
}

/// Summary statistics of a field.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct FieldStats {
    /// Cells with density above zero.
    pub non_zero: usize,
    /// Largest density.
    pub max_density: f32,
    /// Mean density.
    pub mean_density: f32,
}

/// A published density field.
#[derive(Clone, Debug)]
pub struct DensityField {
    grid_size: u32,
    bounds: FieldBounds,
    data: Vec<f32>,
}

impl DensityField {
    /// Wrap a finished build. Non-finite or out-of-range values are sanitized.
    ///
    /// Fails with [`BuildError::FieldSize`] when `data` does not hold exactly
    /// two channels per voxel.
    pub fn from_result(result: FieldBuildResult, bounds: FieldBounds) -> Result<Self, BuildError> {
        let FieldBuildResult { grid_size, data } = result;
        let expected = (grid_size as usize).pow(3) * CHANNELS;
        if data.len() != expected {
            return Err(BuildError::FieldSize {
                expected,
                actual: data.len(),
            });
        }
        Ok(Self::sanitized(grid_size, bounds, data))
    }

    fn sanitized(grid_size: u32, bounds: FieldBounds, mut data: Vec<f32>) -> Self {
        for pair in data.chunks_exact_mut(CHANNELS) {
            pair[0] = sanitize(pair[0]).clamp(0.0, MAX_DENSITY);
            pair[1] = sanitize(pair[1]).clamp(0.0, 1.0);
        }
        Self {
            grid_size,
            bounds,
            data,
        }
    }

    /// A field of all-zero cells.
    pub fn zeros(grid_size: u32, bounds: FieldBounds) -> Self {
        let cells = (grid_size as usize).pow(3);
        Self {
            grid_size,
            bounds,
            data: vec![0.0; cells * CHANNELS],
        }
    }

    /// A field whose cells are filled by `f(center)`.
    pub fn from_fn(grid_size: u32, bounds: FieldBounds, f: impl Fn(Vec3) -> (f32, f32)) -> Self {
        let size = grid_size as usize;
        let cell = bounds.size() / size as f32;
        let mut data = Vec::with_capacity(size * size * size * CHANNELS);
        for z in 0..size {
            for y in 0..size {
                for x in 0..size {
                    let center = bounds.min + (Vec3::new(x as f32, y as f32, z as f32) + 0.5) * cell;
                    let (d, t) = f(center);
                    data.push(d);
                    data.push(t);
                }
            }
        }
        Self::sanitized(grid_size, bounds, data)
    }

    /// Voxels per axis.
    pub fn grid_size(&self) -> u32 {
        self.grid_size
    }

    /// World box.
    pub fn bounds(&self) -> FieldBounds {
        self.bounds
    }

    /// Raw interleaved buffer (for GPU upload).
    pub fn as_slice(&self) -> &[f32] {
        &self.data
    }

    /// Flat cell index.
    #[inline]
    pub fn index(&self, cell: UVec3) -> usize {
        let s = self.grid_size as usize;
        cell.x as usize + cell.y as usize * s + cell.z as usize * s * s
    }

    /// `(density, temperature)` of one cell.
    #[inline]
    pub fn cell(&self, cell: UVec3) -> (f32, f32) {
        let i = self.index(cell) * CHANNELS;
        (self.data[i], self.data[i + 1])
    }

    /// Trilinear `(density, temperature)` at `p`, interpolating between voxel
    /// centres. Zero outside the box.
    pub fn sample(&self, p: Vec3) -> (f32, f32) {
        if self.grid_size == 0 || !self.bounds.contains(p) {
            return (0.0, 0.0);
        }
        let s = self.grid_size;
        let max_index = (s - 1) as f32;
        let g = ((p - self.bounds.min) / self.bounds.size() * s as f32 - 0.5)
            .clamp(Vec3::ZERO, Vec3::splat(max_index));
        let i0 = g.floor();
        let f = g - i0;
        let c0 = i0.as_uvec3();
        let c1 = (c0 + UVec3::ONE).min(UVec3::splat(s - 1));

        let at = |x: u32, y: u32, z: u32| self.cell(UVec3::new(x, y, z));
        let lerp = |a: (f32, f32), b: (f32, f32), t: f32| {
            (a.0 + (b.0 - a.0) * t, a.1 + (b.1 - a.1) * t)
        };

        let v00 = lerp(at(c0.x, c0.y, c0.z), at(c1.x, c0.y, c0.z), f.x);
        let v10 = lerp(at(c0.x, c1.y, c0.z), at(c1.x, c1.y, c0.z), f.x);
        let v01 = lerp(at(c0.x, c0.y, c1.z), at(c1.x, c0.y, c1.z), f.x);
        let v11 = lerp(at(c0.x, c1.y, c1.z), at(c1.x, c1.y, c1.z), f.x);
        let v0 = lerp(v00, v10, f.y);
        let v1 = lerp(v01, v11, f.y);
        lerp(v0, v1, f.z)
    }

    /// Density-only convenience lookup.
    #[inline]
    pub fn density_at(&self, p: Vec3) -> f32 {
        self.sample(p).0
    }

    /// Whether every cell is empty.
    pub fn is_empty(&self) -> bool {
        self.data.chunks_exact(CHANNELS).all(|c| c[0] <= 0.0)
    }

    /// Summary statistics.
    pub fn stats(&self) -> FieldStats {
        let cells = self.data.len() / CHANNELS;
        if cells == 0 {
            return FieldStats::default();
        }
        let (non_zero, max, sum) = self
            .data
            .par_chunks_exact(CHANNELS)
            .map(|c| ((c[0] > 0.0) as usize, c[0], c[0] as f64))
            .reduce(
                || (0, 0.0f32, 0.0f64),
                |a, b| (a.0 + b.0, a.1.max(b.1), a.2 + b.2),
            );
        FieldStats {
            non_zero,
            max_density: max,
            mean_density: (sum / cells as f64) as f32,
        }
    }
}
