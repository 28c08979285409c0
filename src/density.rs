//! Analytic galaxy density model.
//!
//! Pure functions of a disc location `(r, theta)`: an exponential disc, a
//! Sérsic-like central bulge and a set of logarithmic spiral arms. Both the
//! star sampler and the field builder query the same [`SpiralArms`] geometry,
//! which is what keeps stars and gas spatially correlated.
//!
//! ```ignore
//! let model = DensityModel::from_params(&GalaxyParams::default());
//! let rho = model.surface_density(1.5, 0.3);
//! ```

use std::f32::consts::{PI, TAU};

use glam::Vec3;

use crate::params::GalaxyParams;

/// Weight of the bulge relative to the disc in the surface density.
pub const BULGE_WEIGHT: f32 = 3.0;
/// Sérsic index of the bulge profile.
pub const SERSIC_INDEX: f32 = 2.0;
/// Floor applied to every denominator.
pub const EPSILON: f32 = 1e-6;
/// Inside this fraction of the base radius the spiral is evaluated at the clamp.
pub const ARM_INNER_CLAMP: f32 = 0.5;

/// Wrap an angle into `(-PI, PI]`.
#[inline]
pub fn wrap_angle(angle: f32) -> f32 {
    let wrapped = (angle + PI).rem_euclid(TAU) - PI;
    if wrapped <= -PI {
        wrapped + TAU
    } else {
        wrapped
    }
}

/// Map non-finite values to zero.
#[inline]
pub fn sanitize(value: f32) -> f32 {
    if value.is_finite() {
        value
    } else {
        0.0
    }
}

/// Logarithmic spiral arm geometry.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SpiralArms {
    /// Number of arms.
    pub count: u32,
    /// Radius where each arm starts.
    pub base_radius: f32,
    /// Pitch angle in radians.
    pub pitch: f32,
    /// Gaussian width of the arm profile.
    pub width: f32,
}

impl SpiralArms {
    /// Arm geometry described by `params`.
    pub fn from_params(params: &GalaxyParams) -> Self {
        Self {
            count: params.spiral_arms,
            base_radius: params.base_radius,
            pitch: params.pitch_radians(),
            width: params.arm_width,
        }
    }

    /// Radius the spiral is evaluated at; keeps `ln(r / base)` finite.
    #[inline]
    pub fn safe_radius(&self, r: f32) -> f32 {
        r.max(self.base_radius * ARM_INNER_CLAMP).max(EPSILON)
    }

    /// Angle of arm `arm`'s centerline at radius `r`.
    pub fn centerline_angle(&self, r: f32, arm: u32) -> f32 {
        let tan = self.pitch.tan();
        let tan = if tan.abs() < EPSILON {
            EPSILON.copysign(tan)
        } else {
            tan
        };
        let base = self.base_radius.max(EPSILON);
        let offset = TAU * arm as f32 / self.count.max(1) as f32;
        (self.safe_radius(r) / base).ln() / tan + offset
    }

    /// Arc-length distance from `(r, theta)` to the nearest arm centerline.
    pub fn nearest_distance(&self, r: f32, theta: f32) -> f32 {
        let rs = self.safe_radius(r);
        (0..self.count.max(1))
            .map(|arm| rs * wrap_angle(theta - self.centerline_angle(r, arm)).abs())
            .fold(f32::INFINITY, f32::min)
    }

    /// Gaussian arm membership in `[0, 1]`; 1 on a centerline.
    pub fn factor(&self, r: f32, theta: f32) -> f32 {
        let d = self.nearest_distance(r, theta);
        let w = self.width.max(EPSILON);
        sanitize((-(d * d) / (2.0 * w * w)).exp())
    }

    /// Unit tangent of the circle through angle `theta`, used to streak noise along the arms.
    #[inline]
    pub fn tangent(theta: f32) -> Vec3 {
        Vec3::new(-theta.sin(), theta.cos(), 0.0)
    }
}

/// Disc + bulge + arm surface density.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DensityModel {
    /// World radius of the disc.
    pub galactic_radius: f32,
    /// Disc scale length in world units.
    pub disc_scale_length: f32,
    /// Bulge radius in world units.
    pub bulge_radius: f32,
    /// Spiral arm geometry.
    pub arms: SpiralArms,
    /// On-arm density boost.
    pub arm_density_multiplier: f32,
}

impl DensityModel {
    /// Model described by `params`, with fractional lengths converted to world units.
    pub fn from_params(params: &GalaxyParams) -> Self {
        Self {
            galactic_radius: params.galactic_radius,
            disc_scale_length: params.disc_scale_length_world(),
            bulge_radius: params.bulge_radius_world(),
            arms: SpiralArms::from_params(params),
            arm_density_multiplier: params.arm_density_multiplier,
        }
    }

    /// Exponential disc profile.
    #[inline]
    pub fn disc_term(&self, r: f32) -> f32 {
        (-r / self.disc_scale_length.max(EPSILON)).exp()
    }

    /// Sérsic bulge profile, zero outside the bulge radius.
    pub fn bulge_term(&self, r: f32) -> f32 {
        if r >= self.bulge_radius {
            return 0.0;
        }
        let b = 2.0 * SERSIC_INDEX - 1.0 / 3.0;
        let effective = (0.5 * self.bulge_radius).max(EPSILON);
        sanitize((-b * ((r.max(0.0) / effective).powf(1.0 / SERSIC_INDEX) - 1.0)).exp())
    }

    /// Arm membership at `(r, theta)`.
    #[inline]
    pub fn arm_factor(&self, r: f32, theta: f32) -> f32 {
        self.arms.factor(r, theta)
    }

    /// Density without the arm boost.
    #[inline]
    pub fn base_density(&self, r: f32) -> f32 {
        self.disc_term(r) + BULGE_WEIGHT * self.bulge_term(r)
    }

    /// Combined surface density at `(r, theta)`.
    pub fn surface_density(&self, r: f32, theta: f32) -> f32 {
        let boost = 1.0 + self.arm_density_multiplier * self.arm_factor(r, theta);
        sanitize(self.base_density(r) * boost).max(0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn model() -> DensityModel {
        DensityModel::from_params(&GalaxyParams::default())
    }

    #[test]
    fn test_wrap_angle_range() {
        for i in -50..50 {
            let a = wrap_angle(i as f32 * 0.7);
            assert!(a > -PI - 1e-5 && a <= PI + 1e-5);
        }
        assert!((wrap_angle(TAU + 0.25) - 0.25).abs() < 1e-5);
        assert!((wrap_angle(-PI) - PI).abs() < 1e-5);
    }

    #[test]
    fn test_disc_term_decays() {
        let m = model();
        assert!((m.disc_term(0.0) - 1.0).abs() < 0.001);
        assert!(m.disc_term(1.0) > m.disc_term(2.0));
        let expected = (-1.0 / m.disc_scale_length).exp();
        assert!((m.disc_term(1.0) - expected).abs() < 1e-5);
    }

    #[test]
    fn test_bulge_only_inside_radius() {
        let m = model();
        assert!(m.bulge_term(0.0) > 1.0);
        assert!(m.bulge_term(m.bulge_radius * 0.5) > 0.0);
        assert_eq!(m.bulge_term(m.bulge_radius), 0.0);
        assert_eq!(m.bulge_term(m.galactic_radius), 0.0);
    }

    #[test]
    fn test_bulge_equals_one_at_effective_radius() {
        let m = model();
        let effective = 0.5 * m.bulge_radius;
        assert!((m.bulge_term(effective) - 1.0).abs() < 1e-4);
    }

    #[test]
    fn test_arm_factor_peaks_on_centerline() {
        let m = model();
        for arm in 0..m.arms.count {
            let r = 2.0;
            let theta = m.arms.centerline_angle(r, arm);
            assert!((m.arm_factor(r, theta) - 1.0).abs() < 1e-4);
        }
        let r = 2.0;
        let on = m.arms.centerline_angle(r, 0);
        let off = on + PI / 2.0;
        assert!(m.arm_factor(r, off) < m.arm_factor(r, on));
    }

    #[test]
    fn test_arm_factor_in_unit_range() {
        let m = model();
        for i in 0..100 {
            let r = i as f32 * 0.05;
            for j in 0..16 {
                let f = m.arm_factor(r, j as f32 * 0.4);
                assert!((0.0..=1.0).contains(&f));
            }
        }
    }

    #[test]
    fn test_arms_evenly_offset() {
        let arms = SpiralArms {
            count: 4,
            base_radius: 0.5,
            pitch: 0.3,
            width: 0.2,
        };
        let a0 = arms.centerline_angle(1.0, 0);
        let a1 = arms.centerline_angle(1.0, 1);
        assert!((a1 - a0 - PI / 2.0).abs() < 1e-4);
    }

    #[test]
    fn test_zero_radius_is_finite() {
        let mut m = model();
        m.arms.base_radius = 0.0;
        m.arms.width = 0.0;
        m.disc_scale_length = 0.0;
        let rho = m.surface_density(0.0, 0.0);
        assert!(rho.is_finite());
        assert!(rho >= 0.0);
    }

    #[test]
    fn test_zero_pitch_is_finite() {
        let arms = SpiralArms {
            count: 2,
            base_radius: 0.5,
            pitch: 0.0,
            width: 0.3,
        };
        assert!(arms.factor(1.0, 0.5).is_finite());
    }

    #[test]
    fn test_no_arm_boost_reduces_to_base_profile() {
        let mut m = model();
        m.arm_density_multiplier = 0.0;
        for i in 0..20 {
            let r = i as f32 * 0.2;
            assert!((m.surface_density(r, 1.0) - m.base_density(r)).abs() < 1e-6);
        }
    }

    #[test]
    fn test_tangent_is_perpendicular() {
        let theta = 0.8_f32;
        let radial = Vec3::new(theta.cos(), theta.sin(), 0.0);
        assert!(SpiralArms::tangent(theta).dot(radial).abs() < 1e-6);
    }
}
