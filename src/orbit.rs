//! Differential rotation.
//!
//! The only place rotation is defined. Stars keep their initial angle and are
//! rotated by [`current_angle`] each frame; the raymarcher rotates sample
//! points the *opposite* way with [`corotate_sample_point`] so the static voxel
//! grid appears to turn with them. The WGSL twin of these functions is
//! generated from the same constants in
//! [`shader_utils::orbit_wgsl`](crate::shader_utils::orbit_wgsl).

use glam::Vec3;

/// Tuned gravitational parameter.
pub const GM: f32 = 4.3e-6;
/// Radii below this use the angular velocity at this radius.
pub const MIN_RADIUS: f32 = 0.01;

/// Keplerian angular velocity `sqrt(GM / r^3)`.
#[inline]
pub fn angular_velocity(r: f32) -> f32 {
    let r = r.max(MIN_RADIUS);
    (GM / (r * r * r)).sqrt()
}

/// Angle swept at radius `r` after `time` seconds.
#[inline]
pub fn orbit_angle(r: f32, time: f32, time_scale: f32) -> f32 {
    angular_velocity(r) * time * time_scale
}

/// Displayed angle of a star with initial angle `theta0`.
#[inline]
pub fn current_angle(r: f32, theta0: f32, time: f32, time_scale: f32) -> f32 {
    theta0 - orbit_angle(r, time, time_scale)
}

/// Cartesian position of a star at `time`.
#[inline]
pub fn star_position(r: f32, theta0: f32, z: f32, time: f32, time_scale: f32) -> Vec3 {
    let theta = current_angle(r, theta0, time, time_scale);
    Vec3::new(r * theta.cos(), r * theta.sin(), z)
}

/// Rotate a world-space point by `+omega(r) t` about the galactic axis.
///
/// Maps a point of the rotating scene back onto the voxel grid that was
/// built at `t = 0`.
pub fn corotate_sample_point(p: Vec3, time: f32, time_scale: f32) -> Vec3 {
    let r = p.truncate().length();
    let (s, c) = orbit_angle(r, time, time_scale).sin_cos();
    Vec3::new(p.x * c - p.y * s, p.x * s + p.y * c, p.z)
}
