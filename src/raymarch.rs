//! Volumetric raymarcher.
//!
//! CPU reference kernel for the nebula pass. Each pixel marches its camera
//! ray through the field box, accumulating in-scattered light from the
//! central light source and attenuating the opaque scene behind it:
//!
//! ```text
//! final = scene · transmittance_to_scene + accumulated
//! ```
//!
//! The density field is static; the galaxy's rotation is applied by sampling
//! it at [co-rotated](crate::orbit::corotate_sample_point) positions. The GPU
//! pass ([`VolumePass`](crate::gpu::VolumePass)) is a line-for-line twin of
//! this module.
//!
//! # Lighting model
//!
//! - Extinction `σt = σa + σs`, both scaled by temperature (cool = dusty)
//! - Beer-Powder step transmittance
//! - Shadow rays toward the light with geometrically growing steps
//! - Dual-lobe Henyey-Greenstein phase
//! - Hot-gas and core emission, ambient fill, multi-scatter approximation

use std::f32::consts::PI;

use glam::Vec3;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::camera::FrameCamera;
use crate::density::sanitize;
use crate::field::DensityField;
use crate::noise::{hash_u32, hash_unit};
use crate::orbit::corotate_sample_point;
use crate::params::{GalaxyParams, HexColor, MAX_RAY_MARCH_STEPS};
use crate::raster::SceneBuffers;

/// Hard cap on primary steps.
pub const MAX_STEPS: u32 = MAX_RAY_MARCH_STEPS;
/// Hard cap on shadow steps.
pub const MAX_SHADOW_STEPS: u32 = 64;
/// Densities at or below this are treated as empty space.
pub const EMPTY_SPACE_THRESHOLD: f32 = 0.001;
/// March stops once transmittance falls below this.
pub const TRANSMITTANCE_CUTOFF: f32 = 0.005;

const SHADOW_STEP_GROWTH: f32 = 1.15;
const MAX_SHADOW_OPTICAL_DEPTH: f32 = 12.0;
const DERIVATIVE_OFFSET: f32 = 0.15;
const MAX_SAMPLE_DENSITY: f32 = 1000.0;

// ============================================================================
// Configuration
// ============================================================================

/// Per-frame uniforms of the volumetric pass.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VolumeConfig {
    /// Primary march steps (at most [`MAX_STEPS`]).
    pub steps: u32,
    /// Shadow march steps (at most [`MAX_SHADOW_STEPS`]).
    pub shadow_steps: u32,
    /// Multiplier on shadow optical depth.
    pub shadow_strength: f32,
    /// Forward lobe asymmetry.
    pub phase_g: f32,
    /// Back lobe asymmetry.
    pub phase_g2: f32,
    /// Blend from the forward lobe (0) to the back lobe (1).
    pub phase_blend: f32,
    /// Weight of the multi-scatter term.
    pub multi_scatter_strength: f32,
    /// Weight of the ambient fill.
    pub ambient_density: f32,
    /// Powder darkening strength (0 = pure Beer).
    pub powder_strength: f32,
    /// Density multiplier used along shadow rays.
    pub shadow_density_scale: f32,
    /// World position of the central light.
    pub light_position: [f32; 3],
    /// Light colour before intensity.
    pub light_color: [f32; 3],
    /// Light intensity.
    pub light_intensity: f32,
    /// Absorption coefficient.
    pub absorption: f32,
    /// Scattering coefficient.
    pub scattering: f32,
    /// Multiplier applied to stored density.
    pub density_factor: f32,
    /// Nebula colour at mid temperature.
    pub cool_color: HexColor,
    /// Nebula colour at low temperature.
    pub dust_color: HexColor,
    /// Nebula colour at high temperature.
    pub warm_color: HexColor,
    /// Time multiplier for rotation.
    pub time_scale: f32,
    /// Jitter ray starts per pixel to break up banding.
    pub jitter: bool,
}

impl Default for VolumeConfig {
    fn default() -> Self {
        Self::from_params(&GalaxyParams::default())
    }
}

impl VolumeConfig {
    /// Derive the uniforms from galaxy parameters.
    pub fn from_params(params: &GalaxyParams) -> Self {
        Self {
            steps: params.clamped_ray_march_steps(),
            shadow_steps: 16,
            shadow_strength: 1.2,
            phase_g: 0.35,
            phase_g2: -0.3,
            phase_blend: 0.3,
            multi_scatter_strength: 0.35,
            ambient_density: 0.08,
            powder_strength: 0.6,
            shadow_density_scale: 1.5,
            light_position: [0.0; 3],
            light_color: [1.0, 0.9, 0.8],
            light_intensity: params.central_light_intensity,
            absorption: params.absorption_coefficient,
            scattering: params.scattering_coefficient,
            density_factor: params.density_factor,
            cool_color: params.nebula_cool_color,
            dust_color: params.nebula_dust_color,
            warm_color: params.nebula_warm_color,
            time_scale: params.orbital_time_scale,
            jitter: true,
        }
    }

    /// Set primary steps (clamped).
    pub fn with_steps(mut self, steps: u32) -> Self {
        self.steps = steps.clamp(1, MAX_STEPS);
        self
    }

    /// Set shadow steps (clamped).
    pub fn with_shadow_steps(mut self, steps: u32) -> Self {
        self.shadow_steps = steps.min(MAX_SHADOW_STEPS);
        self
    }

    /// Set absorption and scattering coefficients.
    pub fn with_coefficients(mut self, absorption: f32, scattering: f32) -> Self {
        self.absorption = absorption;
        self.scattering = scattering;
        self
    }

    /// Set the density multiplier.
    pub fn with_density_factor(mut self, factor: f32) -> Self {
        self.density_factor = factor;
        self
    }

    /// Set the light intensity.
    pub fn with_light_intensity(mut self, intensity: f32) -> Self {
        self.light_intensity = intensity;
        self
    }

    /// Set the phase lobes.
    pub fn with_phase(mut self, g: f32, g2: f32, blend: f32) -> Self {
        self.phase_g = g;
        self.phase_g2 = g2;
        self.phase_blend = blend;
        self
    }

    /// Enable or disable start jitter.
    pub fn with_jitter(mut self, jitter: bool) -> Self {
        self.jitter = jitter;
        self
    }

    /// Set the rotation time multiplier.
    pub fn with_time_scale(mut self, time_scale: f32) -> Self {
        self.time_scale = time_scale;
        self
    }

    /// Light colour times intensity.
    pub fn light_radiance(&self) -> Vec3 {
        Vec3::from(self.light_color) * self.light_intensity
    }

    /// Temperature-driven nebula colour.
    pub fn nebula_color(&self, temperature: f32) -> Vec3 {
        let (cool, dust, warm) = (self.cool_color.rgb(), self.dust_color.rgb(), self.warm_color.rgb());
        if temperature < 0.35 {
            dust.lerp(cool, smoothstep(0.05, 0.35, temperature))
        } else {
            cool.lerp(warm, smoothstep(0.35, 1.0, temperature))
        }
    }

    #[inline]
    fn absorption_at(&self, density: f32, temperature: f32) -> f32 {
        let dust = 1.0 - temperature.clamp(0.0, 1.0);
        self.absorption * density * mix(0.45, 1.65, dust)
    }

    #[inline]
    fn scattering_at(&self, density: f32, temperature: f32) -> f32 {
        let gas = temperature.clamp(0.0, 1.0);
        self.scattering * density * mix(0.55, 1.15, gas)
    }
}

// ============================================================================
// Optics
// ============================================================================

#[inline]
fn mix(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

/// Hermite step, as in shading languages.
#[inline]
pub fn smoothstep(edge0: f32, edge1: f32, x: f32) -> f32 {
    let t = ((x - edge0) / (edge1 - edge0)).clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}

/// Henyey-Greenstein phase function.
pub fn henyey_greenstein(cos_theta: f32, g: f32) -> f32 {
    let g2 = g * g;
    let denom = (1.0 + g2 - 2.0 * g * cos_theta).max(1e-6);
    (1.0 - g2) / (4.0 * PI * denom.powf(1.5))
}

/// Blend of a forward and a backward Henyey-Greenstein lobe.
pub fn dual_lobe_phase(cos_theta: f32, g1: f32, g2: f32, blend: f32) -> f32 {
    mix(
        henyey_greenstein(cos_theta, g1),
        henyey_greenstein(cos_theta, g2),
        blend,
    )
}

/// Beer-Lambert transmittance darkened by the powder term.
pub fn beer_powder(sigma_t: f32, distance: f32, powder_strength: f32) -> f32 {
    let beer = (-sigma_t * distance).exp();
    let powder = 1.0 - (-sigma_t * distance * 2.0).exp();
    beer * mix(1.0, powder, powder_strength)
}

/// Light falloff away from the galactic core.
pub fn core_light_falloff(p: Vec3) -> f32 {
    let r = p.truncate().length();
    1.0 / (1.0 + 0.04 * r * r) * (-p.z.abs() * 0.3).exp()
}

fn emission_strength(density: f32, temperature: f32) -> f32 {
    let hot = smoothstep(0.35, 0.9, temperature);
    let mid = smoothstep(0.2, 0.55, temperature) * (1.0 - hot * 0.6);
    (hot * 0.9 + mid * 0.45) * density
}

fn core_emission(p: Vec3, density: f32, temperature: f32) -> Vec3 {
    let core = (-p.truncate().length() * 3.0).exp();
    let hot = smoothstep(0.5, 1.0, temperature);
    Vec3::new(1.0, 0.85, 0.65) * core * hot * density
}

#[inline]
fn luma(c: Vec3) -> f32 {
    c.dot(Vec3::new(0.2126, 0.7152, 0.0722))
}

// ============================================================================
// Marching
// ============================================================================

/// Per-pixel accumulator.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RayMarchState {
    /// In-scattered and emitted light so far.
    pub accumulated_color: Vec3,
    /// Transmittance from the eye to the cursor.
    pub transmittance: f32,
    /// Transmittance from the eye to the opaque surface.
    pub transmittance_to_scene: f32,
    /// Ray parameter of the cursor.
    pub t: f32,
    scene_locked: bool,
}

impl RayMarchState {
    fn new(t: f32) -> Self {
        Self {
            accumulated_color: Vec3::ZERO,
            transmittance: 1.0,
            transmittance_to_scene: 1.0,
            t,
            scene_locked: false,
        }
    }

    /// Composite over the opaque scene colour.
    pub fn composite(&self, scene_color: Vec3) -> Vec3 {
        scene_color * self.transmittance_to_scene + self.accumulated_color
    }
}

#[derive(Clone, Copy, Debug)]
struct LightSample {
    transmittance: f32,
    multi_scatter: f32,
}

impl LightSample {
    const UNOCCLUDED: LightSample = LightSample {
        transmittance: 1.0,
        multi_scatter: 0.0,
    };
}

/// Field lookups for one frame.
pub struct VolumeSampler<'a> {
    field: &'a DensityField,
    config: &'a VolumeConfig,
    time: f32,
}

impl<'a> VolumeSampler<'a> {
    /// Sampler at animation time `time`.
    pub fn new(field: &'a DensityField, config: &'a VolumeConfig, time: f32) -> Self {
        Self {
            field,
            config,
            time,
        }
    }

    /// Scaled density and temperature at world point `p` of the rotating scene.
    pub fn sample(&self, p: Vec3) -> (f32, f32) {
        let q = corotate_sample_point(p, self.time, self.config.time_scale);
        let (density, temperature) = self.field.sample(q);
        (
            sanitize(density * self.config.density_factor).clamp(0.0, MAX_SAMPLE_DENSITY),
            sanitize(temperature).clamp(0.0, 1.0),
        )
    }

    fn light_march(&self, p: Vec3, light_dir: Vec3, light_distance: f32, jitter: f32) -> LightSample {
        let config = self.config;
        let Some((start, far)) = self.field.bounds().intersect_ray(p, light_dir) else {
            return LightSample::UNOCCLUDED;
        };
        let end = far.min(light_distance);
        let steps = config.shadow_steps.min(MAX_SHADOW_STEPS);
        if end <= start || steps == 0 {
            return LightSample::UNOCCLUDED;
        }

        let base_step = (end - start) / steps as f32 * 0.5;
        let mut t = start + jitter * base_step * 0.5;
        let mut optical_depth = 0.0;
        let mut multi_scatter = 0.0;
        let mut growth = 1.0;

        for _ in 0..steps {
            if t >= end || optical_depth > MAX_SHADOW_OPTICAL_DEPTH {
                break;
            }
            let dt = base_step * growth;
            growth *= SHADOW_STEP_GROWTH;

            let (density, temperature) = self.sample(p + light_dir * t);
            let density = density * config.shadow_density_scale;
            if density > EMPTY_SPACE_THRESHOLD {
                let sigma_t = config.absorption_at(density, temperature)
                    + config.scattering_at(density, temperature);
                optical_depth += sigma_t * dt;
                multi_scatter += (-optical_depth).exp() * density * dt * 0.5;
            }
            t += dt;
        }

        LightSample {
            transmittance: (-optical_depth * config.shadow_strength).exp(),
            multi_scatter,
        }
    }

    /// Integrate one ray and composite it over `scene_color`.
    ///
    /// `scene_depth` is the distance along the ray to the opaque surface
    /// (`f32::INFINITY` for none). `jitter` in `[0, 1)` offsets the start.
    pub fn march(
        &self,
        origin: Vec3,
        dir: Vec3,
        scene_color: Vec3,
        scene_depth: f32,
        jitter: f32,
    ) -> Vec3 {
        let config = self.config;
        let Some((near, far)) = self.field.bounds().intersect_ray(origin, dir) else {
            return scene_color;
        };
        // Gas behind the surface is never gathered, so a dim star can come
        // out darker than open sky next to it.
        let end = far.min(scene_depth);
        let steps = config.steps.clamp(1, MAX_STEPS);
        if end <= near {
            return scene_color;
        }

        let light_pos = Vec3::from(config.light_position);
        let radiance = config.light_radiance();
        let view_light = (light_pos - origin).normalize_or_zero();
        let phase = dual_lobe_phase(
            dir.dot(view_light),
            config.phase_g,
            config.phase_g2,
            config.phase_blend,
        );

        let star_tint = scene_color.max(Vec3::ZERO).powf(1.25);
        let star_luma = smoothstep(0.04, 0.55, luma(scene_color));

        let step = (end - near) / steps as f32;
        let mut state = RayMarchState::new(near + jitter * step);

        for _ in 0..steps {
            if state.t >= end || state.transmittance < TRANSMITTANCE_CUTOFF {
                break;
            }
            let p = origin + dir * state.t;
            let (density, temperature) = self.sample(p);
            if density <= EMPTY_SPACE_THRESHOLD {
                state.t += step;
                continue;
            }

            let dt = step * (1.0 / (density * 2.0 + 1.0)).clamp(0.3, 1.0);
            let sigma_a = config.absorption_at(density, temperature);
            let sigma_s = config.scattering_at(density, temperature);
            let sigma_t = sigma_a + sigma_s;
            let step_transmittance = beer_powder(sigma_t, dt, config.powder_strength);

            let to_light = light_pos - p;
            let light_distance = to_light.length();
            let light_dir = to_light.normalize_or_zero();
            let falloff = core_light_falloff(p);
            let light = self.light_march(p, light_dir, light_distance, fract(jitter * 7.31 + (p.x + p.y) * 37.0));

            let (ahead, _) = self.sample(p + light_dir * DERIVATIVE_OFFSET);
            let derivative = ((density - ahead) / DERIVATIVE_OFFSET).clamp(-2.0, 2.0);
            let diffuse = (0.5 + derivative * 0.4).clamp(0.1, 1.0);

            let influence = star_luma * (1.0 - (density * 0.2).clamp(0.0, 0.85));
            let color = config.nebula_color(temperature).lerp(star_tint, influence * 0.5);

            let emission = core_emission(p, density, temperature) * 0.08
                + color * emission_strength(density, temperature) * 0.1;
            state.accumulated_color += emission * state.transmittance * dt;

            let scatter = (1.0 - step_transmittance) * (sigma_s / sigma_t.max(1e-6));
            let single = radiance * falloff * light.transmittance * color * phase * scatter * diffuse * 2.5;
            let multi = radiance * falloff * color * light.multi_scatter * config.multi_scatter_strength;
            let ambient = color * config.ambient_density * density * dt * (1.0 - light.transmittance * 0.7);
            state.accumulated_color += (single + multi + ambient) * state.transmittance;

            state.transmittance *= step_transmittance;
            state.t += dt;
            if !state.scene_locked && state.t >= scene_depth {
                state.transmittance_to_scene = state.transmittance;
                state.scene_locked = true;
            }
        }

        if !state.scene_locked {
            state.transmittance_to_scene = state.transmittance;
        }
        let out = state.composite(scene_color);
        if out.is_finite() {
            out
        } else {
            scene_color
        }
    }
}

#[inline]
fn fract(x: f32) -> f32 {
    x - x.floor()
}

/// Integrate one pixel. See [`VolumeSampler::march`].
#[allow(clippy::too_many_arguments)]
pub fn march_pixel(
    field: &DensityField,
    config: &VolumeConfig,
    origin: Vec3,
    dir: Vec3,
    scene_color: Vec3,
    scene_depth: f32,
    time: f32,
    jitter: f32,
) -> Vec3 {
    VolumeSampler::new(field, config, time).march(origin, dir, scene_color, scene_depth, jitter)
}

/// Per-pixel start offset in `[0, 1]`, varying every 1/60 s.
pub fn pixel_jitter(x: u32, y: u32, time: f32) -> f32 {
    let frame = (time * 60.0).max(0.0) as u32;
    hash_unit(x ^ hash_u32(y.wrapping_add(frame.wrapping_mul(7919))))
}

/// Raymarch a whole frame over `scene`.
///
/// The frame size follows `scene`; rows are processed in parallel.
pub fn render_frame(
    field: &DensityField,
    camera: &FrameCamera,
    scene: &SceneBuffers,
    time: f32,
    config: &VolumeConfig,
) -> Vec<Vec3> {
    let width = scene.width() as usize;
    let camera = FrameCamera {
        width: scene.width(),
        height: scene.height(),
        ..*camera
    };
    let sampler = VolumeSampler::new(field, config, time);
    let mut out = scene.color().to_vec();
    if width == 0 {
        return out;
    }

    out.par_chunks_mut(width).enumerate().for_each(|(y, row)| {
        let y = y as u32;
        for (x, pixel) in row.iter_mut().enumerate() {
            let x = x as u32;
            let (origin, dir) = camera.pixel_ray(x, y);
            let jitter = if config.jitter {
                pixel_jitter(x, y, time)
            } else {
                0.0
            };
            *pixel = sampler.march(origin, dir, *pixel, scene.depth_at(x, y), jitter);
        }
    });
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::FieldBounds;

    fn uniform_field(density: f32, temperature: f32) -> DensityField {
        DensityField::from_fn(8, FieldBounds::for_radius(2.0), |_| (density, temperature))
    }

    fn config() -> VolumeConfig {
        VolumeConfig::default().with_jitter(false)
    }

    #[test]
    fn test_ray_missing_box_returns_scene() {
        let field = uniform_field(1.0, 0.5);
        let scene = Vec3::new(0.3, 0.2, 0.1);
        // Passes above the box (z half-extent is 1).
        let out = march_pixel(&field, &config(), Vec3::new(-5.0, 0.0, 3.0), Vec3::X, scene, f32::INFINITY, 0.0, 0.0);
        assert_eq!(out, scene);
    }

    #[test]
    fn test_zero_field_returns_scene_exactly() {
        let field = DensityField::zeros(8, FieldBounds::for_radius(2.0));
        let scene = Vec3::new(0.7, 0.1, 0.4);
        for jitter in [0.0, 0.3, 0.99] {
            let out = march_pixel(&field, &config(), Vec3::new(-5.0, 0.1, 0.2), Vec3::X, scene, f32::INFINITY, 12.0, jitter);
            assert_eq!(out, scene);
        }
    }

    #[test]
    fn test_surface_in_front_of_box_passes_through() {
        let field = uniform_field(1.0, 0.5);
        let scene = Vec3::splat(0.5);
        // Box starts at distance 3 along the ray.
        let out = march_pixel(&field, &config(), Vec3::new(-5.0, 0.0, 0.0), Vec3::X, scene, 2.5, 0.0, 0.0);
        assert_eq!(out, scene);
    }

    #[test]
    fn test_gas_behind_surface_is_not_gathered() {
        // Dense gas only in the far half of the box (x > 0.5).
        let field = DensityField::from_fn(8, FieldBounds::for_radius(2.0), |p| {
            (if p.x > 0.5 { 3.0 } else { 0.0 }, 0.6)
        });
        let scene = Vec3::new(0.05, 0.04, 0.03);
        let origin = Vec3::new(-5.0, 0.0, 0.0);
        for jitter in [0.0, 0.5] {
            // Surface at x = -0.5, in front of the gas.
            let star = march_pixel(&field, &config(), origin, Vec3::X, scene, 4.5, 0.0, jitter);
            assert_eq!(star, scene);
        }
        let open = march_pixel(&field, &config(), origin, Vec3::X, scene, f32::INFINITY, 0.0, 0.0);
        assert!((open - scene).length() > 1e-4, "gas should change the open pixel, got {open}");
    }

    #[test]
    fn test_dense_medium_attenuates_scene() {
        let field = uniform_field(4.0, 0.2);
        let scene = Vec3::ONE;
        let cfg = config().with_light_intensity(0.0);
        let out = march_pixel(&field, &cfg, Vec3::new(-5.0, 0.0, 0.0), Vec3::X, scene, f32::INFINITY, 0.0, 0.0);
        assert!(out.x < 0.5, "scene should be dimmed, got {out}");
        assert!(out.is_finite());
    }

    #[test]
    fn test_nearer_surface_is_less_attenuated() {
        let field = uniform_field(1.0, 0.3);
        let scene = Vec3::ONE;
        let cfg = VolumeConfig {
            powder_strength: 0.0,
            ..config().with_light_intensity(0.0)
        };
        let origin = Vec3::new(-5.0, 0.0, 0.0);
        let near = march_pixel(&field, &cfg, origin, Vec3::X, scene, 3.5, 0.0, 0.0);
        let far = march_pixel(&field, &cfg, origin, Vec3::X, scene, 6.5, 0.0, 0.0);
        assert!(near.x > far.x);
    }

    #[test]
    fn test_output_finite_and_non_negative() {
        let field = DensityField::from_fn(12, FieldBounds::for_radius(2.0), |p| {
            ((2.0 - p.length()).max(0.0) * 3.0, (p.x * 0.25 + 0.5).clamp(0.0, 1.0))
        });
        let cfg = config();
        for i in 0..16 {
            let angle = i as f32 * 0.4;
            let origin = Vec3::new(angle.cos() * 6.0, angle.sin() * 6.0, 1.5);
            let dir = (-origin).normalize();
            let out = march_pixel(&field, &cfg, origin, dir, Vec3::splat(0.2), f32::INFINITY, i as f32, 0.5);
            assert!(out.is_finite());
            assert!(out.min_element() >= 0.0);
        }
    }

    #[test]
    fn test_henyey_greenstein_isotropic() {
        let expected = 1.0 / (4.0 * PI);
        assert!((henyey_greenstein(0.3, 0.0) - expected).abs() < 1e-6);
        assert!(henyey_greenstein(1.0, 0.35) > henyey_greenstein(-1.0, 0.35));
    }

    #[test]
    fn test_beer_powder_bounds() {
        assert_eq!(beer_powder(0.0, 1.0, 0.0), 1.0);
        let t = beer_powder(2.0, 0.5, 0.6);
        assert!(t > 0.0 && t < (-1.0f32).exp());
    }

    #[test]
    fn test_nebula_palette_endpoints() {
        let cfg = VolumeConfig::default();
        assert!(cfg.nebula_color(0.0).distance(cfg.dust_color.rgb()) < 1e-6);
        assert!(cfg.nebula_color(0.35).distance(cfg.cool_color.rgb()) < 1e-6);
        assert!(cfg.nebula_color(1.0).distance(cfg.warm_color.rgb()) < 1e-6);
    }

    #[test]
    fn test_config_from_params() {
        let params = GalaxyParams {
            ray_march_steps: 500,
            density_factor: 1.3,
            ..GalaxyParams::default()
        };
        let cfg = VolumeConfig::from_params(&params);
        assert_eq!(cfg.steps, MAX_STEPS);
        assert_eq!(cfg.density_factor, 1.3);
        assert_eq!(cfg.shadow_steps, 16);
        assert!(cfg.with_shadow_steps(1000).shadow_steps <= MAX_SHADOW_STEPS);
    }

    #[test]
    fn test_render_frame_size_follows_scene() {
        let field = DensityField::zeros(8, FieldBounds::for_radius(2.0));
        let scene = SceneBuffers::new(7, 5);
        let camera = crate::camera::Camera::new().frame(7, 5);
        let out = render_frame(&field, &camera, &scene, 0.0, &config());
        assert_eq!(out.len(), 35);
        assert!(out.iter().all(|c| *c == Vec3::ZERO));
    }
}
