//! WGSL snippets shared by the GPU passes.
//!
//! The orbit law is generated from the constants in [`orbit`](crate::orbit)
//! so the star vertex shader, the volumetric fragment shader and the CPU
//! code can never disagree about how fast the galaxy turns.
//!
//! # Available Functions
//!
//! ## Orbit
//! - `angular_velocity(r: f32) -> f32`
//! - `orbit_angle(r: f32, time: f32, time_scale: f32) -> f32`
//! - `star_position(init: vec3<f32>, time: f32, time_scale: f32) -> vec3<f32>` - `init` is `(r, theta0, z)`
//! - `corotate_sample_point(p: vec3<f32>, time: f32, time_scale: f32) -> vec3<f32>`
//!
//! ## Random & Hash
//! - `hash(n: u32) -> u32` - Same bit mixer as [`noise::hash_u32`](crate::noise::hash_u32)
//! - `hash2(p: vec2<u32>) -> u32`
//! - `rand(seed: u32) -> f32` - Float in [0, 1]

use crate::orbit::{GM, MIN_RADIUS};

/// WGSL code for hash functions.
pub const HASH_WGSL: &str = r#"
fn hash(n: u32) -> u32 {
    var x = n;
    x = x ^ (x >> 17u);
    x = x * 0xed5ad4bbu;
    x = x ^ (x >> 11u);
    x = x * 0xac4c1b51u;
    x = x ^ (x >> 15u);
    x = x * 0x31848babu;
    x = x ^ (x >> 14u);
    return x;
}

fn hash2(p: vec2<u32>) -> u32 {
    return p.x ^ hash(p.y);
}

fn rand(seed: u32) -> f32 {
    return f32(hash(seed)) / 4294967295.0;
}
"#;

/// WGSL code for differential rotation.
pub fn orbit_wgsl() -> String {
    format!(
        r#"
const ORBIT_GM: f32 = {gm:e};
const ORBIT_MIN_RADIUS: f32 = {min_radius:e};

fn angular_velocity(r: f32) -> f32 {{
    let rr = max(r, ORBIT_MIN_RADIUS);
    return sqrt(ORBIT_GM / (rr * rr * rr));
}}

fn orbit_angle(r: f32, time: f32, time_scale: f32) -> f32 {{
    return angular_velocity(r) * time * time_scale;
}}

fn star_position(init: vec3<f32>, time: f32, time_scale: f32) -> vec3<f32> {{
    let theta = init.y - orbit_angle(init.x, time, time_scale);
    return vec3<f32>(init.x * cos(theta), init.x * sin(theta), init.z);
}}

fn corotate_sample_point(p: vec3<f32>, time: f32, time_scale: f32) -> vec3<f32> {{
    let a = orbit_angle(length(p.xy), time, time_scale);
    let s = sin(a);
    let c = cos(a);
    return vec3<f32>(p.x * c - p.y * s, p.x * s + p.y * c, p.z);
}}
"#,
        gm = GM,
        min_radius = MIN_RADIUS,
    )
}

/// All shared snippets concatenated.
pub fn all_utils_wgsl() -> String {
    format!("{}\n{}", HASH_WGSL, orbit_wgsl())
}

/// Validates WGSL code using naga.
#[cfg(test)]
pub(crate) fn validate_wgsl(code: &str) -> Result<(), String> {
    let module = naga::front::wgsl::parse_str(code)
        .map_err(|e| format!("WGSL parse error: {}", e.emit_to_string(code)))?;

    let mut validator = naga::valid::Validator::new(
        naga::valid::ValidationFlags::all(),
        naga::valid::Capabilities::all(),
    );
    validator
        .validate(&module)
        .map_err(|e| format!("WGSL validation error: {:?}", e))?;

    Ok(())
}
