//! CPU coherent noise.
//!
//! A direct port of the 3D simplex noise used by the WGSL utility library
//! (`noise3` / `fbm3` in [`shader_utils`](crate::shader_utils)), so noise
//! baked into the density field on the CPU has the same character as noise
//! evaluated in shaders. Also hosts the integer hash shared with the
//! raymarcher's per-pixel jitter.

use glam::{Vec3, Vec3Swizzles, Vec4, Vec4Swizzles};

/// Octave count used by the density field builder.
pub const FIELD_OCTAVES: u32 = 5;

#[inline]
fn mod289_3(x: Vec3) -> Vec3 {
    x - (x * (1.0 / 289.0)).floor() * 289.0
}

#[inline]
fn mod289_4(x: Vec4) -> Vec4 {
    x - (x * (1.0 / 289.0)).floor() * 289.0
}

#[inline]
fn permute4(x: Vec4) -> Vec4 {
    mod289_4(((x * 34.0) + Vec4::ONE) * x)
}

#[inline]
fn taylor_inv_sqrt4(r: Vec4) -> Vec4 {
    Vec4::splat(1.792_842_9) - 0.853_734_7 * r
}

/// `step(edge, x)`: 1 where `x >= edge`, else 0.
#[inline]
fn step3(edge: Vec3, x: Vec3) -> Vec3 {
    Vec3::select(x.cmpge(edge), Vec3::ONE, Vec3::ZERO)
}

#[inline]
fn step4(edge: Vec4, x: Vec4) -> Vec4 {
    Vec4::select(x.cmpge(edge), Vec4::ONE, Vec4::ZERO)
}

/// 3D simplex noise in roughly `[-1, 1]`.
pub fn simplex3(v: Vec3) -> f32 {
    const CX: f32 = 1.0 / 6.0;
    const CY: f32 = 1.0 / 3.0;

    // First corner
    let mut i = (v + Vec3::splat(v.dot(Vec3::splat(CY)))).floor();
    let x0 = v - i + Vec3::splat(i.dot(Vec3::splat(CX)));

    // Other corners
    let g = step3(x0.yzx(), x0);
    let l = Vec3::ONE - g;
    let i1 = g.min(l.zxy());
    let i2 = g.max(l.zxy());

    let x1 = x0 - i1 + Vec3::splat(CX);
    let x2 = x0 - i2 + Vec3::splat(CY);
    let x3 = x0 - Vec3::splat(0.5);

    // Permutations
    i = mod289_3(i);
    let p = permute4(
        permute4(
            permute4(Vec4::splat(i.z) + Vec4::new(0.0, i1.z, i2.z, 1.0))
                + Vec4::splat(i.y)
                + Vec4::new(0.0, i1.y, i2.y, 1.0),
        ) + Vec4::splat(i.x)
            + Vec4::new(0.0, i1.x, i2.x, 1.0),
    );

    // Gradients: 7x7 points over a square, mapped onto an octahedron
    let n = 1.0 / 7.0;
    let ns = Vec3::new(2.0 * n, 0.5 * n - 1.0, n);

    let j = p - 49.0 * (p * ns.z * ns.z).floor();
    let x_ = (j * ns.z).floor();
    let y_ = (j - 7.0 * x_).floor();

    let x = x_ * ns.x + Vec4::splat(ns.y);
    let y = y_ * ns.x + Vec4::splat(ns.y);
    let h = Vec4::ONE - x.abs() - y.abs();

    let b0 = Vec4::new(x.x, x.y, y.x, y.y);
    let b1 = Vec4::new(x.z, x.w, y.z, y.w);

    let s0 = b0.floor() * 2.0 + Vec4::ONE;
    let s1 = b1.floor() * 2.0 + Vec4::ONE;
    let sh = -step4(h, Vec4::ZERO);

    let a0 = b0.xzyw() + s0.xzyw() * sh.xxyy();
    let a1 = b1.xzyw() + s1.xzyw() * sh.zzww();

    let mut p0 = Vec3::new(a0.x, a0.y, h.x);
    let mut p1 = Vec3::new(a0.z, a0.w, h.y);
    let mut p2 = Vec3::new(a1.x, a1.y, h.z);
    let mut p3 = Vec3::new(a1.z, a1.w, h.w);

    let norm = taylor_inv_sqrt4(Vec4::new(p0.dot(p0), p1.dot(p1), p2.dot(p2), p3.dot(p3)));
    p0 *= norm.x;
    p1 *= norm.y;
    p2 *= norm.z;
    p3 *= norm.w;

    // Mix final noise value
    let m = (Vec4::splat(0.6) - Vec4::new(x0.dot(x0), x1.dot(x1), x2.dot(x2), x3.dot(x3)))
        .max(Vec4::ZERO);
    let m = m * m;
    42.0 * (m * m).dot(Vec4::new(p0.dot(x0), p1.dot(x1), p2.dot(x2), p3.dot(x3)))
}

/// Fractal sum of `octaves` simplex layers, normalized back to roughly `[-1, 1]`.
///
/// Each octave doubles the frequency and halves the amplitude.
pub fn fbm3(p: Vec3, octaves: u32) -> f32 {
    let mut value = 0.0;
    let mut amplitude = 0.5;
    let mut total = 0.0;
    let mut pos = p;
    for _ in 0..octaves.max(1) {
        value += amplitude * simplex3(pos);
        total += amplitude;
        pos *= 2.0;
        amplitude *= 0.5;
    }
    value / total
}

/// [`fbm3`] remapped to `[0, 1]`; non-finite input yields 0.
pub fn fbm3_unit(p: Vec3, octaves: u32) -> f32 {
    let n = (fbm3(p, octaves) + 1.0) * 0.5;
    if n.is_finite() {
        n.clamp(0.0, 1.0)
    } else {
        0.0
    }
}

/// Integer hash, identical to the WGSL `hash` utility.
#[inline]
pub fn hash_u32(n: u32) -> u32 {
    let mut x = n;
    x ^= x >> 17;
    x = x.wrapping_mul(0xed5a_d4bb);
    x ^= x >> 11;
    x = x.wrapping_mul(0xac4c_1b51);
    x ^= x >> 15;
    x = x.wrapping_mul(0x3184_8bab);
    x ^= x >> 14;
    x
}

/// Hash to a float in `[0, 1]`.
#[inline]
pub fn hash_unit(n: u32) -> f32 {
    hash_u32(n) as f32 / u32::MAX as f32
}
