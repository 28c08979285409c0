//! CPU opaque scene and image output.
//!
//! [`SceneBuffers`] is what the volumetric pass composites over: a linear HDR
//! colour buffer plus, per pixel, the distance along the camera ray to the
//! nearest opaque surface (`f32::INFINITY` where there is none). Stars are
//! splatted as soft round sprites. The GPU path produces the same pair of
//! buffers as textures.

use std::path::Path;

use glam::Vec3;
use image::RgbaImage;

use crate::camera::FrameCamera;
use crate::error::RenderError;
use crate::stars::StarCatalog;

/// Sprite coverage below this is discarded (neither colour nor depth).
pub const SPRITE_ALPHA_CUTOFF: f32 = 0.05;
/// Exposure applied before tone mapping.
pub const EXPOSURE: f32 = 1.1;

/// Opaque colour and depth for one frame.
#[derive(Clone, Debug)]
pub struct SceneBuffers {
    width: u32,
    height: u32,
    color: Vec<Vec3>,
    depth: Vec<f32>,
}

impl SceneBuffers {
    /// Black frame with no surfaces.
    pub fn new(width: u32, height: u32) -> Self {
        let len = width as usize * height as usize;
        Self {
            width,
            height,
            color: vec![Vec3::ZERO; len],
            depth: vec![f32::INFINITY; len],
        }
    }

    /// Wrap existing buffers, checking their sizes.
    pub fn from_parts(
        width: u32,
        height: u32,
        color: Vec<Vec3>,
        depth: Vec<f32>,
    ) -> Result<Self, RenderError> {
        let expected = width as usize * height as usize;
        for actual in [color.len(), depth.len()] {
            if actual != expected {
                return Err(RenderError::BufferSize { expected, actual });
            }
        }
        Ok(Self {
            width,
            height,
            color,
            depth,
        })
    }

    /// Frame width.
    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Frame height.
    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Colour buffer, row-major.
    #[inline]
    pub fn color(&self) -> &[Vec3] {
        &self.color
    }

    /// Depth buffer, row-major.
    #[inline]
    pub fn depth(&self) -> &[f32] {
        &self.depth
    }

    #[inline]
    fn index(&self, x: u32, y: u32) -> usize {
        y as usize * self.width as usize + x as usize
    }

    /// Colour at `(x, y)`.
    #[inline]
    pub fn color_at(&self, x: u32, y: u32) -> Vec3 {
        self.color[self.index(x, y)]
    }

    /// Distance to the surface at `(x, y)`.
    #[inline]
    pub fn depth_at(&self, x: u32, y: u32) -> f32 {
        self.depth[self.index(x, y)]
    }

    /// Reset to `background` with no surfaces.
    pub fn clear(&mut self, background: Vec3) {
        self.color.fill(background);
        self.depth.fill(f32::INFINITY);
    }

    /// Additively splat one round sprite of world diameter `size` at `center`.
    pub fn splat(&mut self, camera: &FrameCamera, center: Vec3, size: f32, color: Vec3) {
        let Some((px, distance)) = camera.project(center) else {
            return;
        };
        let mut radius = 0.5 * size * camera.pixels_per_unit(distance);
        let mut brightness = 1.0;
        if radius < 1.0 {
            // Keep sub-pixel stars visible while preserving their energy.
            brightness = (radius * radius).max(0.05);
            radius = 1.0;
        }
        let sprite = color.max(Vec3::ZERO).powf(0.85) * 1.35 * brightness;

        let x0 = (px.x - radius).floor().max(0.0) as i64;
        let y0 = (px.y - radius).floor().max(0.0) as i64;
        let x1 = ((px.x + radius).ceil() as i64).min(self.width as i64 - 1);
        let y1 = ((px.y + radius).ceil() as i64).min(self.height as i64 - 1);
        for y in y0..=y1 {
            for x in x0..=x1 {
                let dx = (x as f32 + 0.5 - px.x) / radius;
                let dy = (y as f32 + 0.5 - px.y) / radius;
                let falloff = (1.0 - (dx * dx + dy * dy)).max(0.0);
                let alpha = falloff * falloff;
                if alpha < SPRITE_ALPHA_CUTOFF {
                    continue;
                }
                let i = self.index(x as u32, y as u32);
                self.color[i] += sprite * alpha;
                self.depth[i] = self.depth[i].min(distance);
            }
        }
    }

    /// Splat every star of `catalog` at its position at `time`.
    pub fn splat_stars(&mut self, catalog: &StarCatalog, camera: &FrameCamera, time: f32, time_scale: f32) {
        for star in catalog.stars() {
            self.splat(camera, star.position_at(time, time_scale), star.size, star.color);
        }
    }
}

// ============================================================================
// Output
// ============================================================================

/// ACES filmic curve (Narkowicz fit).
pub fn aces_filmic(x: Vec3) -> Vec3 {
    let (a, b, c, d, e) = (2.51, 0.03, 2.43, 0.59, 0.14);
    ((x * (a * x + b)) / (x * (c * x + d) + e)).clamp(Vec3::ZERO, Vec3::ONE)
}

/// Linear to sRGB transfer.
pub fn linear_to_srgb(c: f32) -> f32 {
    if c <= 0.003_130_8 {
        c * 12.92
    } else {
        1.055 * c.powf(1.0 / 2.4) - 0.055
    }
}

/// Tone map and encode an HDR frame to 8-bit RGBA.
pub fn to_rgba8(pixels: &[Vec3]) -> Vec<u8> {
    let mut out = Vec::with_capacity(pixels.len() * 4);
    for p in pixels {
        let mapped = aces_filmic(p.max(Vec3::ZERO) * EXPOSURE);
        for c in mapped.to_array() {
            out.push((linear_to_srgb(c) * 255.0).round().clamp(0.0, 255.0) as u8);
        }
        out.push(255);
    }
    out
}

/// Tone map `pixels` and write them to a PNG (or any format `image` infers
/// from the extension).
pub fn save_image(path: impl AsRef<Path>, width: u32, height: u32, pixels: &[Vec3]) -> Result<(), RenderError> {
    let expected = width as usize * height as usize;
    if pixels.len() != expected {
        return Err(RenderError::BufferSize {
            expected,
            actual: pixels.len(),
        });
    }
    let img = RgbaImage::from_raw(width, height, to_rgba8(pixels)).ok_or(RenderError::BufferSize {
        expected,
        actual: pixels.len(),
    })?;
    img.save(path)?;
    Ok(())
}
