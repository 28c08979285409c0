//! Orbit camera.
//!
//! The galactic disc lies in the XY plane, so the camera orbits around the Z
//! axis. [`FrameCamera`] is the per-frame snapshot handed to the renderers:
//! position plus view-projection and its inverse.

use glam::{Mat4, Vec2, Vec3, Vec4};

/// Vertical field of view.
pub const FOV_Y_DEGREES: f32 = 45.0;
/// Near clip distance.
pub const Z_NEAR: f32 = 0.01;
/// Far clip distance.
pub const Z_FAR: f32 = 200.0;

/// Orbit camera for viewing the galaxy.
#[derive(Clone, Debug)]
pub struct Camera {
    /// Horizontal rotation angle in radians.
    pub yaw: f32,
    /// Elevation above the disc plane in radians.
    pub pitch: f32,
    /// Distance from the target point.
    pub distance: f32,
    /// Point the camera orbits around.
    pub target: Vec3,
}

impl Camera {
    /// Camera looking down at the disc from a shallow angle.
    pub fn new() -> Self {
        Self {
            yaw: 0.0,
            pitch: 0.6,
            distance: 9.0,
            target: Vec3::ZERO,
        }
    }

    /// Set the orbit distance.
    pub fn with_distance(mut self, distance: f32) -> Self {
        self.distance = distance;
        self
    }

    /// Set yaw and pitch.
    pub fn with_angles(mut self, yaw: f32, pitch: f32) -> Self {
        self.yaw = yaw;
        self.pitch = pitch.clamp(-1.55, 1.55);
        self
    }

    /// Calculate the camera's world position.
    pub fn position(&self) -> Vec3 {
        let x = self.distance * self.pitch.cos() * self.yaw.sin();
        let y = -self.distance * self.pitch.cos() * self.yaw.cos();
        let z = self.distance * self.pitch.sin();
        self.target + Vec3::new(x, y, z)
    }

    /// Calculate the view matrix for rendering.
    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position(), self.target, Vec3::Z)
    }

    /// Perspective projection for the given aspect ratio.
    pub fn projection_matrix(&self, aspect: f32) -> Mat4 {
        Mat4::perspective_rh(FOV_Y_DEGREES.to_radians(), aspect.max(1e-3), Z_NEAR, Z_FAR)
    }

    /// Apply a mouse drag (pixels).
    pub fn orbit(&mut self, dx: f32, dy: f32) {
        self.yaw -= dx * 0.005;
        self.pitch = (self.pitch + dy * 0.005).clamp(-1.55, 1.55);
    }

    /// Apply a scroll step.
    pub fn zoom(&mut self, scroll: f32) {
        self.distance = (self.distance - scroll * 0.5).clamp(0.5, 60.0);
    }

    /// Snapshot for a `width × height` frame.
    pub fn frame(&self, width: u32, height: u32) -> FrameCamera {
        let aspect = width.max(1) as f32 / height.max(1) as f32;
        FrameCamera::new(
            self.position(),
            self.projection_matrix(aspect) * self.view_matrix(),
            width,
            height,
        )
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::new()
    }
}

/// Camera pose for one frame.
#[derive(Clone, Copy, Debug)]
pub struct FrameCamera {
    /// World-space eye position.
    pub position: Vec3,
    /// Projection × view.
    pub view_proj: Mat4,
    /// Inverse of `view_proj`.
    pub inv_view_proj: Mat4,
    /// Frame width in pixels.
    pub width: u32,
    /// Frame height in pixels.
    pub height: u32,
}

impl FrameCamera {
    /// Snapshot from an explicit pose.
    pub fn new(position: Vec3, view_proj: Mat4, width: u32, height: u32) -> Self {
        Self {
            position,
            view_proj,
            inv_view_proj: view_proj.inverse(),
            width,
            height,
        }
    }

    /// Normalized device coordinates of the centre of pixel `(x, y)`.
    #[inline]
    pub fn pixel_ndc(&self, x: u32, y: u32) -> Vec2 {
        Vec2::new(
            (x as f32 + 0.5) / self.width.max(1) as f32 * 2.0 - 1.0,
            1.0 - (y as f32 + 0.5) / self.height.max(1) as f32 * 2.0,
        )
    }

    /// World-space ray direction through an NDC point.
    pub fn ray_dir_ndc(&self, ndc: Vec2) -> Vec3 {
        let far = self.inv_view_proj * Vec4::new(ndc.x, ndc.y, 1.0, 1.0);
        (far.truncate() / far.w - self.position).normalize_or_zero()
    }

    /// Ray origin and direction through the centre of pixel `(x, y)`.
    #[inline]
    pub fn pixel_ray(&self, x: u32, y: u32) -> (Vec3, Vec3) {
        (self.position, self.ray_dir_ndc(self.pixel_ndc(x, y)))
    }

    /// Project a world point to pixel coordinates and its distance from the
    /// eye. `None` if behind the camera or outside the clip volume depth.
    pub fn project(&self, p: Vec3) -> Option<(Vec2, f32)> {
        let clip = self.view_proj * p.extend(1.0);
        if clip.w <= Z_NEAR {
            return None;
        }
        let ndc = clip.truncate() / clip.w;
        if !(0.0..=1.0).contains(&ndc.z) {
            return None;
        }
        let px = Vec2::new(
            (ndc.x + 1.0) * 0.5 * self.width as f32,
            (1.0 - ndc.y) * 0.5 * self.height as f32,
        );
        Some((px, p.distance(self.position)))
    }

    /// Pixels per world unit at distance `distance`.
    pub fn pixels_per_unit(&self, distance: f32) -> f32 {
        let half_fov = (FOV_Y_DEGREES.to_radians() * 0.5).tan();
        self.height as f32 / (2.0 * half_fov * distance.max(Z_NEAR))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_position_distance() {
        let cam = Camera::new().with_distance(5.0).with_angles(0.7, 0.4);
        assert!((cam.position().length() - 5.0).abs() < 1e-4);
        assert!(cam.position().z > 0.0);
    }

    #[test]
    fn test_center_ray_hits_target() {
        let cam = Camera::new();
        let frame = cam.frame(101, 101);
        let (origin, dir) = frame.pixel_ray(50, 50);
        let to_target = (cam.target - origin).normalize();
        assert!(dir.dot(to_target) > 0.9999);
    }

    #[test]
    fn test_project_roundtrip() {
        let cam = Camera::new();
        let frame = cam.frame(200, 100);
        let (px, dist) = frame.project(Vec3::ZERO).unwrap();
        assert!((px.x - 100.0).abs() < 0.5);
        assert!((px.y - 50.0).abs() < 0.5);
        assert!((dist - cam.distance).abs() < 1e-3);
    }

    #[test]
    fn test_project_behind_camera() {
        let cam = Camera::new();
        let frame = cam.frame(64, 64);
        let behind = cam.position() * 2.0;
        assert!(frame.project(behind).is_none());
    }

    #[test]
    fn test_orbit_clamps_pitch() {
        let mut cam = Camera::new();
        cam.orbit(0.0, 10_000.0);
        assert!(cam.pitch <= 1.55);
        cam.zoom(1000.0);
        assert!(cam.distance >= 0.5);
    }
}
