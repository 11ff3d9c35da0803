use glam::{Mat4, Vec2, Vec3};

use super::CameraUniforms;

/// Right-handed look-at camera with a 0..1 depth range projection.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Camera {
    pub eye: Vec3,
    pub target: Vec3,
    pub up: Vec3,
    /// Vertical field of view in radians.
    pub fov_y: f32,
    pub near: f32,
    pub far: f32,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            eye: Vec3::new(0.0, 4.0, 12.0),
            target: Vec3::ZERO,
            up: Vec3::Y,
            fov_y: 45f32.to_radians(),
            near: 0.1,
            far: 100.0,
        }
    }
}

impl Camera {
    pub fn view(&self) -> Mat4 {
        Mat4::look_at_rh(self.eye, self.target, self.up)
    }

    pub fn projection(&self, aspect: f32) -> Mat4 {
        Mat4::perspective_rh(self.fov_y, aspect.max(1e-4), self.near, self.far)
    }

    /// Builds the uniform block for a viewport of `width × height` physical pixels.
    pub fn uniforms(&self, width: u32, height: u32) -> CameraUniforms {
        let w = width.max(1) as f32;
        let h = height.max(1) as f32;
        CameraUniforms::new(
            self.view(),
            self.projection(w / h),
            Vec2::new(w, h),
            self.near,
            self.far,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn near_plane_unprojects_to_negative_near() {
        let cam = Camera::default();
        let u = cam.uniforms(1280, 720);
        let p = u.inverse_projection() * glam::Vec4::new(0.3, -0.2, 0.0, 1.0);
        assert_relative_eq!(p.z / p.w, -cam.near, epsilon = 1e-5);
    }

    #[test]
    fn zero_sized_viewport_is_clamped() {
        let u = Camera::default().uniforms(0, 0);
        assert_eq!(u.viewport, [1.0, 1.0]);
    }
}
