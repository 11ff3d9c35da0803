use glam::Vec3;
use glint_engine::camera::Camera;

/// Camera circling the origin at a fixed radius and height.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Orbit {
    pub radius: f32,
    pub height: f32,
    /// Radians per second.
    pub speed: f32,
    pub target: Vec3,
}

impl Default for Orbit {
    fn default() -> Self {
        Self {
            radius: 22.0,
            height: 9.0,
            speed: 0.15,
            target: Vec3::new(0.0, 1.0, 0.0),
        }
    }
}

impl Orbit {
    pub fn camera_at(&self, t: f32) -> Camera {
        let angle = t * self.speed;
        Camera {
            eye: Vec3::new(self.radius * angle.cos(), self.height, self.radius * angle.sin()),
            target: self.target,
            ..Camera::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn eye_keeps_its_distance() {
        let orbit = Orbit::default();
        for i in 0..20 {
            let eye = orbit.camera_at(i as f32 * 1.7).eye;
            assert!((Vec3::new(eye.x, 0.0, eye.z).length() - orbit.radius).abs() < 1e-3);
            assert_eq!(eye.y, orbit.height);
        }
    }

    #[test]
    fn scene_fits_inside_the_far_plane() {
        let cam = Orbit::default().camera_at(0.0);
        assert!(cam.eye.distance(cam.target) + 40.0 < cam.far);
    }
}
