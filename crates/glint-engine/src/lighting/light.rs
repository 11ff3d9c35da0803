use bytemuck::{Pod, Zeroable};
use glam::Vec3;

/// One point light as stored in the light set buffer.
///
/// Layout matches `struct Light` in `types.wgsl` (32 bytes). Position is in
/// world space; stages transform it into view space themselves.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct Light {
    pub position: [f32; 3],
    /// Maximum influence distance. Contribution is zero beyond it.
    pub radius: f32,
    /// Linear RGB.
    pub color: [f32; 3],
    pub intensity: f32,
}

impl Light {
    pub fn new(position: Vec3, radius: f32, color: Vec3, intensity: f32) -> Self {
        Self {
            position: position.to_array(),
            radius,
            color: color.to_array(),
            intensity,
        }
    }

    #[inline]
    pub fn position(&self) -> Vec3 {
        Vec3::from_array(self.position)
    }

    #[inline]
    pub fn color(&self) -> Vec3 {
        Vec3::from_array(self.color)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gpu_layout_is_32_bytes() {
        assert_eq!(std::mem::size_of::<Light>(), 32);
    }

    #[test]
    fn accessors_round_trip() {
        let l = Light::new(Vec3::new(1.0, 2.0, 3.0), 4.0, Vec3::ONE, 2.0);
        assert_eq!(l.position(), Vec3::new(1.0, 2.0, 3.0));
        assert_eq!(l.color(), Vec3::ONE);
        assert_eq!(l.radius, 4.0);
    }
}
