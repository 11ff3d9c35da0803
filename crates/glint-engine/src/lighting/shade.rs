use glam::{Vec2, Vec3};

use crate::camera::CameraUniforms;
use crate::cluster::{ClusterAssignment, ClusterGrid};

use super::Light;

/// Constant ambient term added before the light sum (`AMBIENT` in `lighting.wgsl`).
pub const AMBIENT: Vec3 = Vec3::splat(0.03);

/// Minimum squared distance in the falloff denominator.
const MIN_DISTANCE_SQ: f32 = 0.01;

/// Everything the resolve step knows about one pixel.
///
/// Forward+ builds it from interpolated vertex outputs, clustered deferred from
/// the three G-buffer texels.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct SurfaceSample {
    /// Pixel position, top-left origin, pixel centres at `.5`.
    pub frag_xy: Vec2,
    pub view_pos: Vec3,
    pub view_normal: Vec3,
    pub albedo: Vec3,
}

/// Windowed inverse-square falloff. Exactly zero at and beyond `radius`.
#[inline]
pub fn range_falloff(distance: f32, radius: f32) -> f32 {
    let q = distance / radius;
    let q2 = q * q;
    let window = (1.0 - q2 * q2).clamp(0.0, 1.0);
    window * window / (distance * distance).max(MIN_DISTANCE_SQ)
}

/// Radiance one light adds at a view-space point with unit normal `normal`.
pub fn light_contribution(light: &Light, light_view_pos: Vec3, view_pos: Vec3, normal: Vec3) -> Vec3 {
    let to_light = light_view_pos - view_pos;
    let distance = to_light.length();
    let l = to_light / distance.max(1e-4);
    light.color() * light.intensity * normal.dot(l).max(0.0) * range_falloff(distance, light.radius)
}

/// Shades one pixel from its cluster's light run, as the resolve shaders do.
pub fn shade_sample(
    grid: &ClusterGrid,
    camera: &CameraUniforms,
    lights: &[Light],
    assignment: &ClusterAssignment,
    sample: &SurfaceSample,
) -> Vec3 {
    let normal = sample.view_normal.normalize_or_zero();
    let view = camera.view_matrix();
    let cluster = grid.cluster_at(sample.frag_xy, -sample.view_pos.z, camera);

    let lit = assignment
        .lights_in(cluster)
        .iter()
        .map(|&i| {
            let light = &lights[i as usize];
            light_contribution(light, view.transform_point3(light.position()), sample.view_pos, normal)
        })
        .fold(Vec3::ZERO, |acc, c| acc + c);

    sample.albedo * (AMBIENT + lit)
}
