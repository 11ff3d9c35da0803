use glam::{Mat4, Vec3, Vec4};
use glint_engine::scene::{MeshData, MeshScene, SceneLayouts};
use glint_engine::RenderError;

/// Half extent of the ground plane.
pub const GROUND_HALF_EXTENT: f32 = 24.0;

const PILLAR_GRID: i32 = 4;
const PILLAR_SPACING: f32 = 4.0;

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Shape {
    Ground,
    Pillar,
}

/// One placed object of the demo layout.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Placement {
    pub shape: Shape,
    pub palette: usize,
    pub transform: Mat4,
}

/// Material base colors, indexed by `Placement::palette`.
pub const PALETTE: [Vec4; 3] = [
    Vec4::new(0.8, 0.8, 0.8, 1.0),
    Vec4::new(0.85, 0.55, 0.35, 1.0),
    Vec4::new(0.35, 0.55, 0.85, 1.0),
];

/// A ground plane with a square grid of unit cubes of varying height resting on it.
pub fn layout() -> Vec<Placement> {
    let mut out = vec![Placement {
        shape: Shape::Ground,
        palette: 0,
        transform: Mat4::IDENTITY,
    }];

    for gz in -PILLAR_GRID..=PILLAR_GRID {
        for gx in -PILLAR_GRID..=PILLAR_GRID {
            let height = 1.0 + ((gx * 3 + gz * 7).rem_euclid(5)) as f32 * 0.6;
            let center = Vec3::new(gx as f32 * PILLAR_SPACING, height * 0.5, gz as f32 * PILLAR_SPACING);
            out.push(Placement {
                shape: Shape::Pillar,
                palette: 1 + (gx + gz).rem_euclid(2) as usize,
                transform: Mat4::from_translation(center) * Mat4::from_scale(Vec3::new(1.0, height, 1.0)),
            });
        }
    }

    out
}

/// Uploads [`layout`] as a mesh scene.
pub fn build(device: &wgpu::Device, layouts: &SceneLayouts) -> Result<MeshScene, RenderError> {
    let mut builder = MeshScene::builder();

    let ground = builder.mesh(MeshData::plane(GROUND_HALF_EXTENT));
    let pillar = builder.mesh(MeshData::cube(0.5));
    let materials = PALETTE.map(|color| builder.material(color));

    for p in layout() {
        let mesh = match p.shape {
            Shape::Ground => ground,
            Shape::Pillar => pillar,
        };
        builder.node(mesh, materials[p.palette], p.transform)?;
    }

    builder.build(device, layouts)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn one_ground_and_a_full_grid() {
        let l = layout();
        let side = (2 * PILLAR_GRID + 1) as usize;
        assert_eq!(l.len(), 1 + side * side);
        assert_eq!(l.iter().filter(|p| p.shape == Shape::Ground).count(), 1);
    }

    #[test]
    fn pillars_rest_on_the_ground_inside_it() {
        for p in layout().iter().filter(|p| p.shape == Shape::Pillar) {
            let bottom = p.transform.transform_point3(Vec3::new(0.0, -0.5, 0.0));
            assert!(bottom.y.abs() < 1e-5);
            assert!(bottom.x.abs() < GROUND_HALF_EXTENT && bottom.z.abs() < GROUND_HALF_EXTENT);
        }
    }

    #[test]
    fn palette_indices_are_valid() {
        assert!(layout().iter().all(|p| p.palette < PALETTE.len()));
    }
}
