use glam::Vec3;

use super::Vertex;

/// CPU-side indexed triangle mesh, counter-clockwise front faces.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MeshData {
    pub vertices: Vec<Vertex>,
    pub indices: Vec<u32>,
}

impl MeshData {
    /// Axis-aligned cube centred on the origin, flat-shaded (four vertices per face).
    pub fn cube(half_extent: f32) -> Self {
        // (normal, u, v) with u × v == normal.
        let faces = [
            (Vec3::X, Vec3::Y, Vec3::Z),
            (Vec3::NEG_X, Vec3::Z, Vec3::Y),
            (Vec3::Y, Vec3::Z, Vec3::X),
            (Vec3::NEG_Y, Vec3::X, Vec3::Z),
            (Vec3::Z, Vec3::X, Vec3::Y),
            (Vec3::NEG_Z, Vec3::Y, Vec3::X),
        ];

        let mut mesh = Self::default();
        for (normal, u, v) in faces {
            mesh.push_quad(normal * half_extent, u * half_extent, v * half_extent, normal);
        }
        mesh
    }

    /// Square in the XZ plane facing +Y.
    pub fn plane(half_extent: f32) -> Self {
        let mut mesh = Self::default();
        mesh.push_quad(Vec3::ZERO, Vec3::Z * half_extent, Vec3::X * half_extent, Vec3::Y);
        mesh
    }

    pub fn index_count(&self) -> u32 {
        self.indices.len() as u32
    }

    fn push_quad(&mut self, center: Vec3, u: Vec3, v: Vec3, normal: Vec3) {
        let base = self.vertices.len() as u32;
        for corner in [center - u - v, center + u - v, center + u + v, center - u + v] {
            self.vertices.push(Vertex {
                position: corner.to_array(),
                normal: normal.to_array(),
            });
        }
        self.indices
            .extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
    }
}
