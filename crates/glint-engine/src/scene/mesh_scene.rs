use glam::{Mat4, Vec4};
use wgpu::util::DeviceExt;

use crate::error::RenderError;

use super::{
    MaterialUniforms, MeshData, ModelUniforms, Primitive, SceneLayouts, SceneSource, SceneVisitor,
};

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct MaterialId(u32);

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct MeshId(u32);

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct NodeId(u32);

#[derive(Debug, Clone)]
struct NodeDesc {
    mesh: MeshId,
    material: MaterialId,
    transform: Mat4,
}

/// Collects materials, meshes and nodes on the CPU; [`build`](Self::build)
/// uploads everything at once.
#[derive(Debug, Default)]
pub struct MeshSceneBuilder {
    materials: Vec<Vec4>,
    meshes: Vec<MeshData>,
    nodes: Vec<NodeDesc>,
}

impl MeshSceneBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn material(&mut self, base_color: Vec4) -> MaterialId {
        self.materials.push(base_color);
        MaterialId(self.materials.len() as u32 - 1)
    }

    pub fn mesh(&mut self, data: MeshData) -> MeshId {
        self.meshes.push(data);
        MeshId(self.meshes.len() as u32 - 1)
    }

    /// Places `mesh` with `material` at `transform` (object to world).
    pub fn node(
        &mut self,
        mesh: MeshId,
        material: MaterialId,
        transform: Mat4,
    ) -> Result<NodeId, RenderError> {
        if mesh.0 as usize >= self.meshes.len() {
            return Err(RenderError::resource("scene node", format!("unknown {mesh:?}")));
        }
        if material.0 as usize >= self.materials.len() {
            return Err(RenderError::resource("scene node", format!("unknown {material:?}")));
        }
        self.nodes.push(NodeDesc {
            mesh,
            material,
            transform,
        });
        Ok(NodeId(self.nodes.len() as u32 - 1))
    }

    pub fn build(self, device: &wgpu::Device, layouts: &SceneLayouts) -> Result<MeshScene, RenderError> {
        if let Some(i) = self.meshes.iter().position(|m| m.indices.is_empty()) {
            return Err(RenderError::resource("scene mesh", format!("mesh {i} has no triangles")));
        }

        let meshes = self
            .meshes
            .iter()
            .map(|data| GpuMesh {
                vertex_buffer: device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                    label: Some("glint mesh vbo"),
                    contents: bytemuck::cast_slice(&data.vertices),
                    usage: wgpu::BufferUsages::VERTEX,
                }),
                index_buffer: device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                    label: Some("glint mesh ibo"),
                    contents: bytemuck::cast_slice(&data.indices),
                    usage: wgpu::BufferUsages::INDEX,
                }),
                index_count: data.index_count(),
            })
            .collect();

        let materials = self
            .materials
            .iter()
            .map(|&color| {
                UniformBinding::new(
                    device,
                    &layouts.material,
                    "glint material",
                    bytemuck::bytes_of(&MaterialUniforms::new(color)),
                )
            })
            .collect();

        let nodes: Vec<GpuNode> = self
            .nodes
            .iter()
            .map(|n| GpuNode {
                mesh: n.mesh.0 as usize,
                material: n.material.0 as usize,
                uniforms: UniformBinding::new(
                    device,
                    &layouts.node,
                    "glint node",
                    bytemuck::bytes_of(&ModelUniforms::new(n.transform)),
                ),
            })
            .collect();

        let draw_order = draw_order(nodes.iter().map(|n| n.material));

        log::info!(
            "scene built: {} meshes, {} materials, {} nodes",
            self.meshes.len(),
            self.materials.len(),
            nodes.len()
        );

        Ok(MeshScene {
            meshes,
            materials,
            nodes,
            draw_order,
        })
    }
}

#[derive(Debug)]
struct GpuMesh {
    vertex_buffer: wgpu::Buffer,
    index_buffer: wgpu::Buffer,
    index_count: u32,
}

/// Bind group over a uniform written once at build time. The bind group keeps
/// the buffer alive.
#[derive(Debug)]
struct UniformBinding {
    bind_group: wgpu::BindGroup,
}

impl UniformBinding {
    fn new(device: &wgpu::Device, layout: &wgpu::BindGroupLayout, label: &str, contents: &[u8]) -> Self {
        let buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(label),
            contents,
            usage: wgpu::BufferUsages::UNIFORM,
        });
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some(label),
            layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: buffer.as_entire_binding(),
            }],
        });
        Self { bind_group }
    }
}

#[derive(Debug)]
struct GpuNode {
    mesh: usize,
    material: usize,
    uniforms: UniformBinding,
}

/// GPU-resident scene of instanced meshes. Implements [`SceneSource`].
#[derive(Debug)]
pub struct MeshScene {
    meshes: Vec<GpuMesh>,
    materials: Vec<UniformBinding>,
    nodes: Vec<GpuNode>,
    /// Node indices grouped by material.
    draw_order: Vec<usize>,
}

impl MeshScene {
    pub fn builder() -> MeshSceneBuilder {
        MeshSceneBuilder::new()
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }
}

impl SceneSource for MeshScene {
    fn visit(&self, visitor: &mut dyn SceneVisitor) {
        let mut bound_material = None;
        for &i in &self.draw_order {
            let node = &self.nodes[i];
            visitor.node(&node.uniforms.bind_group);
            if bound_material != Some(node.material) {
                visitor.material(&self.materials[node.material].bind_group);
                bound_material = Some(node.material);
            }
            let mesh = &self.meshes[node.mesh];
            visitor.primitive(&Primitive {
                vertex_buffer: &mesh.vertex_buffer,
                index_buffer: &mesh.index_buffer,
                index_count: mesh.index_count,
            });
        }
    }
}

/// Node indices stably grouped by material, so each material is bound once.
fn draw_order(materials: impl Iterator<Item = usize>) -> Vec<usize> {
    let mut order: Vec<(usize, usize)> = materials.enumerate().map(|(i, m)| (m, i)).collect();
    order.sort_by_key(|&(m, _)| m);
    order.into_iter().map(|(_, i)| i).collect()
}
