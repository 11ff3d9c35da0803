use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec4};

use crate::bindings::{size_of_nonzero, uniform_entry};

/// Per-node uniforms (`ModelUniforms` in `mesh.wgsl`).
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct ModelUniforms {
    pub model: [[f32; 4]; 4],
    /// Inverse transpose of `model`, so non-uniform scales keep normals perpendicular.
    pub normal: [[f32; 4]; 4],
}

impl ModelUniforms {
    pub fn new(model: Mat4) -> Self {
        Self {
            model: model.to_cols_array_2d(),
            normal: model.inverse().transpose().to_cols_array_2d(),
        }
    }
}

/// Per-material uniforms (`MaterialUniforms` in `mesh.wgsl`).
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct MaterialUniforms {
    /// Linear RGB albedo; alpha is ignored.
    pub base_color: [f32; 4],
}

impl MaterialUniforms {
    pub fn new(base_color: Vec4) -> Self {
        Self {
            base_color: base_color.to_array(),
        }
    }
}

/// Bind group layouts of the scene-owned groups, shared by every mesh pipeline.
#[derive(Debug)]
pub struct SceneLayouts {
    pub node: wgpu::BindGroupLayout,
    pub material: wgpu::BindGroupLayout,
}

impl SceneLayouts {
    pub const NODE_GROUP: u32 = 1;
    pub const MATERIAL_GROUP: u32 = 2;

    pub fn new(device: &wgpu::Device) -> Self {
        let node = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("glint node bgl"),
            entries: &[uniform_entry(
                0,
                wgpu::ShaderStages::VERTEX,
                size_of_nonzero::<ModelUniforms>(),
            )],
        });

        let material = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("glint material bgl"),
            entries: &[uniform_entry(
                0,
                wgpu::ShaderStages::VERTEX_FRAGMENT,
                size_of_nonzero::<MaterialUniforms>(),
            )],
        });

        Self { node, material }
    }
}
