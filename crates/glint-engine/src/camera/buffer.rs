use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec2};

/// Camera data shared by every stage.
///
/// Layout matches `struct Camera` in `types.wgsl` (208 bytes).
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct CameraUniforms {
    pub view_proj: [[f32; 4]; 4],
    pub view: [[f32; 4]; 4],
    pub inv_proj: [[f32; 4]; 4],
    /// Viewport size in physical pixels.
    pub viewport: [f32; 2],
    pub near: f32,
    pub far: f32,
}

impl CameraUniforms {
    pub fn new(view: Mat4, proj: Mat4, viewport: Vec2, near: f32, far: f32) -> Self {
        Self {
            view_proj: (proj * view).to_cols_array_2d(),
            view: view.to_cols_array_2d(),
            inv_proj: proj.inverse().to_cols_array_2d(),
            viewport: viewport.to_array(),
            near,
            far,
        }
    }

    #[inline]
    pub fn view_matrix(&self) -> Mat4 {
        Mat4::from_cols_array_2d(&self.view)
    }

    #[inline]
    pub fn inverse_projection(&self) -> Mat4 {
        Mat4::from_cols_array_2d(&self.inv_proj)
    }

    #[inline]
    pub fn viewport(&self) -> Vec2 {
        Vec2::from_array(self.viewport)
    }
}

/// Uniform buffer holding the current frame's [`CameraUniforms`].
///
/// Owned by the camera collaborator. Renderers bind the buffer handle; they never
/// copy its contents.
#[derive(Debug, Clone)]
pub struct CameraBuffer {
    buffer: wgpu::Buffer,
}

impl CameraBuffer {
    pub fn new(device: &wgpu::Device) -> Self {
        let buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("glint camera ubo"),
            size: std::mem::size_of::<CameraUniforms>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        Self { buffer }
    }

    /// Writes this frame's camera. Must happen before the frame is encoded.
    pub fn write(&self, queue: &wgpu::Queue, uniforms: &CameraUniforms) {
        queue.write_buffer(&self.buffer, 0, bytemuck::bytes_of(uniforms));
    }

    pub fn buffer(&self) -> &wgpu::Buffer {
        &self.buffer
    }

    pub(crate) fn min_binding_size() -> std::num::NonZeroU64 {
        crate::bindings::size_of_nonzero::<CameraUniforms>()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uniform_layout_is_208_bytes() {
        assert_eq!(std::mem::size_of::<CameraUniforms>(), 208);
        assert_eq!(std::mem::size_of::<CameraUniforms>() % 16, 0);
    }

    #[test]
    fn inverse_projection_round_trips() {
        let proj = Mat4::perspective_rh(1.0, 16.0 / 9.0, 0.1, 100.0);
        let u = CameraUniforms::new(Mat4::IDENTITY, proj, Vec2::new(1600.0, 900.0), 0.1, 100.0);
        let id = u.inverse_projection() * proj;
        assert!(id.abs_diff_eq(Mat4::IDENTITY, 1e-4));
    }
}
