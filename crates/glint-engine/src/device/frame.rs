/// A single acquired frame: the surface texture, its view and the one command
/// encoder every stage records into.
///
/// Short-lived. Holding the surface texture prevents acquisition of the next frame.
pub struct GpuFrame {
    pub surface_texture: wgpu::SurfaceTexture,
    pub view: wgpu::TextureView,
    pub encoder: wgpu::CommandEncoder,
}
