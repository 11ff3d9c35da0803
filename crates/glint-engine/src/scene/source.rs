/// Geometry of one indexed draw. Indices are `u32`, vertices are [`Vertex`](super::Vertex).
#[derive(Debug, Copy, Clone)]
pub struct Primitive<'a> {
    pub vertex_buffer: &'a wgpu::Buffer,
    pub index_buffer: &'a wgpu::Buffer,
    pub index_count: u32,
}

/// Receives the scene's draw stream.
///
/// Bind group callbacks always precede the primitives they apply to:
/// `node` binds group 1 (model uniforms), `material` binds group 2.
pub trait SceneVisitor {
    fn node(&mut self, bind_group: &wgpu::BindGroup);
    fn material(&mut self, bind_group: &wgpu::BindGroup);
    fn primitive(&mut self, primitive: &Primitive<'_>);
}

/// Anything that can replay its drawable content into a render pass.
///
/// Visited once per geometry pass; implementations must be side-effect free
/// so both render strategies see the same stream.
pub trait SceneSource {
    fn visit(&self, visitor: &mut dyn SceneVisitor);
}
