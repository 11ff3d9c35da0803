use crate::scene::{Primitive, SceneLayouts, SceneVisitor, INDEX_FORMAT};

/// Replays a scene's draw stream into a render pass.
pub(super) struct DrawVisitor<'p, 'e> {
    pass: &'p mut wgpu::RenderPass<'e>,
    draws: u32,
}

impl<'p, 'e> DrawVisitor<'p, 'e> {
    pub(super) fn new(pass: &'p mut wgpu::RenderPass<'e>) -> Self {
        Self { pass, draws: 0 }
    }

    pub(super) fn draws(&self) -> u32 {
        self.draws
    }
}

impl SceneVisitor for DrawVisitor<'_, '_> {
    fn node(&mut self, bind_group: &wgpu::BindGroup) {
        self.pass.set_bind_group(SceneLayouts::NODE_GROUP, bind_group, &[]);
    }

    fn material(&mut self, bind_group: &wgpu::BindGroup) {
        self.pass.set_bind_group(SceneLayouts::MATERIAL_GROUP, bind_group, &[]);
    }

    fn primitive(&mut self, primitive: &Primitive<'_>) {
        self.pass.set_vertex_buffer(0, primitive.vertex_buffer.slice(..));
        self.pass.set_index_buffer(primitive.index_buffer.slice(..), INDEX_FORMAT);
        self.pass.draw_indexed(0..primitive.index_count, 0, 0..1);
        self.draws += 1;
    }
}
