use std::sync::Arc;

use winit::dpi::PhysicalSize;

use crate::bindings::{lighting_entries, lighting_resources};
use crate::camera::CameraBuffer;
use crate::cluster::LightClusteringStage;
use crate::config::RendererConfig;
use crate::error::RenderError;
use crate::scene::{SceneLayouts, SceneSource};
use crate::shaders;

use super::pass::DrawVisitor;
use super::pipeline::{cleared_color, depth_attachment, depth_state, mesh_pipeline, opaque_target};
use super::targets::DepthTarget;
use super::{RenderCtx, RenderStrategy, RenderTarget};

/// Forward+: cluster the lights, then shade every rasterized fragment directly
/// against its cluster's light run.
#[derive(Debug)]
pub struct ForwardPlusRenderer {
    clustering: Arc<LightClusteringStage>,

    pipeline: wgpu::RenderPipeline,
    bind_group: wgpu::BindGroup,

    depth: DepthTarget,
    depth_format: wgpu::TextureFormat,
    clear_color: wgpu::Color,
}

impl ForwardPlusRenderer {
    pub fn new(
        ctx: &RenderCtx<'_>,
        clustering: Arc<LightClusteringStage>,
        camera: &CameraBuffer,
        layouts: &SceneLayouts,
        config: &RendererConfig,
    ) -> Result<Self, RenderError> {
        let RenderCtx {
            device,
            surface_format,
            size,
            ..
        } = *ctx;
        let depth = DepthTarget::new(device, size, config.depth_format)?;

        let shader = shaders::create_module(
            device,
            "glint forward+ shader",
            shaders::forward_plus_source(),
        );

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("glint forward+ bgl"),
            entries: &lighting_entries(),
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("glint forward+ pipeline layout"),
            bind_group_layouts: &[&bind_group_layout, &layouts.node, &layouts.material],
            immediate_size: 0,
        });

        let pipeline = mesh_pipeline(
            device,
            "glint forward+ pipeline",
            &shader,
            &pipeline_layout,
            &[opaque_target(surface_format)],
            depth_state(config.depth_format, config.depth_compare),
        );

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("glint forward+ bind group"),
            layout: &bind_group_layout,
            entries: &lighting_resources(camera, &clustering),
        });

        log::info!(
            "forward+ renderer ready: {}x{} {surface_format:?}",
            size.width,
            size.height
        );

        Ok(Self {
            clustering,
            pipeline,
            bind_group,
            depth,
            depth_format: config.depth_format,
            clear_color: config.clear_color,
        })
    }
}

impl RenderStrategy for ForwardPlusRenderer {
    fn name(&self) -> &'static str {
        "forward+"
    }

    fn resize(&mut self, device: &wgpu::Device, size: PhysicalSize<u32>) -> Result<(), RenderError> {
        // The lighting bind group references no size-dependent image.
        self.depth = DepthTarget::new(device, size, self.depth_format)?;
        log::debug!("forward+ resized to {}x{}", size.width, size.height);
        Ok(())
    }

    fn encode(&self, target: &mut RenderTarget<'_>, scene: &dyn SceneSource) {
        self.clustering.encode(target.encoder);

        let mut rpass = target.encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("glint forward+ pass"),
            color_attachments: &[cleared_color(target.color_view, self.clear_color)],
            depth_stencil_attachment: Some(depth_attachment(self.depth.view())),
            timestamp_writes: None,
            occlusion_query_set: None,
            multiview_mask: None,
        });

        rpass.set_pipeline(&self.pipeline);
        rpass.set_bind_group(0, &self.bind_group, &[]);

        let mut visitor = DrawVisitor::new(&mut rpass);
        scene.visit(&mut visitor);
        log::trace!("forward+ frame: {} draws", visitor.draws());
    }
}
