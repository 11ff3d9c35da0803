use std::sync::Arc;

use winit::dpi::PhysicalSize;

use crate::bindings::{lighting_entries, lighting_resources, texture_entry, uniform_entry};
use crate::camera::CameraBuffer;
use crate::cluster::LightClusteringStage;
use crate::config::RendererConfig;
use crate::error::RenderError;
use crate::scene::{SceneLayouts, SceneSource};
use crate::shaders;

use super::pass::DrawVisitor;
use super::pipeline::{cleared_color, depth_attachment, depth_state, mesh_pipeline, opaque_target};
use super::targets::{DepthTarget, GBuffer};
use super::{RenderCtx, RenderStrategy, RenderTarget};

/// First G-buffer binding in the resolve bind group (after the five lighting bindings).
const GBUFFER_FIRST_BINDING: u32 = 5;

/// Clustered deferred: cluster the lights, rasterize surface attributes into the
/// G-buffer, then shade each pixel once in a full-screen resolve pass.
#[derive(Debug)]
pub struct ClusteredDeferredRenderer {
    clustering: Arc<LightClusteringStage>,
    camera: CameraBuffer,

    gbuffer_pipeline: wgpu::RenderPipeline,
    camera_bind_group: wgpu::BindGroup,

    resolve_pipeline: wgpu::RenderPipeline,
    resolve_layout: wgpu::BindGroupLayout,
    resolve_bind_group: wgpu::BindGroup,

    gbuffer: GBuffer,
    depth: DepthTarget,

    gbuffer_format: wgpu::TextureFormat,
    depth_format: wgpu::TextureFormat,
    clear_color: wgpu::Color,
}

impl ClusteredDeferredRenderer {
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

        let gbuffer = GBuffer::new(device, size, config.gbuffer_format)?;
        let depth = DepthTarget::new(device, size, config.depth_format)?;

        // ── geometry pass ─────────────────────────────────────────────────

        let gbuffer_shader =
            shaders::create_module(device, "glint gbuffer shader", shaders::gbuffer_source());

        let camera_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("glint gbuffer camera bgl"),
            entries: &[uniform_entry(
                0,
                wgpu::ShaderStages::VERTEX,
                CameraBuffer::min_binding_size(),
            )],
        });

        let gbuffer_pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("glint gbuffer pipeline layout"),
            bind_group_layouts: &[&camera_layout, &layouts.node, &layouts.material],
            immediate_size: 0,
        });

        let gbuffer_pipeline = mesh_pipeline(
            device,
            "glint gbuffer pipeline",
            &gbuffer_shader,
            &gbuffer_pipeline_layout,
            &[
                opaque_target(config.gbuffer_format),
                opaque_target(config.gbuffer_format),
                opaque_target(config.gbuffer_format),
            ],
            depth_state(config.depth_format, config.depth_compare),
        );

        let camera_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("glint gbuffer camera bind group"),
            layout: &camera_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: camera.buffer().as_entire_binding(),
            }],
        });

        // ── resolve pass ──────────────────────────────────────────────────

        let resolve_shader = shaders::create_module(
            device,
            "glint deferred resolve shader",
            shaders::deferred_resolve_source(),
        );

        let lighting = lighting_entries();
        let resolve_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("glint deferred resolve bgl"),
            entries: &[
                lighting[0],
                lighting[1],
                lighting[2],
                lighting[3],
                lighting[4],
                texture_entry(GBUFFER_FIRST_BINDING),
                texture_entry(GBUFFER_FIRST_BINDING + 1),
                texture_entry(GBUFFER_FIRST_BINDING + 2),
            ],
        });

        let resolve_pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("glint deferred resolve pipeline layout"),
            bind_group_layouts: &[&resolve_layout],
            immediate_size: 0,
        });

        let resolve_pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("glint deferred resolve pipeline"),
            layout: Some(&resolve_pipeline_layout),

            vertex: wgpu::VertexState {
                module: &resolve_shader,
                entry_point: Some(shaders::RESOLVE_VERTEX_ENTRY),
                compilation_options: Default::default(),
                buffers: &[],
            },

            fragment: Some(wgpu::FragmentState {
                module: &resolve_shader,
                entry_point: Some(shaders::RESOLVE_FRAGMENT_ENTRY),
                compilation_options: Default::default(),
                targets: &[opaque_target(surface_format)],
            }),

            primitive: wgpu::PrimitiveState::default(),
            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            multiview_mask: None,
            cache: None,
        });

        let resolve_bind_group =
            Self::resolve_bind_group(device, &resolve_layout, camera, &clustering, &gbuffer);

        log::info!(
            "clustered deferred renderer ready: {}x{} {surface_format:?}, g-buffer {:?}",
            size.width,
            size.height,
            config.gbuffer_format
        );

        Ok(Self {
            clustering,
            camera: camera.clone(),
            gbuffer_pipeline,
            camera_bind_group,
            resolve_pipeline,
            resolve_layout,
            resolve_bind_group,
            gbuffer,
            depth,
            gbuffer_format: config.gbuffer_format,
            depth_format: config.depth_format,
            clear_color: config.clear_color,
        })
    }

    fn resolve_bind_group(
        device: &wgpu::Device,
        layout: &wgpu::BindGroupLayout,
        camera: &CameraBuffer,
        clustering: &LightClusteringStage,
        gbuffer: &GBuffer,
    ) -> wgpu::BindGroup {
        let [l0, l1, l2, l3, l4] = lighting_resources(camera, clustering);
        let [position, normal, albedo] = gbuffer.views();

        device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("glint deferred resolve bind group"),
            layout,
            entries: &[
                l0,
                l1,
                l2,
                l3,
                l4,
                wgpu::BindGroupEntry {
                    binding: GBUFFER_FIRST_BINDING,
                    resource: wgpu::BindingResource::TextureView(position),
                },
                wgpu::BindGroupEntry {
                    binding: GBUFFER_FIRST_BINDING + 1,
                    resource: wgpu::BindingResource::TextureView(normal),
                },
                wgpu::BindGroupEntry {
                    binding: GBUFFER_FIRST_BINDING + 2,
                    resource: wgpu::BindingResource::TextureView(albedo),
                },
            ],
        })
    }
}

impl RenderStrategy for ClusteredDeferredRenderer {
    fn name(&self) -> &'static str {
        "clustered deferred"
    }

    fn resize(&mut self, device: &wgpu::Device, size: PhysicalSize<u32>) -> Result<(), RenderError> {
        let gbuffer = GBuffer::new(device, size, self.gbuffer_format)?;
        let depth = DepthTarget::new(device, size, self.depth_format)?;

        // Only the resolve group references the images.
        self.resolve_bind_group = Self::resolve_bind_group(
            device,
            &self.resolve_layout,
            &self.camera,
            &self.clustering,
            &gbuffer,
        );
        self.gbuffer = gbuffer;
        self.depth = depth;

        log::debug!("clustered deferred resized to {}x{}", size.width, size.height);
        Ok(())
    }

    fn encode(&self, target: &mut RenderTarget<'_>, scene: &dyn SceneSource) {
        self.clustering.encode(target.encoder);

        {
            let [position, normal, albedo] = self.gbuffer.views();
            let mut gpass = target.encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("glint gbuffer pass"),
                color_attachments: &[
                    cleared_color(position, wgpu::Color::TRANSPARENT),
                    cleared_color(normal, wgpu::Color::TRANSPARENT),
                    cleared_color(albedo, wgpu::Color::TRANSPARENT),
                ],
                depth_stencil_attachment: Some(depth_attachment(self.depth.view())),
                timestamp_writes: None,
                occlusion_query_set: None,
                multiview_mask: None,
            });

            gpass.set_pipeline(&self.gbuffer_pipeline);
            gpass.set_bind_group(0, &self.camera_bind_group, &[]);

            let mut visitor = DrawVisitor::new(&mut gpass);
            scene.visit(&mut visitor);
            log::trace!("gbuffer pass: {} draws", visitor.draws());
        }

        let mut rpass = target.encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("glint deferred resolve pass"),
            color_attachments: &[cleared_color(target.color_view, self.clear_color)],
            depth_stencil_attachment: None,
            timestamp_writes: None,
            occlusion_query_set: None,
            multiview_mask: None,
        });

        rpass.set_pipeline(&self.resolve_pipeline);
        rpass.set_bind_group(0, &self.resolve_bind_group, &[]);
        rpass.draw(0..6, 0..1);
    }
}
