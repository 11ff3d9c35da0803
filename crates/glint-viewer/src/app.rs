use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::Context;
use winit::event::{ElementState, KeyEvent, WindowEvent};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::WindowId;

use glint_engine::camera::CameraBuffer;
use glint_engine::cluster::{assign_lights, ClusterGrid, LightClusteringStage};
use glint_engine::config::RendererConfig;
use glint_engine::core::{App, AppControl, FrameCtx, FrameOutcome};
use glint_engine::lighting::LightSet;
use glint_engine::render::{
    ClusteredDeferredRenderer, ForwardPlusRenderer, RenderCtx, RenderStrategy, StrategyKind,
};
use glint_engine::scene::{MeshScene, SceneLayouts};

use crate::demo_scene;
use crate::lights::LightField;
use crate::orbit::Orbit;

const STATS_INTERVAL: Duration = Duration::from_secs(2);

/// Viewer options resolved from the command line.
#[derive(Debug, Clone)]
pub struct ViewerOptions {
    pub strategy: StrategyKind,
    pub lights: usize,
    pub stats: bool,
    pub renderer: RendererConfig,
}

/// GPU resources, created once the device exists.
struct Resources {
    camera: CameraBuffer,
    light_set: LightSet,
    grid: ClusterGrid,
    scene: MeshScene,
    forward: ForwardPlusRenderer,
    deferred: ClusteredDeferredRenderer,
}

impl Resources {
    fn strategy(&self, kind: StrategyKind) -> &dyn RenderStrategy {
        match kind {
            StrategyKind::ForwardPlus => &self.forward,
            StrategyKind::ClusteredDeferred => &self.deferred,
        }
    }
}

/// Frame counter for the periodic stats line.
#[derive(Debug)]
struct StatsWindow {
    since: Instant,
    frames: u32,
}

impl StatsWindow {
    fn new() -> Self {
        Self {
            since: Instant::now(),
            frames: 0,
        }
    }

    /// Counts one frame; returns frames per second once per interval.
    fn record(&mut self, now: Instant) -> Option<f32> {
        self.frames += 1;
        let elapsed = now.saturating_duration_since(self.since);
        if elapsed < STATS_INTERVAL {
            return None;
        }
        let fps = self.frames as f32 / elapsed.as_secs_f32();
        self.since = now;
        self.frames = 0;
        Some(fps)
    }
}

pub struct ViewerApp {
    options: ViewerOptions,
    active: StrategyKind,
    orbit: Orbit,
    lights: LightField,
    stats: StatsWindow,
    resources: Option<Resources>,
}

impl ViewerApp {
    pub fn new(options: ViewerOptions) -> Self {
        Self {
            active: options.strategy,
            orbit: Orbit::default(),
            lights: LightField::spiral(options.lights, demo_scene::GROUND_HALF_EXTENT * 0.9, 1.2),
            stats: StatsWindow::new(),
            resources: None,
            options,
        }
    }
}

impl App for ViewerApp {
    fn on_gpu_ready(&mut self, ctx: &RenderCtx<'_>) -> anyhow::Result<()> {
        let config = &self.options.renderer;
        LightSet::check_capacity(self.lights.len(), config.max_lights as usize)
            .context("too many lights requested")?;

        let camera = CameraBuffer::new(ctx.device);
        let light_set = LightSet::new(ctx.device, config.max_lights)?;
        let grid = ClusterGrid::from_config(&config.cluster);
        let clustering = Arc::new(LightClusteringStage::new(ctx.device, &camera, &light_set, grid)?);

        let layouts = SceneLayouts::new(ctx.device);
        let scene = demo_scene::build(ctx.device, &layouts).context("demo scene upload failed")?;

        let forward =
            ForwardPlusRenderer::new(ctx, Arc::clone(&clustering), &camera, &layouts, config)?;
        let deferred = ClusteredDeferredRenderer::new(ctx, clustering, &camera, &layouts, config)?;

        log::info!(
            "viewer ready: {} nodes, {} lights, starting with {} (space toggles)",
            scene.node_count(),
            self.lights.len(),
            self.active
        );

        self.resources = Some(Resources {
            camera,
            light_set,
            grid,
            scene,
            forward,
            deferred,
        });
        Ok(())
    }

    fn on_resize(&mut self, ctx: &RenderCtx<'_>) -> anyhow::Result<()> {
        let Some(res) = self.resources.as_mut() else {
            return Ok(());
        };
        res.forward.resize(ctx.device, ctx.size)?;
        res.deferred.resize(ctx.device, ctx.size)?;
        Ok(())
    }

    fn on_window_event(&mut self, _window_id: WindowId, event: &WindowEvent) -> AppControl {
        let WindowEvent::KeyboardInput {
            event:
                KeyEvent {
                    physical_key: PhysicalKey::Code(code),
                    state: ElementState::Pressed,
                    repeat: false,
                    ..
                },
            ..
        } = event
        else {
            return AppControl::Continue;
        };

        match code {
            KeyCode::Escape => AppControl::Exit,
            KeyCode::Space => {
                self.active = self.active.toggled();
                log::info!("switched to {}", self.active);
                AppControl::Continue
            }
            _ => AppControl::Continue,
        }
    }

    fn on_frame(&mut self, ctx: &mut FrameCtx<'_, '_>) -> anyhow::Result<AppControl> {
        let Some(res) = self.resources.as_mut() else {
            return Ok(AppControl::Continue);
        };

        let size = ctx.gpu.size();
        let t = ctx.time.elapsed;
        let camera = self.orbit.camera_at(t).uniforms(size.width, size.height);
        res.camera.write(ctx.gpu.queue(), &camera);

        let lights = self.lights.update(t);
        res.light_set
            .upload(ctx.gpu.queue(), lights)
            .context("light upload failed")?;

        let active = self.active;
        let outcome = ctx
            .render_frame(res.strategy(active), &res.scene)
            .with_context(|| format!("{active} frame failed"))?;
        if outcome != FrameOutcome::Presented {
            log::debug!("frame {} not presented: {outcome:?}", ctx.time.frame_index);
        }

        if let Some(fps) = self.stats.record(ctx.time.now) {
            log::info!("{}: {fps:.1} fps, {} lights", self.active, self.lights.len());
            if self.options.stats {
                let occupancy =
                    assign_lights(&res.grid, &camera, self.lights.current()).occupancy(&res.grid);
                log::info!(
                    "clusters: {} total, {} empty, {} saturated, max {} lights, mean {:.2}",
                    occupancy.clusters,
                    occupancy.empty,
                    occupancy.saturated,
                    occupancy.max,
                    occupancy.mean
                );
            }
        }

        Ok(AppControl::Continue)
    }
}
