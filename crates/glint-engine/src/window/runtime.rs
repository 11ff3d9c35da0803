use anyhow::{Context, Result};
use ouroboros::self_referencing;

use winit::application::ApplicationHandler;
use winit::dpi::{LogicalSize, PhysicalSize};
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::window::{Window, WindowId};

use crate::core::{App as CoreApp, AppControl, FrameCtx};
use crate::device::{Gpu, GpuInit};
use crate::render::RenderCtx;
use crate::time::FrameClock;

/// Window/runtime configuration.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub title: String,
    pub initial_size: LogicalSize<f64>,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            title: "glint".to_string(),
            initial_size: LogicalSize::new(1280.0, 720.0),
        }
    }
}

/// Entry point for the runtime.
pub struct Runtime;

impl Runtime {
    /// Opens one window, brings up the GPU on it and drives `app` until exit.
    pub fn run<A>(config: RuntimeConfig, gpu_init: GpuInit, app: A) -> Result<()>
    where
        A: 'static + CoreApp,
    {
        let event_loop = EventLoop::new().context("failed to create winit EventLoop")?;
        let mut state = AppState::new(config, gpu_init, app);

        event_loop
            .run_app(&mut state)
            .context("winit event loop terminated with error")?;

        state.into_result()
    }
}

#[self_referencing]
struct WindowEntry {
    clock: FrameClock,

    window: Window,

    #[borrows(window)]
    #[covariant]
    gpu: Gpu<'this>,
}

fn render_ctx<'a>(gpu: &'a Gpu<'_>) -> RenderCtx<'a> {
    RenderCtx::new(gpu.device(), gpu.queue(), gpu.surface_format(), gpu.size())
}

struct AppState<A>
where
    A: CoreApp + 'static,
{
    config: RuntimeConfig,
    gpu_init: GpuInit,
    app: A,

    entry: Option<WindowEntry>,
    exit_requested: bool,
    /// First fatal error; returned from `Runtime::run`.
    failure: Option<anyhow::Error>,
}

impl<A> AppState<A>
where
    A: CoreApp + 'static,
{
    fn new(config: RuntimeConfig, gpu_init: GpuInit, app: A) -> Self {
        Self {
            config,
            gpu_init,
            app,
            entry: None,
            exit_requested: false,
            failure: None,
        }
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop, err: anyhow::Error) {
        self.record_failure(err);
        event_loop.exit();
    }

    /// Keeps the first fatal error and requests exit.
    fn record_failure(&mut self, err: anyhow::Error) {
        log::error!("{err:#}");
        self.failure.get_or_insert(err);
        self.exit_requested = true;
    }

    /// Applies the result of one `on_frame` call. Returns `true` when the loop
    /// must stop.
    fn finish_frame(&mut self, result: Result<AppControl>) -> bool {
        match result {
            Ok(AppControl::Continue) => false,
            Ok(AppControl::Exit) => {
                self.exit_requested = true;
                true
            }
            Err(err) => {
                self.record_failure(err.context("frame failed"));
                true
            }
        }
    }

    fn into_result(self) -> Result<()> {
        match self.failure {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    fn create_window_entry(&mut self, event_loop: &ActiveEventLoop) -> Result<WindowEntry> {
        let attrs = Window::default_attributes()
            .with_title(self.config.title.clone())
            .with_inner_size(self.config.initial_size);

        let window = event_loop
            .create_window(attrs)
            .context("failed to create window")?;

        let gpu_init = self.gpu_init.clone();

        WindowEntryTryBuilder {
            clock: FrameClock::default(),
            window,
            gpu_builder: |w| pollster::block_on(Gpu::new(w, gpu_init)),
        }
        .try_build()
        .context("GPU initialization failed")
    }

    fn handle_resize(&mut self, event_loop: &ActiveEventLoop, new_size: PhysicalSize<u32>) {
        let (app, entry) = (&mut self.app, &mut self.entry);
        let Some(entry) = entry.as_mut() else { return };

        entry.with_gpu_mut(|gpu| gpu.resize(new_size));
        if new_size.width == 0 || new_size.height == 0 {
            // Minimized; keep the old targets until a real size arrives.
            return;
        }

        let result = entry.with_gpu(|gpu| app.on_resize(&render_ctx(gpu)));
        entry.with_window(|w| w.request_redraw());

        if let Err(err) = result {
            self.fail(event_loop, err.context("resize failed"));
        }
    }
}

impl<A> ApplicationHandler for AppState<A>
where
    A: CoreApp + 'static,
{
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.entry.is_some() {
            return;
        }

        let entry = match self.create_window_entry(event_loop) {
            Ok(entry) => entry,
            Err(err) => return self.fail(event_loop, err),
        };

        let ready = entry.with_gpu(|gpu| self.app.on_gpu_ready(&render_ctx(gpu)));
        if let Err(err) = ready {
            return self.fail(event_loop, err.context("application setup failed"));
        }

        entry.with_window(|w| w.request_redraw());
        self.entry = Some(entry);
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        if self.exit_requested {
            event_loop.exit();
            return;
        }

        event_loop.set_control_flow(ControlFlow::Wait);

        // Continuous redraw: lights and camera animate every frame.
        if let Some(entry) = &self.entry {
            entry.with_window(|w| w.request_redraw());
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        window_id: WindowId,
        event: WindowEvent,
    ) {
        if self.exit_requested {
            event_loop.exit();
            return;
        }

        if self.app.on_window_event(window_id, &event) == AppControl::Exit {
            self.exit_requested = true;
            event_loop.exit();
            return;
        }

        match &event {
            WindowEvent::CloseRequested => {
                self.entry = None;
                self.exit_requested = true;
                event_loop.exit();
            }

            WindowEvent::Resized(new_size) => self.handle_resize(event_loop, *new_size),

            WindowEvent::ScaleFactorChanged { .. } => {
                let Some(new_size) = self.entry.as_ref().map(|e| e.with_window(|w| w.inner_size()))
                else {
                    return;
                };
                self.handle_resize(event_loop, new_size);
            }

            WindowEvent::RedrawRequested => {
                // Split borrows to avoid `self` capture inside `ouroboros` closures.
                let (app, entry) = (&mut self.app, &mut self.entry);
                let Some(entry) = entry.as_mut() else { return };

                let result = entry.with_mut(|fields| {
                    let mut ctx = FrameCtx {
                        window: fields.window,
                        gpu: fields.gpu,
                        time: fields.clock.tick(),
                    };
                    app.on_frame(&mut ctx)
                });

                if self.finish_frame(result) {
                    event_loop.exit();
                }
            }

            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RenderError;

    struct Idle;

    impl CoreApp for Idle {
        fn on_gpu_ready(&mut self, _ctx: &RenderCtx<'_>) -> Result<()> {
            Ok(())
        }

        fn on_frame(&mut self, _ctx: &mut FrameCtx<'_, '_>) -> Result<AppControl> {
            Ok(AppControl::Continue)
        }
    }

    fn state() -> AppState<Idle> {
        AppState::new(RuntimeConfig::default(), GpuInit::default(), Idle)
    }

    #[test]
    fn continue_keeps_running() {
        let mut s = state();
        assert!(!s.finish_frame(Ok(AppControl::Continue)));
        assert!(!s.exit_requested);
        assert!(s.into_result().is_ok());
    }

    #[test]
    fn requested_exit_is_a_clean_run() {
        let mut s = state();
        assert!(s.finish_frame(Ok(AppControl::Exit)));
        assert!(s.exit_requested);
        assert!(s.into_result().is_ok());
    }

    #[test]
    fn frame_error_fails_the_run() {
        let mut s = state();
        let lost = RenderError::DeviceLost("Unknown: test".into());
        assert!(s.finish_frame(Err(anyhow::Error::new(lost))));
        assert!(s.exit_requested);

        let err = s.into_result().unwrap_err();
        assert!(matches!(
            err.downcast_ref::<RenderError>(),
            Some(RenderError::DeviceLost(_))
        ));
    }

    #[test]
    fn first_failure_is_kept() {
        let mut s = state();
        s.finish_frame(Err(anyhow::Error::new(RenderError::OutOfMemory)));
        s.finish_frame(Err(anyhow::anyhow!("later")));
        let err = s.into_result().unwrap_err();
        assert!(matches!(err.downcast_ref::<RenderError>(), Some(RenderError::OutOfMemory)));
    }
}
