use winit::event::WindowEvent;
use winit::window::WindowId;

use crate::render::RenderCtx;

use super::ctx::FrameCtx;

/// Control directive returned by app callbacks.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum AppControl {
    Continue,
    Exit,
}

/// Application contract implemented by higher layers.
///
/// Call order: `on_gpu_ready` once, then any mix of `on_window_event`,
/// `on_resize` and `on_frame`. An `Err` from any hook ends the run.
pub trait App {
    /// The device and surface exist; build GPU resources here.
    fn on_gpu_ready(&mut self, ctx: &RenderCtx<'_>) -> anyhow::Result<()>;

    /// The surface was reconfigured to `ctx.size` (never zero-sized).
    fn on_resize(&mut self, ctx: &RenderCtx<'_>) -> anyhow::Result<()> {
        let _ = ctx;
        Ok(())
    }

    fn on_window_event(&mut self, window_id: WindowId, event: &WindowEvent) -> AppControl {
        let _ = (window_id, event);
        AppControl::Continue
    }

    /// Called once per redraw. An `Err` is fatal: the run ends and
    /// `Runtime::run` returns it.
    fn on_frame(&mut self, ctx: &mut FrameCtx<'_, '_>) -> anyhow::Result<AppControl>;
}
