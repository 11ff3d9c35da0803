use winit::window::Window;

use crate::device::{Gpu, SurfaceErrorAction};
use crate::error::RenderError;
use crate::render::{RenderCtx, RenderStrategy, RenderTarget};
use crate::scene::SceneSource;
use crate::time::FrameTime;

/// What happened to a frame that did not fail.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum FrameOutcome {
    Presented,
    /// Surface unavailable this frame (timeout, zero-sized window).
    Skipped,
    /// Surface was lost or outdated and has been reconfigured; nothing drawn.
    Reconfigured,
}

impl FrameOutcome {
    /// Frame result for a failed surface acquisition.
    pub fn from_surface_action(action: SurfaceErrorAction) -> Result<Self, RenderError> {
        match action {
            SurfaceErrorAction::Reconfigured => Ok(Self::Reconfigured),
            SurfaceErrorAction::SkipFrame => Ok(Self::Skipped),
            SurfaceErrorAction::Fatal => Err(RenderError::OutOfMemory),
        }
    }
}

/// Per-frame context passed to `core::App::on_frame`.
///
/// Lifetimes:
/// - `'a` is the duration of the callback invocation
/// - `'w` is the window-borrow lifetime carried by `Gpu<'w>`
pub struct FrameCtx<'a, 'w> {
    pub window: &'a Window,
    pub gpu: &'a mut Gpu<'w>,
    pub time: FrameTime,
}

impl<'a, 'w> FrameCtx<'a, 'w> {
    pub fn render_ctx(&self) -> RenderCtx<'_> {
        RenderCtx::new(
            self.gpu.device(),
            self.gpu.queue(),
            self.gpu.surface_format(),
            self.gpu.size(),
        )
    }

    /// Acquires the surface, lets `strategy` record the whole frame into one
    /// encoder, submits and presents.
    ///
    /// Camera and light uploads must already have been written to the queue.
    pub fn render_frame(
        &mut self,
        strategy: &dyn RenderStrategy,
        scene: &dyn SceneSource,
    ) -> Result<FrameOutcome, RenderError> {
        if let Some(reason) = self.gpu.take_device_lost() {
            return Err(RenderError::DeviceLost(reason));
        }

        let size = self.gpu.size();
        if size.width == 0 || size.height == 0 {
            return Ok(FrameOutcome::Skipped);
        }

        let mut frame = match self.gpu.begin_frame() {
            Ok(f) => f,
            Err(err) => {
                let action = self.gpu.handle_surface_error(err);
                return FrameOutcome::from_surface_action(action);
            }
        };

        // RenderTarget borrows frame.encoder; dropped before submit() takes frame.
        {
            let mut target = RenderTarget::new(&mut frame.encoder, &frame.view);
            strategy.encode(&mut target, scene);
        }

        self.window.pre_present_notify();
        self.gpu.submit(frame);

        log::trace!("frame {} presented ({})", self.time.frame_index, strategy.name());
        Ok(FrameOutcome::Presented)
    }
}
