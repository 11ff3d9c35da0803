//! Core engine-facing contracts.
//!
//! Defines the interface between the runtime (platform loop) and the
//! application, and the per-frame entry point that drives a render strategy.

mod app;
mod ctx;

pub use app::{App, AppControl};
pub use ctx::{FrameCtx, FrameOutcome};
