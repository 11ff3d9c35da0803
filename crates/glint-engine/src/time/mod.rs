//! Time subsystem.
//!
//! Frame timing without coupling to the runtime: call `tick()` once per
//! presented frame to obtain `FrameTime`.

mod frame_clock;

pub use frame_clock::{FrameClock, FrameTime};
