//! Camera collaborator.
//!
//! The core only reads the camera through [`CameraBuffer`]; [`Camera`] is a small
//! look-at perspective camera used by applications to fill it.

mod buffer;
mod perspective;

pub use buffer::{CameraBuffer, CameraUniforms};
pub use perspective::Camera;
