//! Glint engine crate.
//!
//! Clustered light shading on wgpu: a compute pass bins point lights into a
//! view-frustum grid, and either a Forward+ or a clustered deferred renderer
//! shades against the binned lists. Around that core sit the platform pieces
//! (device, window runtime, frame clock, logging) used by the viewer.

pub mod device;
pub mod window;
pub mod time;
pub mod core;
pub mod logging;

pub mod camera;
pub mod cluster;
pub mod config;
pub mod lighting;
pub mod render;
pub mod scene;
pub mod shaders;

mod bindings;
mod error;

pub use error::RenderError;
