//! Point lights: GPU records, the light set buffer, and the CPU mirror of the
//! per-fragment light accumulation.

mod light;
mod light_set;
mod shade;

pub use light::Light;
pub use light_set::{LightSet, LIGHT_SET_HEADER_SIZE};
pub use shade::{light_contribution, range_falloff, shade_sample, SurfaceSample, AMBIENT};
