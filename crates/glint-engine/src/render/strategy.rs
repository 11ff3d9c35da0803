use std::fmt;
use std::str::FromStr;

use winit::dpi::PhysicalSize;

use crate::error::RenderError;
use crate::scene::SceneSource;

use super::RenderTarget;

/// A complete way of turning the scene into a lit frame.
///
/// Implementations own their pipelines and size-dependent images and share the
/// light clustering stage with each other.
pub trait RenderStrategy {
    fn name(&self) -> &'static str;

    /// Reallocates size-dependent images. Previous images are released and the
    /// bind groups that referenced them rebuilt.
    fn resize(&mut self, device: &wgpu::Device, size: PhysicalSize<u32>) -> Result<(), RenderError>;

    /// Records the whole frame (clustering, geometry, shading) into `target.encoder`.
    fn encode(&self, target: &mut RenderTarget<'_>, scene: &dyn SceneSource);
}

/// The available strategies, for selection and toggling.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum StrategyKind {
    ForwardPlus,
    ClusteredDeferred,
}

impl StrategyKind {
    pub fn name(self) -> &'static str {
        match self {
            Self::ForwardPlus => "forward+",
            Self::ClusteredDeferred => "clustered deferred",
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            Self::ForwardPlus => Self::ClusteredDeferred,
            Self::ClusteredDeferred => Self::ForwardPlus,
        }
    }
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for StrategyKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "forward" | "forward+" | "forward-plus" => Ok(Self::ForwardPlus),
            "deferred" | "clustered-deferred" => Ok(Self::ClusteredDeferred),
            other => Err(format!("unknown strategy '{other}' (expected forward or deferred)")),
        }
    }
}
