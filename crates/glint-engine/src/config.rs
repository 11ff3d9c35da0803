//! Build-time renderer constants and their configuration structs.
//!
//! Everything here is fixed once a renderer is constructed. Nothing is tunable
//! per frame.

/// Cluster grid resolution along screen-x, screen-y and view depth.
pub const CLUSTER_DIMS: [u32; 3] = [16, 9, 24];

/// Maximum number of light indices stored per cluster.
pub const MAX_LIGHTS_PER_CLUSTER: u32 = 100;

/// Default capacity of the light set buffer.
pub const MAX_LIGHTS: u32 = 5000;

/// Pixel format of the three G-buffer images.
pub const GBUFFER_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba16Float;

/// Depth attachment format shared by both strategies.
pub const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth24Plus;

/// Depth test used by every geometry pass.
pub const DEPTH_COMPARE: wgpu::CompareFunction = wgpu::CompareFunction::Less;

/// Number of G-buffer color images (position, normal, albedo).
pub const GBUFFER_COUNT: usize = 3;

/// Cluster grid configuration.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct ClusterConfig {
    /// Grid resolution `(Nx, Ny, Nz)`.
    pub dims: [u32; 3],

    /// Per-cluster light cap. Additional intersecting lights are dropped.
    pub max_lights_per_cluster: u32,
}

impl Default for ClusterConfig {
    fn default() -> Self {
        Self {
            dims: CLUSTER_DIMS,
            max_lights_per_cluster: MAX_LIGHTS_PER_CLUSTER,
        }
    }
}

/// Renderer-wide configuration.
///
/// Image formats and the depth test are exposed so pipelines and targets read
/// them from one place; the defaults are the only combination the shaders are
/// written against.
#[derive(Debug, Clone)]
pub struct RendererConfig {
    pub cluster: ClusterConfig,

    /// Light set capacity (number of `Light` records).
    pub max_lights: u32,

    pub gbuffer_format: wgpu::TextureFormat,
    pub depth_format: wgpu::TextureFormat,
    pub depth_compare: wgpu::CompareFunction,

    /// Background color written where no geometry is drawn.
    pub clear_color: wgpu::Color,
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self {
            cluster: ClusterConfig::default(),
            max_lights: MAX_LIGHTS,
            gbuffer_format: GBUFFER_FORMAT,
            depth_format: DEPTH_FORMAT,
            depth_compare: DEPTH_COMPARE,
            clear_color: wgpu::Color::BLACK,
        }
    }
}
