use bytemuck::{Pod, Zeroable};

use super::ClusterGrid;

/// A cluster's run in the light-index buffer: `[offset, offset + count)`.
#[repr(C)]
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq, Pod, Zeroable)]
pub struct ClusterRecord {
    pub offset: u32,
    pub count: u32,
}

/// Grid constants for the shaders: `struct ClusterParams { dims: vec3u, max_lights_per_cluster: u32 }`.
#[repr(C)]
#[derive(Debug, Copy, Clone, Eq, PartialEq, Pod, Zeroable)]
pub struct ClusterParams {
    pub dims: [u32; 3],
    pub max_lights_per_cluster: u32,
}

impl From<&ClusterGrid> for ClusterParams {
    fn from(grid: &ClusterGrid) -> Self {
        Self {
            dims: grid.dims().to_array(),
            max_lights_per_cluster: grid.max_lights_per_cluster(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gpu_layouts() {
        assert_eq!(std::mem::size_of::<ClusterRecord>(), 8);
        assert_eq!(std::mem::size_of::<ClusterParams>(), 16);
    }

    #[test]
    fn params_from_grid() {
        let p = ClusterParams::from(&ClusterGrid::new([16, 9, 24], 100));
        assert_eq!(p.dims, [16, 9, 24]);
        assert_eq!(p.max_lights_per_cluster, 100);
    }
}
