use wgpu::util::DeviceExt;

use crate::bindings::{size_of_nonzero, storage_entry, uniform_entry};
use crate::camera::CameraBuffer;
use crate::error::RenderError;
use crate::lighting::LightSet;
use crate::shaders;

use super::{ClusterGrid, ClusterParams, ClusterRecord};

/// The "perform light clustering" compute pass and the buffers it fills.
///
/// Built once and shared (behind an `Arc`) by both render strategies. The camera
/// and light set buffers belong to their collaborators; this stage only binds
/// them. The cluster record and light-index buffers are overwritten every frame.
#[derive(Debug)]
pub struct LightClusteringStage {
    grid: ClusterGrid,

    pipeline: wgpu::ComputePipeline,
    bind_group: wgpu::BindGroup,

    params_ubo: wgpu::Buffer,
    cluster_buffer: wgpu::Buffer,
    light_index_buffer: wgpu::Buffer,
    light_set_buffer: wgpu::Buffer,
}

impl LightClusteringStage {
    pub fn new(
        device: &wgpu::Device,
        camera: &CameraBuffer,
        lights: &LightSet,
        grid: ClusterGrid,
    ) -> Result<Self, RenderError> {
        let (cluster_bytes, index_bytes) = Self::buffer_sizes(&grid);
        let limit = u64::from(device.limits().max_storage_buffer_binding_size);
        Self::check_binding_size("cluster records", cluster_bytes, limit)?;
        Self::check_binding_size("light index buffer", index_bytes, limit)?;

        let params = ClusterParams::from(&grid);
        let params_ubo = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("glint cluster params ubo"),
            contents: bytemuck::bytes_of(&params),
            usage: wgpu::BufferUsages::UNIFORM,
        });

        let cluster_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("glint cluster records"),
            size: cluster_bytes,
            usage: wgpu::BufferUsages::STORAGE,
            mapped_at_creation: false,
        });

        let light_index_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("glint cluster light indices"),
            size: index_bytes,
            usage: wgpu::BufferUsages::STORAGE,
            mapped_at_creation: false,
        });

        let shader = shaders::create_module(
            device,
            "glint clustering shader",
            shaders::clustering_source(),
        );

        let cs = wgpu::ShaderStages::COMPUTE;
        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("glint clustering bgl"),
            entries: &[
                uniform_entry(0, cs, CameraBuffer::min_binding_size()),
                storage_entry(1, cs, true),
                storage_entry(2, cs, false),
                storage_entry(3, cs, false),
                uniform_entry(4, cs, size_of_nonzero::<ClusterParams>()),
            ],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("glint clustering pipeline layout"),
            bind_group_layouts: &[&bind_group_layout],
            immediate_size: 0,
        });

        let pipeline = device.create_compute_pipeline(&wgpu::ComputePipelineDescriptor {
            label: Some("glint clustering pipeline"),
            layout: Some(&pipeline_layout),
            module: &shader,
            entry_point: Some(shaders::CLUSTERING_ENTRY),
            compilation_options: Default::default(),
            cache: None,
        });

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("glint clustering bind group"),
            layout: &bind_group_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: camera.buffer().as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: lights.buffer().as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: cluster_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 3,
                    resource: light_index_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 4,
                    resource: params_ubo.as_entire_binding(),
                },
            ],
        });

        let dims = grid.dims();
        log::info!(
            "light clustering ready: {}x{}x{} clusters, {} lights/cluster, {} KiB of light indices",
            dims.x,
            dims.y,
            dims.z,
            grid.max_lights_per_cluster(),
            index_bytes / 1024
        );

        Ok(Self {
            grid,
            pipeline,
            bind_group,
            params_ubo,
            cluster_buffer,
            light_index_buffer,
            light_set_buffer: lights.buffer().clone(),
        })
    }

    /// Byte sizes of the cluster record and light-index buffers for `grid`.
    pub fn buffer_sizes(grid: &ClusterGrid) -> (u64, u64) {
        let records = u64::from(grid.total_clusters()) * std::mem::size_of::<ClusterRecord>() as u64;
        let indices = grid.light_index_capacity() * std::mem::size_of::<u32>() as u64;
        (records, indices)
    }

    fn check_binding_size(resource: &'static str, size: u64, limit: u64) -> Result<(), RenderError> {
        if size > limit {
            return Err(RenderError::resource(
                resource,
                format!("{size} bytes exceeds storage binding limit {limit}"),
            ));
        }
        Ok(())
    }

    /// Records the clustering dispatch. Must be encoded before any pass that
    /// reads the cluster buffers.
    pub fn encode(&self, encoder: &mut wgpu::CommandEncoder) {
        let [x, y, z] = self.grid.workgroup_count();

        let mut cpass = encoder.begin_compute_pass(&wgpu::ComputePassDescriptor {
            label: Some("glint light clustering pass"),
            timestamp_writes: None,
        });
        cpass.set_pipeline(&self.pipeline);
        cpass.set_bind_group(0, &self.bind_group, &[]);
        cpass.dispatch_workgroups(x, y, z);
    }

    pub fn grid(&self) -> &ClusterGrid {
        &self.grid
    }

    pub fn params_buffer(&self) -> &wgpu::Buffer {
        &self.params_ubo
    }

    pub fn cluster_buffer(&self) -> &wgpu::Buffer {
        &self.cluster_buffer
    }

    pub fn light_index_buffer(&self) -> &wgpu::Buffer {
        &self.light_index_buffer
    }

    pub fn light_set_buffer(&self) -> &wgpu::Buffer {
        &self.light_set_buffer
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_grid_buffer_sizes() {
        let (records, indices) = LightClusteringStage::buffer_sizes(&ClusterGrid::default());
        assert_eq!(records, 3456 * 8);
        assert_eq!(indices, 3456 * 100 * 4);
    }

    #[test]
    fn oversized_index_buffer_is_rejected() {
        let grid = ClusterGrid::new([64, 64, 64], 4096);
        let (_, indices) = LightClusteringStage::buffer_sizes(&grid);
        let err = LightClusteringStage::check_binding_size("light index buffer", indices, 128 << 20)
            .unwrap_err();
        assert!(matches!(
            err,
            RenderError::ResourceCreation {
                resource: "light index buffer",
                ..
            }
        ));
    }

    #[test]
    fn buffer_at_limit_is_accepted() {
        assert!(LightClusteringStage::check_binding_size("x", 1024, 1024).is_ok());
    }
}
