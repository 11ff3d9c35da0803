//! Bind group layout entry builders shared by the clustering stage and the renderers.

use std::num::NonZeroU64;

pub(crate) fn uniform_entry(
    binding: u32,
    visibility: wgpu::ShaderStages,
    min_binding_size: NonZeroU64,
) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility,
        ty: wgpu::BindingType::Buffer {
            ty: wgpu::BufferBindingType::Uniform,
            has_dynamic_offset: false,
            min_binding_size: Some(min_binding_size),
        },
        count: None,
    }
}

pub(crate) fn storage_entry(
    binding: u32,
    visibility: wgpu::ShaderStages,
    read_only: bool,
) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility,
        ty: wgpu::BindingType::Buffer {
            ty: wgpu::BufferBindingType::Storage { read_only },
            has_dynamic_offset: false,
            min_binding_size: None,
        },
        count: None,
    }
}

/// Unfiltered 2D float texture read with `textureLoad`.
pub(crate) fn texture_entry(binding: u32) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility: wgpu::ShaderStages::FRAGMENT,
        ty: wgpu::BindingType::Texture {
            sample_type: wgpu::TextureSampleType::Float { filterable: false },
            view_dimension: wgpu::TextureViewDimension::D2,
            multisampled: false,
        },
        count: None,
    }
}

/// Minimum binding size of a `T`-sized uniform.
pub(crate) fn size_of_nonzero<T>() -> NonZeroU64 {
    NonZeroU64::new(std::mem::size_of::<T>() as u64).expect("uniform types are never zero-sized")
}

/// The lighting bindings (`@group(0) @binding(0..=4)`) shared by the Forward+
/// fragment stage and the deferred resolve.
pub(crate) fn lighting_entries() -> [wgpu::BindGroupLayoutEntry; 5] {
    use crate::camera::CameraBuffer;
    use crate::cluster::ClusterParams;

    let fs = wgpu::ShaderStages::FRAGMENT;
    [
        uniform_entry(0, wgpu::ShaderStages::VERTEX_FRAGMENT, CameraBuffer::min_binding_size()),
        storage_entry(1, fs, true),
        storage_entry(2, fs, true),
        storage_entry(3, fs, true),
        uniform_entry(4, fs, size_of_nonzero::<ClusterParams>()),
    ]
}

/// Resources for [`lighting_entries`], in the same order.
pub(crate) fn lighting_resources<'a>(
    camera: &'a crate::camera::CameraBuffer,
    clustering: &'a crate::cluster::LightClusteringStage,
) -> [wgpu::BindGroupEntry<'a>; 5] {
    let buffers = [
        camera.buffer(),
        clustering.light_set_buffer(),
        clustering.cluster_buffer(),
        clustering.light_index_buffer(),
        clustering.params_buffer(),
    ];
    std::array::from_fn(|i| wgpu::BindGroupEntry {
        binding: i as u32,
        resource: buffers[i].as_entire_binding(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lighting_entries_are_numbered_in_order() {
        let entries = lighting_entries();
        for (i, e) in entries.iter().enumerate() {
            assert_eq!(e.binding, i as u32);
        }
        assert!(entries[0].visibility.contains(wgpu::ShaderStages::VERTEX));
    }

    #[test]
    fn lighting_storage_is_read_only() {
        for e in &lighting_entries()[1..4] {
            assert!(matches!(
                e.ty,
                wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Storage { read_only: true },
                    ..
                }
            ));
        }
    }
}
