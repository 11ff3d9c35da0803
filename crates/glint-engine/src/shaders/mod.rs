//! WGSL sources.
//!
//! Each pipeline's module is assembled from shared fragments so the cluster
//! mapping and the light accumulation exist in exactly one place.

pub const TYPES: &str = include_str!("types.wgsl");
pub const CAMERA_BINDING: &str = include_str!("camera_binding.wgsl");
pub const LIGHTING: &str = include_str!("lighting.wgsl");
pub const MESH: &str = include_str!("mesh.wgsl");
pub const CLUSTERING: &str = include_str!("clustering.wgsl");
pub const FORWARD_PLUS: &str = include_str!("forward_plus.wgsl");
pub const GBUFFER: &str = include_str!("gbuffer.wgsl");
pub const DEFERRED_RESOLVE: &str = include_str!("deferred_resolve.wgsl");

pub const CLUSTERING_ENTRY: &str = "cs_main";
pub const MESH_VERTEX_ENTRY: &str = "vs_main";
pub const MESH_FRAGMENT_ENTRY: &str = "fs_main";
pub const RESOLVE_VERTEX_ENTRY: &str = "vs_fullscreen";
pub const RESOLVE_FRAGMENT_ENTRY: &str = "fs_resolve";

pub fn clustering_source() -> String {
    [TYPES, CAMERA_BINDING, CLUSTERING].concat()
}

pub fn forward_plus_source() -> String {
    [TYPES, CAMERA_BINDING, LIGHTING, MESH, FORWARD_PLUS].concat()
}

pub fn gbuffer_source() -> String {
    [TYPES, CAMERA_BINDING, MESH, GBUFFER].concat()
}

pub fn deferred_resolve_source() -> String {
    [TYPES, CAMERA_BINDING, LIGHTING, DEFERRED_RESOLVE].concat()
}

pub(crate) fn create_module(device: &wgpu::Device, label: &str, source: String) -> wgpu::ShaderModule {
    device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some(label),
        source: wgpu::ShaderSource::Wgsl(source.into()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn declares(src: &str, needle: &str) -> usize {
        src.matches(needle).count()
    }

    fn validate(name: &str, src: &str) {
        let module = naga::front::wgsl::parse_str(src)
            .unwrap_or_else(|e| panic!("{name}: parse error\n{}", e.emit_to_string(src)));
        naga::valid::Validator::new(
            naga::valid::ValidationFlags::all(),
            naga::valid::Capabilities::all(),
        )
        .validate(&module)
        .unwrap_or_else(|e| panic!("{name}: validation error\n{}", e.emit_to_string(src)));
    }

    #[test]
    fn assembled_modules_are_valid_wgsl() {
        validate("clustering", &clustering_source());
        validate("forward+", &forward_plus_source());
        validate("gbuffer", &gbuffer_source());
        validate("deferred resolve", &deferred_resolve_source());
    }

    #[test]
    fn entry_points_are_present() {
        assert!(clustering_source().contains(&format!("fn {CLUSTERING_ENTRY}(")));
        for src in [forward_plus_source(), gbuffer_source()] {
            assert!(src.contains(&format!("fn {MESH_VERTEX_ENTRY}(")));
            assert!(src.contains(&format!("fn {MESH_FRAGMENT_ENTRY}(")));
        }
        let resolve = deferred_resolve_source();
        assert!(resolve.contains(&format!("fn {RESOLVE_VERTEX_ENTRY}(")));
        assert!(resolve.contains(&format!("fn {RESOLVE_FRAGMENT_ENTRY}(")));
    }

    #[test]
    fn each_module_binds_camera_once() {
        for src in [
            clustering_source(),
            forward_plus_source(),
            gbuffer_source(),
            deferred_resolve_source(),
        ] {
            assert_eq!(declares(&src, "var<uniform> camera"), 1);
            assert_eq!(declares(&src, "struct Camera {"), 1);
        }
    }

    #[test]
    fn shaded_modules_share_one_lookup() {
        for src in [forward_plus_source(), deferred_resolve_source()] {
            assert_eq!(declares(&src, "fn shade_surface("), 1);
            assert_eq!(declares(&src, "fn cluster_at("), 1);
        }
    }

    #[test]
    fn gbuffer_pass_does_not_light() {
        let src = gbuffer_source();
        assert!(!src.contains("shade_surface"));
        assert!(!src.contains("light_set"));
    }

    #[test]
    fn clustering_writes_its_outputs() {
        let src = clustering_source();
        assert!(src.contains("var<storage, read_write> clusters"));
        assert!(src.contains("var<storage, read_write> light_indices"));
        assert!(src.contains("@workgroup_size(4, 4, 4)"));
    }
}
