/// Initialization parameters for the GPU layer.
#[derive(Debug, Clone)]
pub struct GpuInit {
    /// Prefer an sRGB surface format when available.
    ///
    /// Shading happens in linear space, so an sRGB target gives correct output.
    pub prefer_srgb: bool,

    pub present_mode: wgpu::PresentMode,

    /// Optional alpha mode preference for the surface.
    ///
    /// If provided but unsupported on the current surface, a supported mode is selected.
    pub alpha_mode: Option<wgpu::CompositeAlphaMode>,

    pub required_features: wgpu::Features,

    /// Limits requested from the adapter/device.
    ///
    /// The clustering and lighting bindings need storage buffers in the fragment
    /// stage, which the downlevel WebGL2 limits do not provide.
    pub required_limits: wgpu::Limits,

    /// Frames the CPU may run ahead of the GPU. This is the only frame pacing.
    pub desired_maximum_frame_latency: u32,
}

impl Default for GpuInit {
    fn default() -> Self {
        Self {
            prefer_srgb: true,
            present_mode: wgpu::PresentMode::Fifo,
            alpha_mode: None,
            required_features: wgpu::Features::empty(),
            required_limits: wgpu::Limits::default(),
            desired_maximum_frame_latency: 2,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_allow_two_frames_in_flight() {
        let init = GpuInit::default();
        assert_eq!(init.desired_maximum_frame_latency, 2);
        assert_eq!(init.present_mode, wgpu::PresentMode::Fifo);
        assert!(init.required_limits.max_storage_buffers_per_shader_stage >= 4);
    }
}
