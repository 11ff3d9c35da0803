use winit::dpi::PhysicalSize;

use crate::config::GBUFFER_COUNT;
use crate::error::RenderError;

/// Rejects sizes wgpu cannot allocate, before any texture is created.
pub fn validate_target_size(
    resource: &'static str,
    size: PhysicalSize<u32>,
    max_dimension: u32,
) -> Result<(), RenderError> {
    if size.width == 0 || size.height == 0 {
        return Err(RenderError::resource(
            resource,
            format!("zero-sized target {}x{}", size.width, size.height),
        ));
    }
    if size.width > max_dimension || size.height > max_dimension {
        return Err(RenderError::resource(
            resource,
            format!(
                "{}x{} exceeds max texture dimension {max_dimension}",
                size.width, size.height
            ),
        ));
    }
    Ok(())
}

/// Descriptor of a full-screen attachment. Pure: equal inputs give equal descriptors.
pub fn target_descriptor(
    label: &'static str,
    size: PhysicalSize<u32>,
    format: wgpu::TextureFormat,
    usage: wgpu::TextureUsages,
) -> wgpu::TextureDescriptor<'static> {
    wgpu::TextureDescriptor {
        label: Some(label),
        size: wgpu::Extent3d {
            width: size.width,
            height: size.height,
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format,
        usage,
        view_formats: &[],
    }
}

/// One render-target texture and its default view.
#[derive(Debug)]
struct TargetImage {
    texture: wgpu::Texture,
    view: wgpu::TextureView,
}

impl TargetImage {
    fn new(device: &wgpu::Device, desc: &wgpu::TextureDescriptor<'_>) -> Self {
        let texture = device.create_texture(desc);
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        Self { texture, view }
    }
}

impl Drop for TargetImage {
    fn drop(&mut self) {
        // Free the memory now rather than when the last in-flight reference goes.
        self.texture.destroy();
    }
}

/// Depth attachment shared by the geometry passes.
#[derive(Debug)]
pub struct DepthTarget {
    image: TargetImage,
}

impl DepthTarget {
    pub fn descriptor(size: PhysicalSize<u32>, format: wgpu::TextureFormat) -> wgpu::TextureDescriptor<'static> {
        target_descriptor("glint depth", size, format, wgpu::TextureUsages::RENDER_ATTACHMENT)
    }

    pub fn new(
        device: &wgpu::Device,
        size: PhysicalSize<u32>,
        format: wgpu::TextureFormat,
    ) -> Result<Self, RenderError> {
        validate_target_size("depth target", size, device.limits().max_texture_dimension_2d)?;
        Ok(Self {
            image: TargetImage::new(device, &Self::descriptor(size, format)),
        })
    }

    pub fn view(&self) -> &wgpu::TextureView {
        &self.image.view
    }
}

/// Position, normal and albedo images of the deferred path.
///
/// Position is view space with `w = 1` on covered texels; the images are cleared
/// to zero, so `w = 0` marks background.
#[derive(Debug)]
pub struct GBuffer {
    images: [TargetImage; GBUFFER_COUNT],
}

impl GBuffer {
    pub const LABELS: [&'static str; GBUFFER_COUNT] =
        ["glint gbuffer position", "glint gbuffer normal", "glint gbuffer albedo"];

    pub fn descriptors(
        size: PhysicalSize<u32>,
        format: wgpu::TextureFormat,
    ) -> [wgpu::TextureDescriptor<'static>; GBUFFER_COUNT] {
        let usage = wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::TEXTURE_BINDING;
        Self::LABELS.map(|label| target_descriptor(label, size, format, usage))
    }

    pub fn new(
        device: &wgpu::Device,
        size: PhysicalSize<u32>,
        format: wgpu::TextureFormat,
    ) -> Result<Self, RenderError> {
        validate_target_size("g-buffer", size, device.limits().max_texture_dimension_2d)?;
        let images = Self::descriptors(size, format).map(|desc| TargetImage::new(device, &desc));
        log::debug!("g-buffer allocated: {}x{} {format:?}", size.width, size.height);
        Ok(Self { images })
    }

    /// Views in binding order: position, normal, albedo.
    pub fn views(&self) -> [&wgpu::TextureView; GBUFFER_COUNT] {
        [&self.images[0].view, &self.images[1].view, &self.images[2].view]
    }
}
