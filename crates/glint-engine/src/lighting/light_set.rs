use crate::error::RenderError;

use super::Light;

/// Size of the `count` header in front of the light array (`u32` padded to 16).
pub const LIGHT_SET_HEADER_SIZE: u64 = 16;

/// GPU-resident light set: `struct LightSet { count: u32, lights: array<Light> }`.
///
/// Owned by the lighting collaborator and mutated by it between frames; every
/// stage of the core binds it read-only.
#[derive(Debug)]
pub struct LightSet {
    buffer: wgpu::Buffer,
    capacity: usize,
    count: usize,
}

impl LightSet {
    /// Allocates a light set able to hold `capacity` lights.
    pub fn new(device: &wgpu::Device, capacity: u32) -> Result<Self, RenderError> {
        if capacity == 0 {
            return Err(RenderError::resource("light set", "capacity is zero"));
        }

        let size = Self::buffer_size(capacity as usize);
        let limit = u64::from(device.limits().max_storage_buffer_binding_size);
        if size > limit {
            return Err(RenderError::resource(
                "light set",
                format!("{size} bytes exceeds storage binding limit {limit}"),
            ));
        }

        let buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("glint light set"),
            size,
            usage: wgpu::BufferUsages::STORAGE | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        log::debug!("light set allocated: capacity={capacity} ({size} bytes)");

        Ok(Self {
            buffer,
            capacity: capacity as usize,
            count: 0,
        })
    }

    /// Byte size of a light set buffer holding `capacity` lights.
    pub fn buffer_size(capacity: usize) -> u64 {
        LIGHT_SET_HEADER_SIZE + (capacity * std::mem::size_of::<Light>()) as u64
    }

    /// Rejects light counts the buffer cannot hold.
    pub fn check_capacity(count: usize, capacity: usize) -> Result<(), RenderError> {
        if count > capacity {
            return Err(RenderError::LightCapacityExceeded { count, capacity });
        }
        Ok(())
    }

    /// Replaces the light set contents. Must run before the frame is encoded.
    ///
    /// Fails without touching the buffer if `lights` does not fit.
    pub fn upload(&mut self, queue: &wgpu::Queue, lights: &[Light]) -> Result<(), RenderError> {
        Self::check_capacity(lights.len(), self.capacity)?;

        let header = [lights.len() as u32, 0, 0, 0];
        queue.write_buffer(&self.buffer, 0, bytemuck::cast_slice(&header));
        if !lights.is_empty() {
            queue.write_buffer(&self.buffer, LIGHT_SET_HEADER_SIZE, bytemuck::cast_slice(lights));
        }

        self.count = lights.len();
        Ok(())
    }

    pub fn buffer(&self) -> &wgpu::Buffer {
        &self.buffer
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of lights written by the last successful upload.
    pub fn len(&self) -> usize {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }
}
