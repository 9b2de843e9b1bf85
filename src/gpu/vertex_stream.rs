//! Growable vertex buffer refilled once per render.

use std::marker::PhantomData;

/// Smallest allocation, in elements.
const MIN_CAPACITY: usize = 256;

/// A `VERTEX | COPY_DST` buffer holding a typed, densely packed vertex
/// array. Reallocates to the next power of two when a frame's vertices
/// outgrow it; never shrinks.
pub struct VertexStream<T> {
    buffer: wgpu::Buffer,
    label: &'static str,
    /// Capacity in elements.
    capacity: usize,
    /// Elements written by the last upload.
    count: usize,
    _vertex: PhantomData<T>,
}

impl<T: bytemuck::Pod> VertexStream<T> {
    /// Empty stream with room for `capacity` vertices.
    #[must_use]
    pub fn new(device: &wgpu::Device, label: &'static str, capacity: usize) -> Self {
        let capacity = grown_capacity(0, capacity);
        Self {
            buffer: allocate::<T>(device, label, capacity),
            label,
            capacity,
            count: 0,
            _vertex: PhantomData,
        }
    }

    /// Replace the stream contents with `vertices`.
    pub fn upload(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        vertices: &[T],
    ) {
        if vertices.len() > self.capacity {
            self.capacity = grown_capacity(self.capacity, vertices.len());
            self.buffer = allocate::<T>(device, self.label, self.capacity);
            log::debug!("{} grown to {} vertices", self.label, self.capacity);
        }
        if !vertices.is_empty() {
            queue.write_buffer(&self.buffer, 0, bytemuck::cast_slice(vertices));
        }
        self.count = vertices.len();
    }

    /// Number of vertices from the last upload.
    #[must_use]
    pub fn count(&self) -> u32 {
        self.count as u32
    }

    /// The uploaded vertices, or `None` if the last upload was empty.
    #[must_use]
    pub fn slice(&self) -> Option<wgpu::BufferSlice<'_>> {
        let bytes = (self.count * std::mem::size_of::<T>()) as u64;
        (bytes > 0).then(|| self.buffer.slice(..bytes))
    }
}

fn allocate<T>(device: &wgpu::Device, label: &str, capacity: usize) -> wgpu::Buffer {
    device.create_buffer(&wgpu::BufferDescriptor {
        label: Some(label),
        size: (capacity * std::mem::size_of::<T>()) as u64,
        usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
        mapped_at_creation: false,
    })
}

/// Capacity able to hold `needed` elements, at least [`MIN_CAPACITY`].
fn grown_capacity(current: usize, needed: usize) -> usize {
    needed
        .max(current)
        .max(MIN_CAPACITY)
        .next_power_of_two()
}
