use std::ops::{Deref, DerefMut};
use std::{any, mem};

use bytemuck::Pod;

/// Storage buffer that exists both on the host machine and the GPU.
///
/// Used for data that must be written (or read back) on the host, such as a
/// probe's surfel set or the light table; uses [`DerefMut`] to track whether
/// it's been modified since the last flush.
#[derive(Debug)]
pub struct MappedStorageBuffer<T> {
    buffer: wgpu::Buffer,
    data: T,
    dirty: bool,
}

impl<T> MappedStorageBuffer<T>
where
    T: StorageBufferable,
{
    pub fn new(
        device: &wgpu::Device,
        label: impl AsRef<str>,
        size: usize,
        data: T,
    ) -> Self {
        let label = label.as_ref();

        log::info!(
            "Allocating storage buffer `{label}`; ty={}, size={size}",
            any::type_name::<T>(),
        );

        let buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some(label),
            usage: wgpu::BufferUsages::STORAGE
                | wgpu::BufferUsages::COPY_DST
                | wgpu::BufferUsages::COPY_SRC,
            size: size as _,
            mapped_at_creation: false,
        });

        Self {
            buffer,
            data,
            dirty: true,
        }
    }

    pub fn flush(&mut self, queue: &wgpu::Queue) {
        if !mem::take(&mut self.dirty) {
            return;
        }

        queue.write_buffer(&self.buffer, 0, self.data.data());
    }

    pub fn as_buffer(&self) -> &wgpu::Buffer {
        &self.buffer
    }

    pub fn as_binding(&self) -> wgpu::BindingResource {
        self.buffer.as_entire_binding()
    }
}

impl<T> MappedStorageBuffer<Vec<T>>
where
    T: Pod,
{
    /// Pulls the GPU copy back into the host copy; blocks until the copy
    /// completes.
    ///
    /// Used after a bake-time kernel has filled the buffer on the GPU side.
    pub fn read_back(&mut self, device: &wgpu::Device, queue: &wgpu::Queue) {
        let size = (self.data.len() * mem::size_of::<T>()) as u64;

        let staging = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("prtgi_read_back_staging"),
            usage: wgpu::BufferUsages::COPY_DST | wgpu::BufferUsages::MAP_READ,
            size,
            mapped_at_creation: false,
        });

        let mut encoder = device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor::default());

        encoder.copy_buffer_to_buffer(&self.buffer, 0, &staging, 0, size);
        queue.submit([encoder.finish()]);

        let (tx, rx) = std::sync::mpsc::channel();

        staging
            .slice(..)
            .map_async(wgpu::MapMode::Read, move |result| {
                let _ = tx.send(result);
            });

        device.poll(wgpu::Maintain::Wait);

        rx.recv()
            .expect("buffer mapping callback got dropped")
            .expect("couldn't map staging buffer");

        {
            let view = staging.slice(..).get_mapped_range();

            self.data.copy_from_slice(bytemuck::cast_slice(&view[..]));
        }

        staging.unmap();

        // The GPU copy is the freshest one now, nothing to flush
        self.dirty = false;
    }
}

impl<T> Deref for MappedStorageBuffer<T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        &self.data
    }
}

impl<T> DerefMut for MappedStorageBuffer<T> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.dirty = true;

        &mut self.data
    }
}

pub trait StorageBufferable {
    fn data(&self) -> &[u8];
}

impl<T> StorageBufferable for Vec<T>
where
    T: Pod,
{
    fn data(&self) -> &[u8] {
        bytemuck::cast_slice(self)
    }
}
