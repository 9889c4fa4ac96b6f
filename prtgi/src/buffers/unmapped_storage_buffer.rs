use log::info;

/// Storage buffer that exists only in VRAM.
///
/// Used for data the host never touches directly (per-probe SH accumulators,
/// debug radiance); editor tooling reads them through staging copies.
#[derive(Debug)]
pub struct UnmappedStorageBuffer {
    buffer: wgpu::Buffer,
}

impl UnmappedStorageBuffer {
    pub fn new(
        device: &wgpu::Device,
        label: impl AsRef<str>,
        size: usize,
    ) -> Self {
        let label = label.as_ref();

        info!("Allocating unmapped storage buffer `{label}`; size={size}");

        let buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some(label),
            usage: wgpu::BufferUsages::STORAGE | wgpu::BufferUsages::COPY_SRC,
            size: size as _,
            mapped_at_creation: false,
        });

        Self { buffer }
    }

    pub fn as_buffer(&self) -> &wgpu::Buffer {
        &self.buffer
    }

    pub fn as_binding(&self) -> wgpu::BindingResource {
        self.buffer.as_entire_binding()
    }
}
