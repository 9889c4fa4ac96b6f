use glam::UVec3;

/// 3D texture holding one fixed-point SH coefficient triplet per texel; the
/// relight kernel writes it as a storage texture, the composite and feedback
/// paths read it with integer loads.
#[derive(Debug)]
pub struct VoxelTexture {
    view: wgpu::TextureView,
    size: UVec3,
}

impl VoxelTexture {
    pub const FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba32Sint;

    pub fn new(
        device: &wgpu::Device,
        label: impl AsRef<str>,
        size: UVec3,
    ) -> Self {
        let label = label.as_ref();

        log::debug!("Allocating voxel texture `{label}`; size={size:?}");

        assert!(size.x > 0);
        assert!(size.y > 0);
        assert!(size.z > 0);

        let tex = device.create_texture(&wgpu::TextureDescriptor {
            label: Some(label),
            size: wgpu::Extent3d {
                width: size.x,
                height: size.y,
                depth_or_array_layers: size.z,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D3,
            format: Self::FORMAT,
            usage: wgpu::TextureUsages::TEXTURE_BINDING
                | wgpu::TextureUsages::STORAGE_BINDING,
            view_formats: &[],
        });

        let view = tex.create_view(&Default::default());

        Self { view, size }
    }

    pub fn view(&self) -> &wgpu::TextureView {
        &self.view
    }

    pub fn size(&self) -> UVec3 {
        self.size
    }
}
