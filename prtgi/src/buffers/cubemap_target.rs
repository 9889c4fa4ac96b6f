use std::array;

/// Cubemap render target for the G-buffer captures: six faces to render into,
/// one cube view to sample from.
#[derive(Debug)]
pub struct CubemapTarget {
    cube_view: wgpu::TextureView,
    face_views: [wgpu::TextureView; 6],
    sampler: wgpu::Sampler,
    size: u32,
}

impl CubemapTarget {
    pub fn new(
        device: &wgpu::Device,
        label: impl AsRef<str>,
        size: u32,
        format: wgpu::TextureFormat,
    ) -> Self {
        let label = label.as_ref();

        log::info!(
            "Allocating cubemap target `{label}`; size={size}, \
             format={format:?}",
        );

        let tex = device.create_texture(&wgpu::TextureDescriptor {
            label: Some(label),
            size: wgpu::Extent3d {
                width: size,
                height: size,
                depth_or_array_layers: 6,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT
                | wgpu::TextureUsages::TEXTURE_BINDING,
            view_formats: &[],
        });

        let cube_view = tex.create_view(&wgpu::TextureViewDescriptor {
            label: Some(&format!("{label}_cube")),
            dimension: Some(wgpu::TextureViewDimension::Cube),
            ..Default::default()
        });

        let face_views = array::from_fn(|face| {
            tex.create_view(&wgpu::TextureViewDescriptor {
                label: Some(&format!("{label}_face{face}")),
                dimension: Some(wgpu::TextureViewDimension::D2),
                base_array_layer: face as u32,
                array_layer_count: Some(1),
                ..Default::default()
            })
        });

        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some(&format!("{label}_sampler")),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            ..Default::default()
        });

        Self {
            cube_view,
            face_views,
            sampler,
            size,
        }
    }

    /// View to sample the whole cubemap through.
    pub fn cube_view(&self) -> &wgpu::TextureView {
        &self.cube_view
    }

    /// View of a single face, for the capture backend to render into.
    pub fn face_view(&self, face: usize) -> &wgpu::TextureView {
        &self.face_views[face]
    }

    pub fn sampler(&self) -> &wgpu::Sampler {
        &self.sampler
    }

    pub fn size(&self) -> u32 {
        self.size
    }
}
