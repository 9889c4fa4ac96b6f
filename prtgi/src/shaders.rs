#[derive(Debug)]
pub struct Shaders {
    pub surfel_sampling: wgpu::ShaderModule,
    pub surfel_relight: wgpu::ShaderModule,
    pub voxel_clear: wgpu::ShaderModule,
}

impl Shaders {
    pub fn new(device: &wgpu::Device) -> Self {
        let surfel_sampling = device.create_shader_module(wgpu::include_wgsl!(
            "shaders/surfel_sampling.wgsl"
        ));

        let surfel_relight = device.create_shader_module(wgpu::include_wgsl!(
            "shaders/surfel_relight.wgsl"
        ));

        let voxel_clear = device.create_shader_module(wgpu::include_wgsl!(
            "shaders/voxel_clear.wgsl"
        ));

        Self {
            surfel_sampling,
            surfel_relight,
            voxel_clear,
        }
    }
}
