use std::mem;

use log::debug;

use crate::{gpu, CubemapTarget, MappedStorageBuffer, Shaders};

/// Converts a probe's G-buffer cubemap captures into its surfel set; the
/// cubemap targets are baker-owned and reused across probes, so the bind
/// group is rebuilt per dispatch.
#[derive(Debug)]
pub struct SurfelSamplingPass {
    layout: wgpu::BindGroupLayout,
    pipeline: wgpu::ComputePipeline,
}

impl SurfelSamplingPass {
    pub fn new(shaders: &Shaders, device: &wgpu::Device) -> Self {
        debug!("Initializing pass: surfel_sampling");

        let cubemap_entry = |binding| wgpu::BindGroupLayoutEntry {
            binding,
            visibility: wgpu::ShaderStages::COMPUTE,
            ty: wgpu::BindingType::Texture {
                sample_type: wgpu::TextureSampleType::Float {
                    filterable: false,
                },
                view_dimension: wgpu::TextureViewDimension::Cube,
                multisampled: false,
            },
            count: None,
        };

        let layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("prtgi_surfel_sampling_bg0_layout"),
                entries: &[
                    // world_pos_cubemap
                    cubemap_entry(0),
                    // normal_cubemap
                    cubemap_entry(1),
                    // albedo_cubemap
                    cubemap_entry(2),
                    // cubemap_sampler
                    wgpu::BindGroupLayoutEntry {
                        binding: 3,
                        visibility: wgpu::ShaderStages::COMPUTE,
                        ty: wgpu::BindingType::Sampler(
                            wgpu::SamplerBindingType::NonFiltering,
                        ),
                        count: None,
                    },
                    // surfels
                    wgpu::BindGroupLayoutEntry {
                        binding: 4,
                        visibility: wgpu::ShaderStages::COMPUTE,
                        ty: wgpu::BindingType::Buffer {
                            ty: wgpu::BufferBindingType::Storage {
                                read_only: false,
                            },
                            has_dynamic_offset: false,
                            min_binding_size: None,
                        },
                        count: None,
                    },
                ],
            });

        let pipeline_layout =
            device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                label: Some("prtgi_surfel_sampling_pipeline_layout"),
                bind_group_layouts: &[&layout],
                push_constant_ranges: &[wgpu::PushConstantRange {
                    stages: wgpu::ShaderStages::COMPUTE,
                    range: 0..mem::size_of::<gpu::SamplingPassParams>() as u32,
                }],
            });

        let pipeline =
            device.create_compute_pipeline(&wgpu::ComputePipelineDescriptor {
                label: Some("prtgi_surfel_sampling_pipeline"),
                layout: Some(&pipeline_layout),
                module: &shaders.surfel_sampling,
                entry_point: "main",
            });

        Self { layout, pipeline }
    }

    #[allow(clippy::too_many_arguments)]
    pub fn run(
        &self,
        device: &wgpu::Device,
        encoder: &mut wgpu::CommandEncoder,
        world_position: &CubemapTarget,
        normal: &CubemapTarget,
        albedo: &CubemapTarget,
        surfels: &MappedStorageBuffer<Vec<gpu::Surfel>>,
        params: gpu::SamplingPassParams,
    ) {
        let bind_group =
            device.create_bind_group(&wgpu::BindGroupDescriptor {
                label: Some("prtgi_surfel_sampling_bg0"),
                layout: &self.layout,
                entries: &[
                    wgpu::BindGroupEntry {
                        binding: 0,
                        resource: wgpu::BindingResource::TextureView(
                            world_position.cube_view(),
                        ),
                    },
                    wgpu::BindGroupEntry {
                        binding: 1,
                        resource: wgpu::BindingResource::TextureView(
                            normal.cube_view(),
                        ),
                    },
                    wgpu::BindGroupEntry {
                        binding: 2,
                        resource: wgpu::BindingResource::TextureView(
                            albedo.cube_view(),
                        ),
                    },
                    wgpu::BindGroupEntry {
                        binding: 3,
                        resource: wgpu::BindingResource::Sampler(
                            world_position.sampler(),
                        ),
                    },
                    wgpu::BindGroupEntry {
                        binding: 4,
                        resource: surfels.as_binding(),
                    },
                ],
            });

        let mut pass =
            encoder.begin_compute_pass(&wgpu::ComputePassDescriptor {
                label: Some("prtgi_surfel_sampling_pass"),
                timestamp_writes: None,
            });

        pass.set_pipeline(&self.pipeline);
        pass.set_bind_group(0, &bind_group, &[]);
        pass.set_push_constants(0, bytemuck::bytes_of(&params));
        pass.dispatch_workgroups(1, 1, 1);
    }
}
