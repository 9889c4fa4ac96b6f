use std::mem;

use log::debug;

use crate::{
    gpu, Engine, HistoryBuffers, MappedUniformBuffer, Params, Probe,
};

/// Projects a probe's surfels into SH9 under the current lighting and writes
/// the probe's nine coefficient texels; bind groups are prebuilt, one set
/// per ring phase plus one set per probe.
#[derive(Debug)]
pub struct SurfelRelightPass {
    bind_groups: Vec<wgpu::BindGroup>,
    probe_groups: Vec<wgpu::BindGroup>,
    pipeline: wgpu::ComputePipeline,
}

impl SurfelRelightPass {
    pub fn new<P>(
        engine: &Engine<P>,
        device: &wgpu::Device,
        info: &MappedUniformBuffer<gpu::VolumeInfo>,
        history: &HistoryBuffers,
        probes: &[Probe],
    ) -> Self
    where
        P: Params,
    {
        debug!("Initializing pass: surfel_relight");

        let bg0_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("prtgi_surfel_relight_bg0_layout"),
                entries: &[
                    // volume
                    wgpu::BindGroupLayoutEntry {
                        binding: 0,
                        visibility: wgpu::ShaderStages::COMPUTE,
                        ty: wgpu::BindingType::Buffer {
                            ty: wgpu::BufferBindingType::Uniform,
                            has_dynamic_offset: false,
                            min_binding_size: None,
                        },
                        count: None,
                    },
                    // lights
                    wgpu::BindGroupLayoutEntry {
                        binding: 1,
                        visibility: wgpu::ShaderStages::COMPUTE,
                        ty: wgpu::BindingType::Buffer {
                            ty: wgpu::BufferBindingType::Storage {
                                read_only: true,
                            },
                            has_dynamic_offset: false,
                            min_binding_size: None,
                        },
                        count: None,
                    },
                    // voxel_out
                    wgpu::BindGroupLayoutEntry {
                        binding: 2,
                        visibility: wgpu::ShaderStages::COMPUTE,
                        ty: wgpu::BindingType::StorageTexture {
                            access: wgpu::StorageTextureAccess::WriteOnly,
                            format: wgpu::TextureFormat::Rgba32Sint,
                            view_dimension: wgpu::TextureViewDimension::D3,
                        },
                        count: None,
                    },
                    // voxel_feedback
                    wgpu::BindGroupLayoutEntry {
                        binding: 3,
                        visibility: wgpu::ShaderStages::COMPUTE,
                        ty: wgpu::BindingType::Texture {
                            sample_type: wgpu::TextureSampleType::Sint,
                            view_dimension: wgpu::TextureViewDimension::D3,
                            multisampled: false,
                        },
                        count: None,
                    },
                ],
            });

        let bg1_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("prtgi_surfel_relight_bg1_layout"),
                entries: &[
                    // surfels
                    wgpu::BindGroupLayoutEntry {
                        binding: 0,
                        visibility: wgpu::ShaderStages::COMPUTE,
                        ty: wgpu::BindingType::Buffer {
                            ty: wgpu::BufferBindingType::Storage {
                                read_only: true,
                            },
                            has_dynamic_offset: false,
                            min_binding_size: None,
                        },
                        count: None,
                    },
                    // sh_coefficients
                    wgpu::BindGroupLayoutEntry {
                        binding: 1,
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
                    // radiance_debug
                    wgpu::BindGroupLayoutEntry {
                        binding: 2,
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

        let bind_groups = (0..history.period())
            .map(|phase| {
                let write_view = history
                    .write_view_at(phase)
                    .expect("history buffers not initialized");

                let feedback_view = history
                    .feedback_view_at(phase)
                    .expect("history buffers not initialized");

                device.create_bind_group(&wgpu::BindGroupDescriptor {
                    label: Some("prtgi_surfel_relight_bg0"),
                    layout: &bg0_layout,
                    entries: &[
                        wgpu::BindGroupEntry {
                            binding: 0,
                            resource: info.as_binding(),
                        },
                        wgpu::BindGroupEntry {
                            binding: 1,
                            resource: engine.lights.as_binding(),
                        },
                        wgpu::BindGroupEntry {
                            binding: 2,
                            resource: wgpu::BindingResource::TextureView(
                                write_view,
                            ),
                        },
                        wgpu::BindGroupEntry {
                            binding: 3,
                            resource: wgpu::BindingResource::TextureView(
                                feedback_view,
                            ),
                        },
                    ],
                })
            })
            .collect();

        let probe_groups = probes
            .iter()
            .map(|probe| {
                device.create_bind_group(&wgpu::BindGroupDescriptor {
                    label: Some("prtgi_surfel_relight_bg1"),
                    layout: &bg1_layout,
                    entries: &[
                        wgpu::BindGroupEntry {
                            binding: 0,
                            resource: probe.surfels_binding(),
                        },
                        wgpu::BindGroupEntry {
                            binding: 1,
                            resource: probe.sh_binding(),
                        },
                        wgpu::BindGroupEntry {
                            binding: 2,
                            resource: probe.radiance_debug_binding(),
                        },
                    ],
                })
            })
            .collect();

        let pipeline_layout =
            device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                label: Some("prtgi_surfel_relight_pipeline_layout"),
                bind_group_layouts: &[&bg0_layout, &bg1_layout],
                push_constant_ranges: &[wgpu::PushConstantRange {
                    stages: wgpu::ShaderStages::COMPUTE,
                    range: 0..mem::size_of::<gpu::RelightPassParams>() as u32,
                }],
            });

        let pipeline =
            device.create_compute_pipeline(&wgpu::ComputePipelineDescriptor {
                label: Some("prtgi_surfel_relight_pipeline"),
                layout: Some(&pipeline_layout),
                module: &engine.shaders.surfel_relight,
                entry_point: "main",
            });

        Self {
            bind_groups,
            probe_groups,
            pipeline,
        }
    }

    pub fn run(
        &self,
        encoder: &mut wgpu::CommandEncoder,
        phase: usize,
        probe_index: usize,
        params: gpu::RelightPassParams,
    ) {
        let mut pass =
            encoder.begin_compute_pass(&wgpu::ComputePassDescriptor {
                label: Some("prtgi_surfel_relight_pass"),
                timestamp_writes: None,
            });

        pass.set_pipeline(&self.pipeline);
        pass.set_bind_group(0, &self.bind_groups[phase], &[]);
        pass.set_bind_group(1, &self.probe_groups[probe_index], &[]);
        pass.set_push_constants(0, bytemuck::bytes_of(&params));
        pass.dispatch_workgroups(1, 1, 1);
    }
}
