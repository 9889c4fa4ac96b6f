use glam::UVec3;
use log::debug;

use crate::{HistoryBuffers, Shaders};

/// Zeroes the write-tagged voxel texture; one prebuilt bind group per ring
/// phase.
#[derive(Debug)]
pub struct VoxelClearPass {
    bind_groups: Vec<wgpu::BindGroup>,
    pipeline: wgpu::ComputePipeline,
    extent: UVec3,
}

impl VoxelClearPass {
    pub fn new(
        shaders: &Shaders,
        device: &wgpu::Device,
        history: &HistoryBuffers,
        extent: UVec3,
    ) -> Self {
        debug!("Initializing pass: voxel_clear");

        let layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("prtgi_voxel_clear_bg0_layout"),
                entries: &[
                    // voxel_out
                    wgpu::BindGroupLayoutEntry {
                        binding: 0,
                        visibility: wgpu::ShaderStages::COMPUTE,
                        ty: wgpu::BindingType::StorageTexture {
                            access: wgpu::StorageTextureAccess::WriteOnly,
                            format: wgpu::TextureFormat::Rgba32Sint,
                            view_dimension: wgpu::TextureViewDimension::D3,
                        },
                        count: None,
                    },
                ],
            });

        let bind_groups = (0..history.period())
            .map(|phase| {
                let view = history
                    .write_view_at(phase)
                    .expect("history buffers not initialized");

                device.create_bind_group(&wgpu::BindGroupDescriptor {
                    label: Some("prtgi_voxel_clear_bg0"),
                    layout: &layout,
                    entries: &[wgpu::BindGroupEntry {
                        binding: 0,
                        resource: wgpu::BindingResource::TextureView(view),
                    }],
                })
            })
            .collect();

        let pipeline_layout =
            device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                label: Some("prtgi_voxel_clear_pipeline_layout"),
                bind_group_layouts: &[&layout],
                push_constant_ranges: &[],
            });

        let pipeline =
            device.create_compute_pipeline(&wgpu::ComputePipelineDescriptor {
                label: Some("prtgi_voxel_clear_pipeline"),
                layout: Some(&pipeline_layout),
                module: &shaders.voxel_clear,
                entry_point: "main",
            });

        Self {
            bind_groups,
            pipeline,
            extent,
        }
    }

    pub fn run(&self, encoder: &mut wgpu::CommandEncoder, phase: usize) {
        let mut pass =
            encoder.begin_compute_pass(&wgpu::ComputePassDescriptor {
                label: Some("prtgi_voxel_clear_pass"),
                timestamp_writes: None,
            });

        pass.set_pipeline(&self.pipeline);
        pass.set_bind_group(0, &self.bind_groups[phase], &[]);

        pass.dispatch_workgroups(
            self.extent.x.div_ceil(4),
            self.extent.y.div_ceil(4),
            self.extent.z.div_ceil(4),
        );
    }
}
