use std::mem;

use glam::Vec3;

use crate::{gpu, MappedStorageBuffer, UnmappedStorageBuffer};

/// One probe of a volume's grid: a fixed set of baked surfels plus the
/// transient per-frame relight state (SH accumulator, debug radiance).
///
/// Probes are created, and their GPU buffers allocated, whenever the owning
/// volume (re)generates its grid; the surfel buffer is filled once at bake
/// time (or from persisted data) while the accumulators are rewritten every
/// relight.
#[derive(Debug)]
pub struct Probe {
    index: usize,
    position: Vec3,
    surfels: MappedStorageBuffer<Vec<gpu::Surfel>>,
    sh_coefficients: UnmappedStorageBuffer,
    radiance_debug: UnmappedStorageBuffer,
}

impl Probe {
    pub(crate) fn new(
        device: &wgpu::Device,
        index: usize,
        position: Vec3,
    ) -> Self {
        let surfels = MappedStorageBuffer::new(
            device,
            format!("prtgi_probe_{index}_surfels"),
            gpu::RAYS_PER_PROBE * mem::size_of::<gpu::Surfel>(),
            vec![gpu::Surfel::default(); gpu::RAYS_PER_PROBE],
        );

        let sh_coefficients = UnmappedStorageBuffer::new(
            device,
            format!("prtgi_probe_{index}_sh"),
            gpu::SH9_VALUES * mem::size_of::<i32>(),
        );

        let radiance_debug = UnmappedStorageBuffer::new(
            device,
            format!("prtgi_probe_{index}_radiance"),
            gpu::RAYS_PER_PROBE * mem::size_of::<[f32; 4]>(),
        );

        Self {
            index,
            position,
            surfels,
            sh_coefficients,
            radiance_debug,
        }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }

    /// Host-side copy of the baked surfels (empty-defaulted until baked or
    /// loaded).
    pub fn surfels(&self) -> &[gpu::Surfel] {
        &self.surfels
    }

    pub(crate) fn set_surfels(
        &mut self,
        queue: &wgpu::Queue,
        surfels: &[gpu::Surfel],
    ) {
        self.surfels.copy_from_slice(surfels);
        self.surfels.flush(queue);
    }

    pub(crate) fn surfels_buffer(
        &mut self,
    ) -> &mut MappedStorageBuffer<Vec<gpu::Surfel>> {
        &mut self.surfels
    }

    pub(crate) fn surfels_binding(&self) -> wgpu::BindingResource {
        self.surfels.as_binding()
    }

    pub(crate) fn sh_binding(&self) -> wgpu::BindingResource {
        self.sh_coefficients.as_binding()
    }

    pub(crate) fn radiance_debug_binding(&self) -> wgpu::BindingResource {
        self.radiance_debug.as_binding()
    }

    /// GPU buffer the editor's gizmos read SH coefficients from.
    pub fn sh_coefficients(&self) -> &wgpu::Buffer {
        self.sh_coefficients.as_buffer()
    }

    /// GPU buffer the editor's gizmos read per-surfel radiance from.
    pub fn radiance_debug(&self) -> &wgpu::Buffer {
        self.radiance_debug.as_buffer()
    }
}
