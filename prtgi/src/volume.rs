use std::ops::DerefMut;

use glam::{uvec3, UVec3, Vec3};
use log::{debug, info, warn};
use rand::Rng;

use crate::{
    gpu, BakeScene, Engine, GBufferBaker, HistoryBuffers,
    MappedUniformBuffer, Params, Probe, Result, SurfelRelightPass,
    UpdateScheduler, VolumeData, VoxelClearPass,
};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum DebugMode {
    #[default]
    None,

    /// Editor draws the probe grid; doesn't affect relighting.
    ProbeGrid,

    /// Relight additionally writes raw per-surfel radiance into each probe's
    /// debug buffer, for the editor's sample visualization.
    ProbeRadiance,
}

#[derive(Clone, Debug, PartialEq)]
pub struct VolumeConfig {
    pub grid_size: UVec3,
    pub grid_spacing: f32,

    /// Spread relighting over multiple frames, updating only a slice of the
    /// probe set per frame; needs the three-buffer history ring.
    pub multi_frame_relight: bool,

    /// Upper bound on probes relit per frame in multi-frame mode; the
    /// effective count is the largest divisor of the probe count below this.
    pub probes_per_frame: usize,

    pub sky_light_intensity: f32,
    pub indirect_intensity: f32,
    pub debug_mode: DebugMode,
}

impl VolumeConfig {
    /// Whether switching to `newer` invalidates baked state: grid shape and
    /// ring mode need a regeneration, the other knobs are live-tunable.
    pub fn is_invalidated_by(&self, newer: &Self) -> bool {
        self.grid_size != newer.grid_size
            || self.grid_spacing != newer.grid_spacing
            || self.multi_frame_relight != newer.multi_frame_relight
    }
}

impl Default for VolumeConfig {
    fn default() -> Self {
        Self {
            grid_size: uvec3(8, 4, 8),
            grid_spacing: 2.0,
            multi_frame_relight: false,
            probes_per_frame: 2,
            sky_light_intensity: 1.0,
            indirect_intensity: 1.0,
            debug_mode: DebugMode::None,
        }
    }
}

#[derive(Debug)]
struct VolumePasses {
    voxel_clear: VoxelClearPass,
    surfel_relight: SurfelRelightPass,
}

impl VolumePasses {
    fn new<P>(
        engine: &Engine<P>,
        device: &wgpu::Device,
        info: &MappedUniformBuffer<gpu::VolumeInfo>,
        grid: gpu::Grid,
        history: &HistoryBuffers,
        probes: &[Probe],
    ) -> Self
    where
        P: Params,
    {
        debug!("Initializing volume passes");

        Self {
            voxel_clear: VoxelClearPass::new(
                &engine.shaders,
                device,
                history,
                grid.voxel_extent(),
            ),
            surfel_relight: SurfelRelightPass::new(
                engine, device, info, history, probes,
            ),
        }
    }
}

/// A 3D grid of light probes plus everything needed to relight them: the SH
/// voxel ring, the per-frame update scheduler and the persisted-surfel
/// plumbing.
#[derive(Debug)]
pub struct ProbeVolume {
    pub enabled: bool,
    config: VolumeConfig,
    position: Vec3,
    grid: gpu::Grid,
    probes: Vec<Probe>,
    history: HistoryBuffers,
    scheduler: UpdateScheduler,
    info: MappedUniformBuffer<gpu::VolumeInfo>,
    passes: VolumePasses,
    data_initialized: bool,
}

impl ProbeVolume {
    pub fn new<P>(
        engine: &Engine<P>,
        device: &wgpu::Device,
        config: VolumeConfig,
        position: Vec3,
    ) -> Self
    where
        P: Params,
    {
        info!("Creating probe volume at {position}");

        let grid = gpu::Grid::new(config.grid_size, config.grid_spacing);
        let probes = Self::create_probes(device, grid, position);

        let mut history = HistoryBuffers::new();

        history.initialize(device, grid, config.multi_frame_relight);

        let info = MappedUniformBuffer::new(
            device,
            "prtgi_volume_info",
            gpu::VolumeInfo::default(),
        );

        let passes = VolumePasses::new(
            engine, device, &info, grid, &history, &probes,
        );

        Self {
            enabled: true,
            config,
            position,
            grid,
            probes,
            history,
            scheduler: UpdateScheduler::new(),
            info,
            passes,
            data_initialized: false,
        }
    }

    /// Host tick: applies the current configuration and position. When a
    /// grid-affecting parameter changed, edit mode regenerates the probe
    /// grid on the spot (discarding baked state until the next bake or
    /// load); outside edit mode the volume just goes inactive, since
    /// regenerating would stall a shipped frame for nothing relightable.
    pub fn update<P>(
        &mut self,
        engine: &Engine<P>,
        device: &wgpu::Device,
        config: VolumeConfig,
        position: Vec3,
        is_edit_mode: bool,
    ) where
        P: Params,
    {
        let needs_rebuilding = self.config.is_invalidated_by(&config)
            || self.position != position;

        self.config = config;
        self.position = position;

        if !needs_rebuilding {
            return;
        }

        if is_edit_mode {
            self.generate(engine, device);
        } else {
            warn!("Grid parameters changed at runtime; volume needs a rebake");

            self.data_initialized = false;
        }
    }

    fn generate<P>(&mut self, engine: &Engine<P>, device: &wgpu::Device)
    where
        P: Params,
    {
        debug!("Regenerating probe grid at {}", self.position);

        // Old resources go first, as a unit, before anything new is allocated
        self.probes.clear();
        self.history.release();

        self.grid =
            gpu::Grid::new(self.config.grid_size, self.config.grid_spacing);

        self.probes = Self::create_probes(device, self.grid, self.position);

        self.history.initialize(
            device,
            self.grid,
            self.config.multi_frame_relight,
        );

        self.passes = VolumePasses::new(
            engine,
            device,
            &self.info,
            self.grid,
            &self.history,
            &self.probes,
        );

        self.scheduler.reset();
        self.data_initialized = false;
    }

    fn create_probes(
        device: &wgpu::Device,
        grid: gpu::Grid,
        position: Vec3,
    ) -> Vec<Probe> {
        (0..grid.probe_count())
            .map(|index| {
                let coordinate = grid.index_to_coordinate(index);

                Probe::new(
                    device,
                    index,
                    grid.probe_position(position, coordinate),
                )
            })
            .collect()
    }

    /// Whether relighting and compositing should touch this volume at all.
    pub fn is_active(&self) -> bool {
        self.enabled
            && !self.probes.is_empty()
            && self.history.is_initialized()
            && self.data_initialized
    }

    /// Sends this frame's volume parameters to the GPU; call once per frame,
    /// after [`Engine::flush()`].
    pub fn flush<P>(&mut self, engine: &Engine<P>, queue: &wgpu::Queue)
    where
        P: Params,
    {
        *self.info.deref_mut() = gpu::VolumeInfo::new(
            self.position,
            self.grid,
            engine.light_count(),
            self.config.sky_light_intensity,
            self.config.indirect_intensity,
        );

        self.info.flush(queue);
    }

    /// Records this frame's relight work: rotates the history ring, clears
    /// the write texture when the clear policy asks for it, then re-projects
    /// this frame's probe slice.
    ///
    /// Inactive volumes skip all work; a stale volume must not take the
    /// frame down with it.
    pub fn relight(&mut self, encoder: &mut wgpu::CommandEncoder) {
        if !self.is_active() {
            debug!("Probe volume inactive, skipping relight");
            return;
        }

        self.history.advance();

        let phase = self.history.phase();

        if self.history.should_clear_write() {
            self.passes.voxel_clear.run(encoder, phase);
        }

        let partial = self.config.multi_frame_relight
            && self.history.is_warmed_up();

        let indices = self.scheduler.next(
            self.probes.len(),
            self.config.probes_per_frame,
            partial,
        );

        let seed = rand::thread_rng().gen();

        let flags = if self.config.debug_mode == DebugMode::ProbeRadiance {
            gpu::RelightPassParams::FLAG_DEBUG_RADIANCE
        } else {
            0
        };

        for index in indices {
            let probe = &self.probes[index];

            let params =
                gpu::RelightPassParams::new(probe.position(), index as u32)
                    .with_seed(seed)
                    .with_flags(flags);

            self.passes.surfel_relight.run(encoder, phase, index, params);
        }
    }

    /// Captures and samples surfels for every probe, blocking until done;
    /// returns the packed record for the host to persist.
    pub fn bake<P>(
        &mut self,
        engine: &Engine<P>,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        scene: &mut dyn BakeScene,
        baker: &mut GBufferBaker,
    ) -> Result<VolumeData>
    where
        P: Params,
    {
        if self.probes.is_empty() {
            self.generate(engine, device);
        }

        let count = self.probes.len();

        info!("Baking {count} probes");

        baker.update_progress(&format!("Baking {count} probes in volume"), 0.0);

        for index in 0..count {
            let position = self.probes[index].position();

            baker.update_progress(
                &format!("Baking probe {}/{count} at {position}", index + 1),
                index as f32 / count as f32,
            );

            baker.bake_at_point(scene, position)?;

            baker.sample_surfels(
                device,
                queue,
                &mut self.probes[index],
                rand::thread_rng().gen(),
            );
        }

        baker.update_progress("Storing surfel data...", 1.0);

        let data = VolumeData::pack(
            self.position,
            self.probes.iter().map(|probe| probe.surfels()),
        );

        self.data_initialized = true;

        Ok(data)
    }

    /// Uploads previously persisted surfels, if they still match the live
    /// grid; a stale record deactivates the volume (and leaves probe buffers
    /// untouched) until it gets rebaked.
    pub fn try_load(
        &mut self,
        queue: &wgpu::Queue,
        data: &VolumeData,
    ) -> Result<()> {
        if let Err(err) =
            data.validate(self.grid.probe_count(), self.position)
        {
            self.data_initialized = false;

            warn!("Volume data is out of date, please rebake it: {err}");

            return Err(err);
        }

        for (index, probe) in self.probes.iter_mut().enumerate() {
            probe.set_surfels(queue, data.unpack_probe(index));
        }

        self.data_initialized = true;

        Ok(())
    }

    /// Discards the persisted record and regenerates an empty grid.
    pub fn clear_data<P>(
        &mut self,
        engine: &Engine<P>,
        device: &wgpu::Device,
        data: &mut VolumeData,
    ) where
        P: Params,
    {
        data.clear();
        self.generate(engine, device);
    }

    pub fn config(&self) -> &VolumeConfig {
        &self.config
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }

    pub fn grid(&self) -> gpu::Grid {
        self.grid
    }

    pub fn probes(&self) -> &[Probe] {
        &self.probes
    }

    /// Voxel texture the composite pass should sample this frame.
    pub fn output_view(&self) -> Option<&wgpu::TextureView> {
        self.history.output_view()
    }
}

impl Drop for ProbeVolume {
    fn drop(&mut self) {
        info!("Deleting probe volume at {}", self.position);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_invalidation() {
        let config = VolumeConfig::default();

        assert!(!config.is_invalidated_by(&config.clone()));

        assert!(config.is_invalidated_by(&VolumeConfig {
            grid_size: uvec3(4, 4, 4),
            ..config.clone()
        }));

        assert!(config.is_invalidated_by(&VolumeConfig {
            grid_spacing: 1.5,
            ..config.clone()
        }));

        assert!(config.is_invalidated_by(&VolumeConfig {
            multi_frame_relight: true,
            ..config.clone()
        }));

        // Live-tunable knobs don't throw baked data away
        assert!(!config.is_invalidated_by(&VolumeConfig {
            probes_per_frame: 10,
            sky_light_intensity: 3.0,
            indirect_intensity: 0.5,
            debug_mode: DebugMode::ProbeRadiance,
            ..config.clone()
        }));
    }

    #[test]
    fn default_grid() {
        let config = VolumeConfig::default();
        let grid = gpu::Grid::new(config.grid_size, config.grid_spacing);

        assert_eq!(256, grid.probe_count());
        assert_eq!(2.0, grid.spacing);
    }
}
