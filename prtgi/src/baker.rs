use derivative::Derivative;
use glam::Vec3;
use log::info;

use crate::{
    gpu, CubemapTarget, Probe, Result, Shaders, SurfelSamplingPass,
};

/// Cubemap face resolution of the G-buffer captures.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum BakeResolution {
    #[default]
    R256,
    R512,
}

impl BakeResolution {
    pub fn size(self) -> u32 {
        match self {
            Self::R256 => 256,
            Self::R512 => 512,
        }
    }
}

/// Debug shader every scene object is temporarily switched to while one of
/// the G-buffer cubemaps gets captured.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CaptureShader {
    /// Writes the surface's world-space position into rgb and 1.0 into alpha
    /// (the transparent-black clear marks sky).
    WorldPosition,

    /// Writes the surface's world-space normal.
    Normal,

    /// Writes the surface's flat, unlit albedo.
    Albedo,
}

/// Scene backend the baker drives; implemented by the host's renderer.
pub trait BakeScene {
    /// Switches every scene object's material to `shader`, recording each
    /// material's original shader the first time it gets overridden.
    fn override_shaders(&mut self, shader: CaptureShader);

    /// Restores every recorded original shader exactly once and forgets the
    /// records; restoring with no records is a no-op.
    fn restore_shaders(&mut self);

    /// Renders the scene into all six faces of `target` from a temporary
    /// camera at `position`, cleared to transparent black; the camera must
    /// not outlive the call.
    fn render_cubemap(
        &mut self,
        position: Vec3,
        target: &CubemapTarget,
    ) -> Result<()>;
}

/// Scoped shader override: whatever happens inside the capture sequence,
/// early returns included, the original shaders come back when the guard
/// drops.
pub struct ShaderOverrideGuard<'a, S>
where
    S: BakeScene + ?Sized,
{
    scene: &'a mut S,
}

impl<'a, S> ShaderOverrideGuard<'a, S>
where
    S: BakeScene + ?Sized,
{
    pub fn new(scene: &'a mut S) -> Self {
        Self { scene }
    }

    pub fn set(&mut self, shader: CaptureShader) {
        self.scene.override_shaders(shader);
    }

    pub fn render(
        &mut self,
        position: Vec3,
        target: &CubemapTarget,
    ) -> Result<()> {
        self.scene.render_cubemap(position, target)
    }
}

impl<S> Drop for ShaderOverrideGuard<'_, S>
where
    S: BakeScene + ?Sized,
{
    fn drop(&mut self) {
        self.scene.restore_shaders();
    }
}

/// Captures G-buffer cubemaps at probe positions and turns them into surfels.
///
/// The three cubemap targets are allocated once and reused for every probe of
/// a bake session; each capture overwrites the previous one, so surfels must
/// be sampled before the next [`Self::bake_at_point()`].
#[derive(Derivative)]
#[derivative(Debug)]
pub struct GBufferBaker {
    world_position: CubemapTarget,
    normal: CubemapTarget,
    albedo: CubemapTarget,
    sampling: SurfelSamplingPass,

    #[derivative(Debug = "ignore")]
    progress: Option<Box<dyn FnMut(&str, f32)>>,
}

impl GBufferBaker {
    pub fn new(
        device: &wgpu::Device,
        shaders: &Shaders,
        resolution: BakeResolution,
    ) -> Self {
        let size = resolution.size();

        info!("Creating baker; resolution={size}");

        let world_position = CubemapTarget::new(
            device,
            "prtgi_bake_world_pos",
            size,
            wgpu::TextureFormat::Rgba32Float,
        );

        let normal = CubemapTarget::new(
            device,
            "prtgi_bake_normal",
            size,
            wgpu::TextureFormat::Rgba32Float,
        );

        let albedo = CubemapTarget::new(
            device,
            "prtgi_bake_albedo",
            size,
            wgpu::TextureFormat::Rgba8Unorm,
        );

        let sampling = SurfelSamplingPass::new(shaders, device);

        Self {
            world_position,
            normal,
            albedo,
            sampling,
            progress: None,
        }
    }

    pub fn set_progress_observer(
        &mut self,
        observer: impl FnMut(&str, f32) + 'static,
    ) {
        self.progress = Some(Box::new(observer));
    }

    /// Reports bake progress to the observer, if any.
    pub fn update_progress(&mut self, status: &str, fraction: f32) {
        if let Some(progress) = &mut self.progress {
            progress(status, fraction);
        }
    }

    /// Captures the three G-buffer cubemaps at `position`, overwriting the
    /// shared targets.
    pub fn bake_at_point(
        &self,
        scene: &mut dyn BakeScene,
        position: Vec3,
    ) -> Result<()> {
        let mut scene = ShaderOverrideGuard::new(scene);

        scene.set(CaptureShader::WorldPosition);
        scene.render(position, &self.world_position)?;

        scene.set(CaptureShader::Normal);
        scene.render(position, &self.normal)?;

        scene.set(CaptureShader::Albedo);
        scene.render(position, &self.albedo)?;

        Ok(())
    }

    /// Runs the sampling kernel over the freshly captured cubemaps and reads
    /// the resulting surfels back into `probe`'s host-side copy.
    pub fn sample_surfels(
        &self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        probe: &mut Probe,
        seed: u32,
    ) {
        let params = gpu::SamplingPassParams::new(probe.position(), seed);

        let mut encoder = device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor::default());

        self.sampling.run(
            device,
            &mut encoder,
            &self.world_position,
            &self.normal,
            &self.albedo,
            probe.surfels_buffer(),
            params,
        );

        queue.submit([encoder.finish()]);

        probe.surfels_buffer().read_back(device, queue);
    }

    pub fn world_position(&self) -> &CubemapTarget {
        &self.world_position
    }

    pub fn normal(&self) -> &CubemapTarget {
        &self.normal
    }

    pub fn albedo(&self) -> &CubemapTarget {
        &self.albedo
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct FakeScene {
        overridden: Vec<CaptureShader>,
        restores: usize,
    }

    impl BakeScene for FakeScene {
        fn override_shaders(&mut self, shader: CaptureShader) {
            self.overridden.push(shader);
        }

        fn restore_shaders(&mut self) {
            self.restores += 1;
        }

        fn render_cubemap(
            &mut self,
            _position: Vec3,
            _target: &CubemapTarget,
        ) -> Result<()> {
            Ok(())
        }
    }

    #[test]
    fn guard_restores_on_success() {
        let mut scene = FakeScene::default();

        {
            let mut guard = ShaderOverrideGuard::new(&mut scene);

            guard.set(CaptureShader::WorldPosition);
            guard.set(CaptureShader::Normal);
        }

        assert_eq!(
            vec![CaptureShader::WorldPosition, CaptureShader::Normal],
            scene.overridden,
        );

        assert_eq!(1, scene.restores);
    }

    #[test]
    fn guard_restores_on_early_failure() {
        fn capture(scene: &mut FakeScene, fail: bool) -> Result<()> {
            let mut guard = ShaderOverrideGuard::new(scene);

            guard.set(CaptureShader::WorldPosition);

            if fail {
                // The capture sequence dies before the remaining channels
                return Err(crate::Error::Capture("lost the device".into()));
            }

            guard.set(CaptureShader::Normal);

            Ok(())
        }

        let mut scene = FakeScene::default();

        assert!(capture(&mut scene, true).is_err());
        assert_eq!(vec![CaptureShader::WorldPosition], scene.overridden);
        assert_eq!(1, scene.restores);
    }

    #[test]
    fn bake_resolutions() {
        assert_eq!(256, BakeResolution::R256.size());
        assert_eq!(512, BakeResolution::R512.size());
        assert_eq!(BakeResolution::R256, BakeResolution::default());
    }
}
