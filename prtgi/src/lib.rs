//! Probe-based precomputed radiance transfer.
//!
//! A sparse grid of light probes samples its surroundings once, at bake time,
//! through G-buffer cubemap captures that get condensed into a fixed set of
//! world-space surfels per probe. Every frame those surfels are re-evaluated
//! against the current direct lighting and projected into a 9-coefficient
//! spherical-harmonics record per probe, stored in a rotating set of 3D
//! textures; feeding the previous frame's texture back into the evaluation
//! approximates an unbounded number of light bounces.
//!
//! The device must be created with [`wgpu::Features::PUSH_CONSTANTS`] and
//! `max_push_constant_size >= 32`.

mod baker;
mod buffers;
mod history;
mod lights;
mod passes;
mod probe;
mod scheduler;
mod shaders;
mod volume;
mod volume_data;

use std::fmt::Debug;
use std::hash::Hash;

use glam::Vec3;

pub use self::baker::*;
pub use self::buffers::*;
pub use self::history::*;
pub use self::lights::*;
pub(crate) use self::passes::*;
pub use self::probe::*;
pub use self::scheduler::*;
pub use self::shaders::*;
pub use self::volume::*;
pub use self::volume_data::*;
pub use prtgi_gpu as gpu;

pub trait Params
where
    Self: Clone + Debug,
{
    type LightHandle: Clone + Debug + Eq + Hash;
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(
        "persisted surfel data carries {found} floats, but the current grid \
         needs {expected}"
    )]
    StaleDataLength { expected: usize, found: usize },

    #[error(
        "persisted surfel data was baked at {found}, but the volume sits at \
         {expected}"
    )]
    StaleDataPosition { expected: Vec3, found: Vec3 },

    #[error("cubemap capture failed: {0}")]
    Capture(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Top-level object, created once per device; owns the compiled kernels and
/// the dynamic lights that drive each frame's relighting.
#[derive(Debug)]
pub struct Engine<P>
where
    P: Params,
{
    pub(crate) shaders: Shaders,
    pub(crate) lights: Lights<P>,
}

impl<P> Engine<P>
where
    P: Params,
{
    pub fn new(device: &wgpu::Device) -> Self {
        log::info!("Initializing");

        Self {
            shaders: Shaders::new(device),
            lights: Lights::new(device),
        }
    }

    pub fn add_light(&mut self, handle: P::LightHandle, light: gpu::Light) {
        self.lights.add(handle, light);
    }

    pub fn remove_light(&mut self, handle: &P::LightHandle) {
        self.lights.remove(handle);
    }

    pub fn light_count(&self) -> u32 {
        self.lights.len()
    }

    /// Sends this frame's lights to the GPU; call once per frame, before any
    /// volume is relit.
    pub fn flush(&mut self, queue: &wgpu::Queue) {
        self.lights.flush(queue);
    }
}
