//! Common structs, algorithms etc. shared between the relight kernels and the
//! host-side renderer.
//!
//! The WGSL kernels in the `prtgi` crate mirror these layouts field-for-field;
//! this crate is the canonical statement of the kernel math and is where it is
//! unit-tested.

mod grid;
mod lattice;
mod light;
mod noise;
mod passes;
mod radiance;
mod sh;
mod surfel;
mod volume;

pub use self::grid::*;
pub use self::lattice::*;
pub use self::light::*;
pub use self::noise::*;
pub use self::passes::*;
pub use self::radiance::*;
pub use self::sh::*;
pub use self::surfel::*;
pub use self::volume::*;

/// Thread-group width of the sampling and relight kernels.
pub const THREADS_X: u32 = 32;

/// Thread-group height of the sampling and relight kernels.
pub const THREADS_Y: u32 = 16;

/// Number of rays (and so surfels) per probe; one kernel thread each.
pub const RAYS_PER_PROBE: usize = (THREADS_X * THREADS_Y) as usize;
