mod surfel_relight;
mod surfel_sampling;
mod voxel_clear;

pub use self::surfel_relight::*;
pub use self::surfel_sampling::*;
pub use self::voxel_clear::*;
