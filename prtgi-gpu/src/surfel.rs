use bytemuck::{Pod, Zeroable};
use glam::Vec3;

/// Number of floats a surfel occupies in the persisted storage buffer.
pub const SURFEL_FLOATS: usize = 10;

/// Surfels whose `sky_mask` reaches this value hit the sky; their geometry
/// fields carry no meaning and must not contribute lighting terms.
pub const SKY_MASK_THRESHOLD: f32 = 0.995;

/// Distance at which sky hits are anchored so that their sample direction
/// survives the capture (`position = probe + direction * SKY_RAY_LENGTH`).
pub const SKY_RAY_LENGTH: f32 = 25.0;

/// A single ray-sampled point of scene geometry (or sky), captured once at
/// bake time and integrated every frame by the relight kernel.
///
/// Layout matches the kernel's storage-buffer struct: ten tightly packed
/// `f32`s, no padding.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable)]
pub struct Surfel {
    pub position: Vec3,
    pub normal: Vec3,
    pub albedo: Vec3,
    pub sky_mask: f32,
}

impl Surfel {
    /// Creates a surfel for a ray that hit the sky, anchored along `direction`
    /// so that relighting and debug views can recover where the ray went.
    pub fn sky(probe_position: Vec3, direction: Vec3) -> Self {
        Self {
            position: probe_position + direction * SKY_RAY_LENGTH,
            normal: Vec3::ZERO,
            albedo: Vec3::ZERO,
            sky_mask: 1.0,
        }
    }

    pub fn is_sky(&self) -> bool {
        self.sky_mask >= SKY_MASK_THRESHOLD
    }

    /// Direction the sampling ray left the probe in.
    pub fn direction_from(&self, probe_position: Vec3) -> Vec3 {
        (self.position - probe_position).normalize_or_zero()
    }
}
