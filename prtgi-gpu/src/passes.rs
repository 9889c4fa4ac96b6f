use bytemuck::{Pod, Zeroable};
use glam::{Vec3, Vec4};

/// Push constants of the surfel-sampling kernel.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, Pod, Zeroable)]
pub struct SamplingPassParams {
    /// x,y,z - probe position; w - (as u32) lattice jitter seed
    pub d0: Vec4,
}

impl SamplingPassParams {
    pub fn new(probe_position: Vec3, seed: u32) -> Self {
        Self {
            d0: probe_position.extend(f32::from_bits(seed)),
        }
    }

    pub fn probe_position(&self) -> Vec3 {
        Vec3::new(self.d0.x, self.d0.y, self.d0.z)
    }

    pub fn seed(&self) -> u32 {
        self.d0.w.to_bits()
    }
}

/// Push constants of the relight kernel.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, Pod, Zeroable)]
pub struct RelightPassParams {
    /// x,y,z - probe position; w - (as u32) probe index within the volume
    pub d0: Vec4,

    /// x - (as u32) per-frame seed; y - (as u32) flags; z,w - unused
    pub d1: Vec4,
}

impl RelightPassParams {
    pub const FLAG_DEBUG_RADIANCE: u32 = 1;

    pub fn new(probe_position: Vec3, probe_index: u32) -> Self {
        Self {
            d0: probe_position.extend(f32::from_bits(probe_index)),
            d1: Vec4::ZERO,
        }
    }

    pub fn with_seed(mut self, seed: u32) -> Self {
        self.d1.x = f32::from_bits(seed);
        self
    }

    pub fn with_flags(mut self, flags: u32) -> Self {
        self.d1.y = f32::from_bits(flags);
        self
    }

    pub fn probe_index(&self) -> u32 {
        self.d0.w.to_bits()
    }

    pub fn flags(&self) -> u32 {
        self.d1.y.to_bits()
    }
}

#[cfg(test)]
mod tests {
    use glam::vec3;

    use super::*;

    #[test]
    fn params_round_trip() {
        let params = RelightPassParams::new(vec3(1.0, 2.0, 3.0), 123)
            .with_seed(0xdeadbeef)
            .with_flags(RelightPassParams::FLAG_DEBUG_RADIANCE);

        assert_eq!(123, params.probe_index());
        assert_eq!(0xdeadbeef, params.d1.x.to_bits());
        assert_eq!(1, params.flags());

        let params = SamplingPassParams::new(vec3(1.0, 2.0, 3.0), 42);

        assert_eq!(vec3(1.0, 2.0, 3.0), params.probe_position());
        assert_eq!(42, params.seed());
    }
}
