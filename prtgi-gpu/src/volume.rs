use bytemuck::{Pod, Zeroable};
use glam::{Vec3, Vec4};

use crate::Grid;

/// Per-volume uniform shared by the relight kernels and the composite pass.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, Pod, Zeroable)]
pub struct VolumeInfo {
    /// x,y,z - world-space minimum corner of the probe grid; w - grid spacing
    pub d0: Vec4,

    /// x,y,z - probe count per axis; w - (as u32) light count
    pub d1: Vec4,

    /// x - sky light intensity; y - indirect intensity; z,w - unused
    pub d2: Vec4,
}

impl VolumeInfo {
    pub fn new(
        corner: Vec3,
        grid: Grid,
        light_count: u32,
        sky_light_intensity: f32,
        indirect_intensity: f32,
    ) -> Self {
        Self {
            d0: corner.extend(grid.spacing),
            d1: grid.size.as_vec3().extend(f32::from_bits(light_count)),
            d2: Vec4::new(sky_light_intensity, indirect_intensity, 0.0, 0.0),
        }
    }

    pub fn corner(&self) -> Vec3 {
        Vec3::new(self.d0.x, self.d0.y, self.d0.z)
    }

    pub fn spacing(&self) -> f32 {
        self.d0.w
    }

    pub fn light_count(&self) -> u32 {
        self.d1.w.to_bits()
    }
}

#[cfg(test)]
mod tests {
    use glam::{uvec3, vec3};

    use super::*;

    #[test]
    fn round_trip() {
        let info = VolumeInfo::new(
            vec3(1.0, 2.0, 3.0),
            Grid::new(uvec3(8, 4, 8), 2.0),
            17,
            1.0,
            0.5,
        );

        assert_eq!(vec3(1.0, 2.0, 3.0), info.corner());
        assert_eq!(2.0, info.spacing());
        assert_eq!(17, info.light_count());
        assert_eq!(8.0, info.d1.x);
    }
}
