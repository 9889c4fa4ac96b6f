use glam::{uvec3, UVec3, Vec3};

/// Rectangular probe grid: `size` probes per axis, `spacing` world units
/// apart, anchored at the owning volume's position (the grid's minimum
/// corner).
///
/// Probe order is X-major, then Y, then Z; the persisted surfel buffer and
/// the voxel texture use the same order.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Grid {
    pub size: UVec3,
    pub spacing: f32,
}

impl Grid {
    pub fn new(size: UVec3, spacing: f32) -> Self {
        Self { size, spacing }
    }

    pub fn probe_count(&self) -> usize {
        (self.size.x * self.size.y * self.size.z) as usize
    }

    pub fn index_to_coordinate(&self, index: usize) -> UVec3 {
        let index = index as u32;
        let x = index / (self.size.y * self.size.z);
        let y = (index / self.size.z) % self.size.y;
        let z = index % self.size.z;

        uvec3(x, y, z)
    }

    pub fn coordinate_to_index(&self, coordinate: UVec3) -> usize {
        ((coordinate.x * self.size.y + coordinate.y) * self.size.z
            + coordinate.z) as usize
    }

    /// World-space position of the probe at `coordinate`, given the volume's
    /// minimum corner.
    pub fn probe_position(&self, corner: Vec3, coordinate: UVec3) -> Vec3 {
        corner + coordinate.as_vec3() * self.spacing
    }

    /// Extent of the SH voxel texture: one texel column per probe on X/Z, and
    /// nine depth slices (one per SH basis function) per probe layer on Y.
    pub fn voxel_extent(&self) -> UVec3 {
        uvec3(self.size.x, self.size.z, self.size.y * 9)
    }
}

#[cfg(test)]
mod tests {
    use glam::vec3;

    use super::*;

    #[test]
    fn mapping_is_a_bijection() {
        let grid = Grid::new(uvec3(8, 4, 8), 2.0);

        assert_eq!(256, grid.probe_count());

        for index in 0..grid.probe_count() {
            let coordinate = grid.index_to_coordinate(index);

            assert!(coordinate.cmplt(grid.size).all());
            assert_eq!(index, grid.coordinate_to_index(coordinate));
        }
    }

    #[test]
    fn probe_positions() {
        let grid = Grid::new(uvec3(2, 1, 2), 2.0);
        let corner = vec3(10.0, 0.0, -10.0);

        assert_eq!(
            vec3(10.0, 0.0, -10.0),
            grid.probe_position(corner, uvec3(0, 0, 0)),
        );

        assert_eq!(
            vec3(12.0, 0.0, -8.0),
            grid.probe_position(corner, uvec3(1, 0, 1)),
        );
    }

    #[test]
    fn voxel_extent() {
        let grid = Grid::new(uvec3(8, 4, 8), 2.0);

        assert_eq!(uvec3(8, 8, 36), grid.voxel_extent());
    }
}
