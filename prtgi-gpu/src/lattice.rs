use core::f32::consts::PI;

use glam::{uvec2, vec3, UVec2, Vec3};

use crate::{Noise, THREADS_X, THREADS_Y};

/// Stratified 32×16 direction lattice over the unit sphere.
///
/// Each kernel thread owns one cell: the X axis strides over azimuth, the Y
/// axis over cosine-uniform elevation, and the per-cell jitter (driven by the
/// bake seed) decorrelates the aliasing the fixed layout would otherwise bake
/// into every probe.
pub fn lattice_direction(cell: UVec2, seed: u32) -> Vec3 {
    let mut noise = Noise::new(seed, cell);

    let u = (cell.x as f32 + noise.sample()) / (THREADS_X as f32);
    let v = (cell.y as f32 + noise.sample()) / (THREADS_Y as f32);

    let phi = u * 2.0 * PI;
    let cos_theta = 1.0 - 2.0 * v;
    let sin_theta = (1.0 - cos_theta * cos_theta).max(0.0).sqrt();

    vec3(sin_theta * phi.cos(), cos_theta, sin_theta * phi.sin())
}

/// All 512 lattice directions, in thread order (`y * 32 + x`).
pub fn lattice_directions(seed: u32) -> impl Iterator<Item = Vec3> {
    (0..THREADS_Y).flat_map(move |y| {
        (0..THREADS_X).map(move |x| lattice_direction(uvec2(x, y), seed))
    })
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;
    use crate::RAYS_PER_PROBE;

    #[test]
    fn directions_are_unit_length() {
        for direction in lattice_directions(0xb4c0ffee) {
            assert_relative_eq!(1.0, direction.length(), epsilon = 1e-5);
        }
    }

    #[test]
    fn determinism() {
        let a: Vec<_> = lattice_directions(123).collect();
        let b: Vec<_> = lattice_directions(123).collect();
        let c: Vec<_> = lattice_directions(124).collect();

        assert_eq!(RAYS_PER_PROBE, a.len());
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn directions_cover_both_hemispheres() {
        let (up, down) = lattice_directions(42)
            .fold((0usize, 0usize), |(up, down), direction| {
                if direction.y >= 0.0 {
                    (up + 1, down)
                } else {
                    (up, down + 1)
                }
            });

        assert_eq!(RAYS_PER_PROBE, up + down);
        assert!(up >= 200);
        assert!(down >= 200);
    }
}
