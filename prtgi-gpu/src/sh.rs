use core::f32::consts::PI;

use glam::Vec3;

/// Number of basis functions in the SH9 (second-order) expansion.
pub const SH9_BASIS: usize = 9;

/// Number of accumulator slots per probe: nine basis functions, three color
/// channels each.
pub const SH9_VALUES: usize = SH9_BASIS * 3;

/// Fixed-point scale used when SH coefficients are stored as `i32` so the
/// relight kernel can accumulate them atomically. Gives ±524288 of dynamic
/// range at ~2.4e-4 resolution, which covers expected radiance magnitudes
/// with plenty of headroom against 512-sample accumulation.
pub const SH_FIXED_POINT_SCALE: f32 = 4096.0;

/// Evaluates the nine real SH basis functions along `direction` (unit).
pub fn eval_sh9(direction: Vec3) -> [f32; SH9_BASIS] {
    let Vec3 { x, y, z } = direction;

    [
        0.2820948,
        0.4886025 * y,
        0.4886025 * z,
        0.4886025 * x,
        1.0925484 * x * y,
        1.0925484 * y * z,
        0.3153916 * (3.0 * z * z - 1.0),
        1.0925484 * x * z,
        0.5462742 * (x * x - y * y),
    ]
}

/// Projects one sample's radiance onto the SH9 accumulator; `weight` carries
/// the Monte-Carlo factor (`4π / sample count` for a uniform sphere lattice).
pub fn project_sh9(
    accumulator: &mut [f32; SH9_VALUES],
    direction: Vec3,
    radiance: Vec3,
    weight: f32,
) {
    let basis = eval_sh9(direction);

    for (i, y) in basis.iter().enumerate() {
        let contribution = radiance * *y * weight;

        accumulator[3 * i] += contribution.x;
        accumulator[3 * i + 1] += contribution.y;
        accumulator[3 * i + 2] += contribution.z;
    }
}

/// Reconstructs irradiance arriving at a surface with `normal` from an SH9
/// radiance expansion, using the standard cosine-lobe convolution constants.
pub fn eval_irradiance_sh9(
    coefficients: &[f32; SH9_VALUES],
    normal: Vec3,
) -> Vec3 {
    const A0: f32 = PI;
    const A1: f32 = 2.0 * PI / 3.0;
    const A2: f32 = PI / 4.0;

    let basis = eval_sh9(normal);
    let band = [A0, A1, A1, A1, A2, A2, A2, A2, A2];
    let mut irradiance = Vec3::ZERO;

    for i in 0..SH9_BASIS {
        let coefficient = Vec3::new(
            coefficients[3 * i],
            coefficients[3 * i + 1],
            coefficients[3 * i + 2],
        );

        irradiance += coefficient * basis[i] * band[i];
    }

    irradiance.max(Vec3::ZERO)
}

/// Encodes a coefficient into the fixed-point form stored in the voxel
/// texture.
pub fn encode_coefficient(value: f32) -> i32 {
    (value * SH_FIXED_POINT_SCALE).round() as i32
}

/// Decodes a fixed-point coefficient read back from the voxel texture.
pub fn decode_coefficient(value: i32) -> f32 {
    (value as f32) / SH_FIXED_POINT_SCALE
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    use glam::vec3;

    use super::*;

    #[test]
    fn fixed_point_round_trip() {
        for value in [-128.0, -1.0, -0.125, 0.0, 0.25, 3.5, 100.0] {
            let decoded = decode_coefficient(encode_coefficient(value));

            assert_relative_eq!(value, decoded, epsilon = 1.0 / 4096.0);
        }
    }

    #[test]
    fn constant_environment_projects_onto_dc_band() {
        // Projecting a constant unit radiance over a uniform sphere lattice
        // must land (almost) entirely in the first coefficient; the
        // reconstructed irradiance then equals π for every orientation.
        let mut accumulator = [0.0; SH9_VALUES];
        let weight = 4.0 * PI / (crate::RAYS_PER_PROBE as f32);

        for direction in crate::lattice_directions(7) {
            project_sh9(&mut accumulator, direction, Vec3::ONE, weight);
        }

        let dc = accumulator[0];

        assert_relative_eq!(4.0 * PI * 0.2820948, dc, epsilon = 0.05);

        for normal in [Vec3::X, Vec3::Y, Vec3::NEG_Z] {
            let irradiance = eval_irradiance_sh9(&accumulator, normal);

            assert_relative_eq!(PI, irradiance.x, epsilon = 0.1);
            assert_relative_eq!(PI, irradiance.y, epsilon = 0.1);
        }
    }

    #[test]
    fn directional_lobe_projects_onto_linear_band() {
        let mut accumulator = [0.0; SH9_VALUES];

        project_sh9(&mut accumulator, vec3(0.0, 1.0, 0.0), Vec3::ONE, 1.0);

        // Y1m1 tracks +Y, so it must dominate the other linear terms.
        assert!(accumulator[3] > 0.0);
        assert_relative_eq!(0.0, accumulator[6], epsilon = 1e-6);
        assert_relative_eq!(0.0, accumulator[9], epsilon = 1e-6);
    }
}
