use glam::Vec3;

use crate::{Light, Surfel};

/// Outgoing radiance of one surfel under the current direct lighting;
/// `indirect_irradiance` is the previous frame's bounce term already looked
/// up at the surfel's position (zero during warm-up and in single-bounce
/// setups).
///
/// Sky surfels contribute the flat sky term only; none of their geometry
/// fields may leak into the result.
pub fn surfel_radiance(
    surfel: &Surfel,
    lights: &[Light],
    sky_light_intensity: f32,
    indirect_irradiance: Vec3,
    indirect_intensity: f32,
) -> Vec3 {
    if surfel.is_sky() {
        return Vec3::splat(sky_light_intensity);
    }

    let direct: Vec3 = lights
        .iter()
        .map(|light| {
            light.contribution(surfel.position, surfel.normal, surfel.albedo)
        })
        .sum();

    direct + surfel.albedo * indirect_irradiance * indirect_intensity
}

#[cfg(test)]
mod tests {
    use glam::vec3;

    use super::*;

    #[test]
    fn sky_surfels_ignore_geometry_terms() {
        // Even a sky surfel carrying (bogus) geometry data must light up as
        // sky and nothing else.
        let surfel = Surfel {
            position: vec3(1.0, 2.0, 3.0),
            normal: Vec3::Y,
            albedo: Vec3::ONE,
            sky_mask: 1.0,
        };

        let lights =
            [Light::point(vec3(1.0, 4.0, 3.0), Vec3::ONE * 10.0, 100.0)];

        let radiance =
            surfel_radiance(&surfel, &lights, 0.5, Vec3::ONE * 10.0, 1.0);

        assert_eq!(Vec3::splat(0.5), radiance);
    }

    #[test]
    fn geometry_surfels_sum_direct_and_bounce() {
        let surfel = Surfel {
            position: Vec3::ZERO,
            normal: Vec3::Y,
            albedo: vec3(0.5, 0.5, 0.5),
            sky_mask: 0.0,
        };

        let lights = [Light::point(vec3(0.0, 2.0, 0.0), Vec3::ONE, 100.0)];

        let direct_only =
            surfel_radiance(&surfel, &lights, 1.0, Vec3::ZERO, 1.0);

        let with_bounce =
            surfel_radiance(&surfel, &lights, 1.0, Vec3::ONE, 1.0);

        assert!(direct_only.x > 0.0);
        assert_eq!(with_bounce - direct_only, Vec3::splat(0.5));
    }

    #[test]
    fn black_surfels_reflect_nothing() {
        let surfel = Surfel {
            position: Vec3::ZERO,
            normal: Vec3::Y,
            albedo: Vec3::ZERO,
            sky_mask: 0.0,
        };

        let lights = [Light::point(vec3(0.0, 2.0, 0.0), Vec3::ONE, 100.0)];

        let radiance = surfel_radiance(&surfel, &lights, 1.0, Vec3::ONE, 1.0);

        assert_eq!(Vec3::ZERO, radiance);
    }
}
