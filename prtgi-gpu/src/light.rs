use bytemuck::{Pod, Zeroable};
use glam::{Vec3, Vec4, Vec4Swizzles};

/// Dynamic direct light, as seen by the relight kernel.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, Pod, Zeroable)]
pub struct Light {
    /// x - position x
    /// y - position y
    /// z - position z
    /// w - radius
    pub d0: Vec4,

    /// x - color r
    /// y - color g
    /// z - color b
    /// w - range
    pub d1: Vec4,
}

impl Light {
    pub fn point(position: Vec3, color: Vec3, range: f32) -> Self {
        Self {
            d0: position.extend(0.0),
            d1: color.extend(range),
        }
    }

    pub fn center(&self) -> Vec3 {
        self.d0.xyz()
    }

    pub fn radius(&self) -> f32 {
        self.d0.w
    }

    pub fn color(&self) -> Vec3 {
        self.d1.xyz()
    }

    pub fn range(&self) -> f32 {
        self.d1.w
    }

    /// Diffuse contribution of this light on a surface point; inverse-square
    /// falloff with a smooth window that reaches zero at `range`.
    pub fn contribution(
        &self,
        position: Vec3,
        normal: Vec3,
        albedo: Vec3,
    ) -> Vec3 {
        let to_light = self.center() - position;
        let distance_squared = to_light.length_squared();

        if distance_squared <= f32::EPSILON {
            return Vec3::ZERO;
        }

        let direction = to_light / distance_squared.sqrt();
        let n_dot_l = normal.dot(direction).max(0.0);

        let attenuation = {
            let inv_range_squared = 1.0 / (self.range() * self.range());
            let factor = distance_squared * inv_range_squared;
            let smooth = (1.0 - factor * factor).clamp(0.0, 1.0);

            smooth * smooth / distance_squared.max(1e-4)
        };

        self.color() * albedo * n_dot_l * attenuation
    }
}

/// Index of a light within the engine's light buffer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct LightId(u32);

impl LightId {
    pub fn new(id: u32) -> Self {
        Self(id)
    }

    pub fn get(self) -> u32 {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use glam::vec3;

    use super::*;

    #[test]
    fn contribution_follows_inverse_square() {
        let light = Light::point(vec3(0.0, 4.0, 0.0), Vec3::ONE, 100.0);

        let near = light.contribution(
            vec3(0.0, 2.0, 0.0),
            Vec3::Y,
            Vec3::ONE,
        );

        let far = light.contribution(
            vec3(0.0, 0.0, 0.0),
            Vec3::Y,
            Vec3::ONE,
        );

        assert!(near.x > far.x);
        assert!(far.x > 0.0);
        assert!(near.x / far.x > 3.0 && near.x / far.x < 5.0);
    }

    #[test]
    fn contribution_respects_facing() {
        let light = Light::point(vec3(0.0, 4.0, 0.0), Vec3::ONE, 100.0);

        let backface = light.contribution(
            vec3(0.0, 0.0, 0.0),
            Vec3::NEG_Y,
            Vec3::ONE,
        );

        assert_eq!(Vec3::ZERO, backface);
    }

    #[test]
    fn contribution_vanishes_past_range() {
        let light = Light::point(Vec3::ZERO, Vec3::ONE, 5.0);

        let outside = light.contribution(
            vec3(0.0, -6.0, 0.0),
            Vec3::Y,
            Vec3::ONE,
        );

        assert_eq!(Vec3::ZERO, outside);
    }
}
