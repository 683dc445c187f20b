//! Point light sources on a fixed-radius, fixed-inclination sphere.

use crate::math::vec3::Vec3;

/// ARGB color bytes, alpha first (matches the framebuffer's external color
/// representation used when configuring lights and materials).
pub type ArgbColor = [u8; 4];

const DEFAULT_RADIUS: f32 = 50.0;
const DEFAULT_INCLINATION_DEGREES: f32 = 30.0;
const DEFAULT_COLOR: ArgbColor = [255, 253, 251, 211];
const DEFAULT_SPECULAR_POWER: f32 = 1.0;

/// A light source orbiting the world origin at a fixed radius and
/// inclination; only its azimuth is mutable.
pub struct LightSource {
    world_origin_distance_r: f32,
    azimuth_phi_degrees: f32,
    inclination_theta_degrees: f32,
    color: ArgbColor,
    position: Vec3,
    specular_power: f32,
}

impl LightSource {
    pub fn new() -> Self {
        let mut light = Self {
            world_origin_distance_r: DEFAULT_RADIUS,
            azimuth_phi_degrees: 0.0,
            inclination_theta_degrees: DEFAULT_INCLINATION_DEGREES,
            color: DEFAULT_COLOR,
            position: Vec3::ZERO,
            specular_power: DEFAULT_SPECULAR_POWER,
        };
        light.position = light.new_position();
        light
    }

    pub fn update_position(&mut self, azimuth_degrees: f32) {
        self.azimuth_phi_degrees = azimuth_degrees;
        self.position = self.new_position();
    }

    pub fn position_world(&self) -> Vec3 {
        self.position
    }

    pub fn position_degrees(&self) -> f32 {
        self.azimuth_phi_degrees
    }

    pub fn color(&self) -> ArgbColor {
        self.color
    }

    pub fn set_color(&mut self, color: ArgbColor) {
        self.color = color;
    }

    pub fn specular_power(&self) -> f32 {
        self.specular_power
    }

    pub fn set_specular_power(&mut self, specular_power: f32) {
        self.specular_power = specular_power;
    }

    fn new_position(&self) -> Vec3 {
        let phi = self.azimuth_phi_degrees.to_radians();
        let theta = self.inclination_theta_degrees.to_radians();
        Vec3::new(
            self.world_origin_distance_r * phi.cos() * theta.sin(),
            self.world_origin_distance_r * phi.sin() * theta.sin(),
            self.world_origin_distance_r * theta.cos(),
        )
    }
}

impl Default for LightSource {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn default_light_has_the_reference_color_and_specular_power() {
        let light = LightSource::default();
        assert_eq!(light.color(), [255, 253, 251, 211]);
        assert_relative_eq!(light.specular_power(), 1.0);
    }

    #[test]
    fn position_tracks_azimuth_at_fixed_radius() {
        let mut light = LightSource::default();
        light.update_position(90.0);
        assert_relative_eq!(light.position_world().magnitude(), DEFAULT_RADIUS, epsilon = 1e-4);
        assert_relative_eq!(light.position_degrees(), 90.0);
    }
}
