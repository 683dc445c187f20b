//! Spherical orbit camera.
//!
//! The camera is parameterized by spherical coordinates `(r, phi, theta)`
//! around the world origin; an orthonormal basis is re-derived whenever the
//! orbit angles change.

use crate::math::{mat4::Mat4, vec3::Vec3};

const AZIMUTH_WRAP_DEGREES: f32 = 360.0;
const INCLINATION_MIN_DEGREES: f32 = 0.0;
const INCLINATION_MAX_DEGREES: f32 = 180.0;

fn degrees_to_radians(degrees: f32) -> f32 {
    degrees.to_radians()
}

pub struct Camera {
    world_origin_distance_r: f32,
    azimuth_phi_degrees: f32,
    inclination_theta_degrees: f32,

    origin_point: Vec3,
    x_camera_vector: Vec3,
    y_camera_vector: Vec3,
    z_camera_vector: Vec3,
}

impl Camera {
    /// Default orbit radius used by the reference implementation.
    pub const DEFAULT_RADIUS: f32 = 200.0;

    pub fn new(sphere_radius: f32) -> Self {
        Self {
            world_origin_distance_r: sphere_radius,
            azimuth_phi_degrees: 0.0,
            inclination_theta_degrees: 0.0,
            origin_point: Vec3::new(0.0, 0.0, sphere_radius),
            x_camera_vector: Vec3::new(0.0, 1.0, 0.0),
            y_camera_vector: Vec3::new(1.0, 0.0, 0.0),
            z_camera_vector: Vec3::new(0.0, 0.0, -1.0),
        }
    }

    pub fn set_world_origin_distance_r(&mut self, r: f32) {
        self.world_origin_distance_r = r;
        let magnitude = self.origin_point.magnitude();
        if magnitude > f32::EPSILON {
            self.origin_point = self.origin_point.scale(r / magnitude);
        }
    }

    /// Advance the orbit by small azimuth/inclination deltas (degrees),
    /// rederiving the orthonormal basis.
    pub fn update_camera_position(&mut self, azimuth_delta_degrees: f32, inclination_delta_degrees: f32) {
        self.update_azimuth_angle(azimuth_delta_degrees);
        let rotation_axis = self.rotation_axis();

        self.update_inclination_angle(inclination_delta_degrees);
        let old_y_camera_vector = Vec3::new(0.0, 0.0, -1.0);
        let new_y_camera_vector = old_y_camera_vector.rotate_around_axis(
            -rotation_axis,
            degrees_to_radians(90.0 - self.inclination_theta_degrees),
        );

        self.origin_point =
            self.new_camera_origin_position(self.azimuth_phi_degrees, self.inclination_theta_degrees);
        let new_z_camera_vector = -self.origin_point.normalize();
        let new_x_camera_vector = new_y_camera_vector.cross(new_z_camera_vector);

        self.x_camera_vector = new_x_camera_vector;
        self.y_camera_vector = new_y_camera_vector;
        self.z_camera_vector = new_z_camera_vector;
    }

    pub fn set_view_from_x(&mut self) {
        self.azimuth_phi_degrees = 0.0;
        self.inclination_theta_degrees = 90.0;
        self.origin_point = Vec3::new(self.world_origin_distance_r, 0.0, 0.0);
        self.x_camera_vector = Vec3::new(0.0, 1.0, 0.0);
        self.y_camera_vector = Vec3::new(0.0, 0.0, -1.0);
        self.z_camera_vector = Vec3::new(-1.0, 0.0, 0.0);
    }

    pub fn set_view_from_y(&mut self) {
        self.azimuth_phi_degrees = 90.0;
        self.inclination_theta_degrees = 90.0;
        self.origin_point = Vec3::new(0.0, self.world_origin_distance_r, 0.0);
        self.x_camera_vector = Vec3::new(-1.0, 0.0, 0.0);
        self.y_camera_vector = Vec3::new(0.0, 0.0, -1.0);
        self.z_camera_vector = Vec3::new(0.0, -1.0, 0.0);
    }

    pub fn set_view_from_z(&mut self) {
        self.azimuth_phi_degrees = 0.0;
        self.inclination_theta_degrees = 0.0;
        self.origin_point = Vec3::new(0.0, 0.0, self.world_origin_distance_r);
        self.x_camera_vector = Vec3::new(0.0, 1.0, 0.0);
        self.y_camera_vector = Vec3::new(1.0, 0.0, 0.0);
        self.z_camera_vector = Vec3::new(0.0, 0.0, -1.0);
    }

    /// Basis vectors as columns, origin as the translation column.
    pub fn matrix(&self) -> Mat4 {
        Mat4::new([
            [
                self.x_camera_vector.x,
                self.y_camera_vector.x,
                self.z_camera_vector.x,
                self.origin_point.x,
            ],
            [
                self.x_camera_vector.y,
                self.y_camera_vector.y,
                self.z_camera_vector.y,
                self.origin_point.y,
            ],
            [
                self.x_camera_vector.z,
                self.y_camera_vector.z,
                self.z_camera_vector.z,
                self.origin_point.z,
            ],
            [0.0, 0.0, 0.0, 1.0],
        ])
    }

    pub fn world_view_direction(&self) -> Vec3 {
        self.z_camera_vector
    }

    fn new_camera_origin_position(&self, azimuth_degrees: f32, inclination_degrees: f32) -> Vec3 {
        let phi = degrees_to_radians(azimuth_degrees);
        let theta = degrees_to_radians(inclination_degrees);
        Vec3::new(
            self.world_origin_distance_r * phi.cos() * theta.sin(),
            self.world_origin_distance_r * phi.sin() * theta.sin(),
            self.world_origin_distance_r * theta.cos(),
        )
    }

    fn rotation_axis(&self) -> Vec3 {
        let new_position = self.new_camera_origin_position(self.azimuth_phi_degrees, 90.0);
        let new_z_camera_vector = -new_position.normalize();
        let y_camera_vector = Vec3::new(0.0, 0.0, -1.0);
        y_camera_vector.cross(new_z_camera_vector)
    }

    fn update_azimuth_angle(&mut self, delta_degrees: f32) {
        self.azimuth_phi_degrees += delta_degrees;
        if self.azimuth_phi_degrees > AZIMUTH_WRAP_DEGREES
            || self.azimuth_phi_degrees < -AZIMUTH_WRAP_DEGREES
        {
            self.azimuth_phi_degrees = 0.0;
        }
    }

    fn update_inclination_angle(&mut self, delta_degrees: f32) {
        self.inclination_theta_degrees += delta_degrees;
        self.inclination_theta_degrees = self
            .inclination_theta_degrees
            .clamp(INCLINATION_MIN_DEGREES, INCLINATION_MAX_DEGREES);
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::new(Self::DEFAULT_RADIUS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn default_camera_looks_down_negative_z_from_positive_z() {
        let camera = Camera::default();
        assert_relative_eq!(camera.world_view_direction().z, -1.0);
        assert_relative_eq!(camera.matrix().get(2, 3), Camera::DEFAULT_RADIUS);
    }

    #[test]
    fn inclination_clamps_to_0_180_range() {
        let mut camera = Camera::default();
        camera.update_camera_position(0.0, 1000.0);
        assert!(camera.inclination_theta_degrees <= 180.0);
        camera.update_camera_position(0.0, -5000.0);
        assert!(camera.inclination_theta_degrees >= 0.0);
    }

    #[test]
    fn azimuth_wraps_outside_plus_minus_360() {
        let mut camera = Camera::default();
        for _ in 0..181 {
            camera.update_camera_position(2.0, 0.0);
        }
        assert_eq!(camera.azimuth_phi_degrees, 0.0);
    }

    #[test]
    fn set_view_from_x_places_camera_on_the_x_axis() {
        let mut camera = Camera::default();
        camera.set_view_from_x();
        assert_relative_eq!(camera.origin_point.x, Camera::DEFAULT_RADIUS);
        assert_relative_eq!(camera.origin_point.y, 0.0);
        assert_relative_eq!(camera.origin_point.z, 0.0);
    }

    #[test]
    fn camera_matrix_is_invertible() {
        let camera = Camera::default();
        assert!(camera.matrix().inverse().is_some());
    }
}
