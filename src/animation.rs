//! Per-frame model matrix generators.
//!
//! Each variant owns its own phase counters, replacing the stateful
//! `static` locals of per-kind animation classes with a single closed enum
//! that advances explicitly on `step`.

use crate::math::mat4::Mat4;

const DEGREES_WRAP: f32 = 360.0;

fn wrap_degrees(degrees: f32) -> f32 {
    if degrees > DEGREES_WRAP {
        0.0
    } else {
        degrees
    }
}

#[derive(Clone, Debug)]
pub enum Animation {
    None,
    XRotation { degrees: f32 },
    YRotation { degrees: f32 },
    ZRotation { degrees: f32 },
    Carousel { rotation_degrees: f32, translation_degrees: f32 },
}

impl Animation {
    pub fn none() -> Self {
        Animation::None
    }

    pub fn x_rotation() -> Self {
        Animation::XRotation { degrees: 0.0 }
    }

    pub fn y_rotation() -> Self {
        Animation::YRotation { degrees: 0.0 }
    }

    pub fn z_rotation() -> Self {
        Animation::ZRotation { degrees: 0.0 }
    }

    pub fn carousel() -> Self {
        Animation::Carousel {
            rotation_degrees: 0.0,
            translation_degrees: 0.0,
        }
    }

    /// Advance the animation's phase counters by one frame.
    pub fn step(&mut self) {
        match self {
            Animation::None => {}
            Animation::XRotation { degrees }
            | Animation::YRotation { degrees }
            | Animation::ZRotation { degrees } => {
                *degrees = wrap_degrees(*degrees + 1.0);
            }
            Animation::Carousel {
                rotation_degrees,
                translation_degrees,
            } => {
                *rotation_degrees = wrap_degrees(*rotation_degrees + 0.5);
                *translation_degrees = wrap_degrees(*translation_degrees + 0.15);
            }
        }
    }

    /// The model matrix for the animation's current phase.
    pub fn model_matrix(&self) -> Mat4 {
        match *self {
            Animation::None => Mat4::identity(),
            Animation::XRotation { degrees } => Mat4::rotation_x(degrees.to_radians()),
            Animation::YRotation { degrees } => Mat4::rotation_y(degrees.to_radians()),
            Animation::ZRotation { degrees } => Mat4::rotation_z(degrees.to_radians()),
            Animation::Carousel {
                rotation_degrees,
                translation_degrees,
            } => {
                let translation_radians = translation_degrees.to_radians();
                let translation = Mat4::translation(
                    translation_radians.cos(),
                    translation_radians.sin(),
                    0.0,
                );
                translation * Mat4::rotation_z(rotation_degrees.to_radians())
            }
        }
    }
}

impl Default for Animation {
    fn default() -> Self {
        Animation::none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn no_animation_is_the_identity_every_frame() {
        let mut animation = Animation::none();
        animation.step();
        assert_eq!(animation.model_matrix(), Mat4::identity());
    }

    #[test]
    fn x_rotation_phase_wraps_past_360_degrees() {
        let mut animation = Animation::x_rotation();
        for _ in 0..361 {
            animation.step();
        }
        match animation {
            Animation::XRotation { degrees } => assert_relative_eq!(degrees, 0.0),
            _ => panic!("wrong variant"),
        }
    }

    #[test]
    fn carousel_advances_both_phase_counters_independently() {
        let mut animation = Animation::carousel();
        animation.step();
        match animation {
            Animation::Carousel {
                rotation_degrees,
                translation_degrees,
            } => {
                assert_relative_eq!(rotation_degrees, 0.5);
                assert_relative_eq!(translation_degrees, 0.15);
            }
            _ => panic!("wrong variant"),
        }
    }
}
