// SpecHack
// copyright zipxing@hotmail.com 2022～2025

//! Rigid body of the credential card.
//!
//! Only rotation is simulated. The card hangs at the origin with zero
//! gravity; a flick spins it up and angular damping brings it to rest.

use glam::{Quat, Vec3};

pub const CARD_WIDTH: f32 = 3.0;
pub const CARD_HEIGHT: f32 = 4.0;
pub const CARD_DEPTH: f32 = 0.05;

pub const ANGULAR_DAMPING: f32 = 3.0;
pub const LINEAR_DAMPING: f32 = 2.0;

/// card mass at unit density
const CARD_MASS: f32 = CARD_WIDTH * CARD_HEIGHT * CARD_DEPTH;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyType {
    Dynamic,
    /// moved by setting its next rotation, ignores impulses
    KinematicPosition,
}

/// The operations the interaction layer needs from a physics body.
pub trait RigidBody {
    fn rotation(&self) -> Quat;
    fn body_type(&self) -> BodyType;
    fn set_body_type(&mut self, body_type: BodyType);
    /// rotation the kinematic body reaches at the next step
    fn set_next_kinematic_rotation(&mut self, rotation: Quat);
    fn apply_torque_impulse(&mut self, torque: Vec3);
    fn reset_velocity(&mut self);
    fn angular_velocity(&self) -> Vec3;
    fn step(&mut self, dt: f32);
}

#[derive(Debug, Clone, PartialEq)]
pub struct CardBody {
    rotation: Quat,
    angvel: Vec3,
    body_type: BodyType,
    next_rotation: Option<Quat>,
    /// principal moments of a solid 3 x 4 x 0.05 box
    inertia: Vec3,
    pub angular_damping: f32,
    pub linear_damping: f32,
    pub gravity_scale: f32,
}

impl Default for CardBody {
    fn default() -> Self {
        Self::new()
    }
}

impl CardBody {
    pub fn new() -> Self {
        let (w2, h2, d2) = (
            CARD_WIDTH * CARD_WIDTH,
            CARD_HEIGHT * CARD_HEIGHT,
            CARD_DEPTH * CARD_DEPTH,
        );
        Self {
            rotation: Quat::IDENTITY,
            angvel: Vec3::ZERO,
            body_type: BodyType::KinematicPosition,
            next_rotation: None,
            inertia: Vec3::new(
                CARD_MASS * (h2 + d2) / 12.0,
                CARD_MASS * (w2 + d2) / 12.0,
                CARD_MASS * (w2 + h2) / 12.0,
            ),
            angular_damping: ANGULAR_DAMPING,
            linear_damping: LINEAR_DAMPING,
            gravity_scale: 0.0,
        }
    }

    pub fn inertia(&self) -> Vec3 {
        self.inertia
    }

    /// true when the back face points at the camera
    pub fn shows_back(&self) -> bool {
        (self.rotation * Vec3::Z).z < 0.0
    }
}

impl RigidBody for CardBody {
    fn rotation(&self) -> Quat {
        self.rotation
    }

    fn body_type(&self) -> BodyType {
        self.body_type
    }

    fn set_body_type(&mut self, body_type: BodyType) {
        if body_type != self.body_type {
            self.next_rotation = None;
        }
        self.body_type = body_type;
    }

    fn set_next_kinematic_rotation(&mut self, rotation: Quat) {
        if self.body_type == BodyType::KinematicPosition {
            self.next_rotation = Some(rotation.normalize());
        }
    }

    fn apply_torque_impulse(&mut self, torque: Vec3) {
        if self.body_type == BodyType::Dynamic {
            self.angvel += torque / self.inertia;
        }
    }

    fn reset_velocity(&mut self) {
        self.angvel = Vec3::ZERO;
    }

    fn angular_velocity(&self) -> Vec3 {
        self.angvel
    }

    fn step(&mut self, dt: f32) {
        if dt <= 0.0 {
            return;
        }
        match self.body_type {
            BodyType::KinematicPosition => {
                if let Some(next) = self.next_rotation.take() {
                    self.rotation = next;
                }
                self.angvel = Vec3::ZERO;
            }
            BodyType::Dynamic => {
                self.angvel *= 1.0 / (1.0 + dt * self.angular_damping);
                let spin = Quat::from_scaled_axis(self.angvel * dt);
                self.rotation = (spin * self.rotation).normalize();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinematic_ignores_impulses() {
        let mut b = CardBody::new();
        b.apply_torque_impulse(Vec3::new(0.0, 12.0, 0.0));
        assert_eq!(b.angular_velocity(), Vec3::ZERO);
        let q = Quat::from_rotation_y(0.5);
        b.set_next_kinematic_rotation(q);
        b.step(1.0 / 60.0);
        assert!(b.rotation().abs_diff_eq(q, 1e-6));
    }

    #[test]
    fn damping_brings_spin_to_rest() {
        let mut b = CardBody::new();
        b.set_body_type(BodyType::Dynamic);
        b.apply_torque_impulse(Vec3::new(0.0, 12.0, 0.0));
        let w0 = b.angular_velocity().y;
        assert!(w0 > 0.0);
        for _ in 0..600 {
            b.step(1.0 / 60.0);
        }
        assert!(b.angular_velocity().y < w0 * 1e-3);
        assert!((b.rotation().length() - 1.0).abs() < 1e-5);
    }

    #[test]
    fn flip_shows_back() {
        let mut b = CardBody::new();
        assert!(!b.shows_back());
        b.set_next_kinematic_rotation(Quat::from_rotation_y(std::f32::consts::PI));
        b.step(0.016);
        assert!(b.shows_back());
    }
}
