// SpecHack
// copyright zipxing@hotmail.com 2022～2025

//! Pointer drag and flick on the card.
//!
//! While a pointer is held the body is kinematic and follows the pointer:
//! horizontal movement yaws, vertical movement pitches. On release the body
//! turns dynamic again and receives one torque impulse: a fast horizontal
//! flick flips the card, slower swipes give a gentle spin proportional to
//! the last pointer velocity.

use crate::physics::{BodyType, RigidBody};
use glam::{EulerRot, Quat, Vec3};
use log::debug;
use std::f64::consts::FRAC_PI_2;

/// radians per pixel of pointer movement
pub const DRAG_SENSITIVITY: f64 = 0.005;
/// px per second, compared against velocity in px/ms after dividing by 1000
pub const FLICK_THRESHOLD: f64 = 3.0;
pub const FLIP_IMPULSE: f32 = 12.0;
/// px/ms below which a release counts as no movement
pub const NOISE_FLOOR: f64 = 0.0005;
/// shortest time step between two pointer samples, ms
const MIN_SAMPLE_MS: f64 = 1.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DragRelease {
    /// half turn spin around y, direction is the sign of vx
    Flip { direction: f32 },
    Gentle { torque: Vec3 },
    /// released without noticeable movement
    Rest,
    /// not dragging or a different pointer
    Ignored,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CardDrag {
    pointer: Option<u32>,
    last: (f64, f64),
    last_ms: f64,
    /// px per ms
    velocity: (f64, f64),
    yaw: f64,
    pitch: f64,
    snapshot: Quat,
}

impl Default for CardDrag {
    fn default() -> Self {
        Self::new()
    }
}

impl CardDrag {
    pub fn new() -> Self {
        Self {
            pointer: None,
            last: (0.0, 0.0),
            last_ms: 0.0,
            velocity: (0.0, 0.0),
            yaw: 0.0,
            pitch: 0.0,
            snapshot: Quat::IDENTITY,
        }
    }

    pub fn is_dragging(&self) -> bool {
        self.pointer.is_some()
    }

    pub fn velocity(&self) -> (f64, f64) {
        self.velocity
    }

    /// accumulated (yaw, pitch) of the current drag
    pub fn angles(&self) -> (f64, f64) {
        (self.yaw, self.pitch)
    }

    pub fn pointer_down<B: RigidBody>(&mut self, body: &mut B, id: u32, x: f64, y: f64, t_ms: f64) {
        if self.pointer.is_some() {
            return;
        }
        self.pointer = Some(id);
        self.last = (x, y);
        self.last_ms = t_ms;
        self.velocity = (0.0, 0.0);
        self.yaw = 0.0;
        self.pitch = 0.0;
        self.snapshot = body.rotation();
        body.set_body_type(BodyType::KinematicPosition);
        body.reset_velocity();
    }

    /// Returns false when the move was not part of a drag.
    pub fn pointer_move(&mut self, id: u32, x: f64, y: f64, t_ms: f64) -> bool {
        if self.pointer != Some(id) {
            return false;
        }
        let dt = (t_ms - self.last_ms).max(MIN_SAMPLE_MS);
        let (dx, dy) = (x - self.last.0, y - self.last.1);
        self.velocity = (dx / dt, dy / dt);
        self.last = (x, y);
        self.last_ms = t_ms;
        self.yaw += dx * DRAG_SENSITIVITY;
        self.pitch = (self.pitch + dy * DRAG_SENSITIVITY).clamp(-FRAC_PI_2, FRAC_PI_2);
        true
    }

    /// rotation the body should have for the current drag
    pub fn target_rotation(&self) -> Quat {
        let drag = Quat::from_euler(EulerRot::YXZ, self.yaw as f32, self.pitch as f32, 0.0);
        (self.snapshot * drag).normalize()
    }

    /// Per frame: steer the kinematic body while dragging.
    pub fn frame<B: RigidBody>(&self, body: &mut B) {
        if self.is_dragging() {
            body.set_next_kinematic_rotation(self.target_rotation());
        }
    }

    pub fn pointer_up<B: RigidBody>(&mut self, body: &mut B, id: u32) -> DragRelease {
        if self.pointer != Some(id) {
            return DragRelease::Ignored;
        }
        self.pointer = None;
        body.set_body_type(BodyType::Dynamic);

        let (vx, vy) = self.velocity;
        let release = if vx.abs() > FLICK_THRESHOLD / 1000.0 {
            DragRelease::Flip {
                direction: vx.signum() as f32,
            }
        } else if vx.abs() > NOISE_FLOOR || vy.abs() > NOISE_FLOOR {
            DragRelease::Gentle {
                torque: Vec3::new((-vy * 2.0) as f32, (vx * 2.0) as f32, 0.0),
            }
        } else {
            DragRelease::Rest
        };
        match release {
            DragRelease::Flip { direction } => {
                body.apply_torque_impulse(Vec3::new(0.0, direction * FLIP_IMPULSE, 0.0))
            }
            DragRelease::Gentle { torque } => body.apply_torque_impulse(torque),
            _ => {}
        }
        debug!("drag release {:?} v=({:.4},{:.4})", release, vx, vy);
        release
    }

    /// Drop a drag without any impulse, e.g. when the view unmounts.
    pub fn cancel<B: RigidBody>(&mut self, body: &mut B) {
        if self.pointer.take().is_some() {
            body.set_body_type(BodyType::Dynamic);
        }
    }
}
