// SpecHack
// copyright zipxing@hotmail.com 2022～2025

//! Device tilt. Orientation angles are scaled into a small tilt range and
//! applied as a light torque every frame the card is not being dragged.

use glam::Vec3;
use log::info;
use std::f64::consts::PI;

/// 15 degrees
pub const GYRO_MAX_TILT: f64 = PI / 12.0;
/// torque per radian of tilt
pub const GYRO_TORQUE: f64 = 0.01;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PermissionState {
    Granted,
    Denied,
    /// the platform does not ask
    NotRequired,
}

/// Asks the platform for motion sensor access.
pub trait MotionPermission {
    fn request(&mut self) -> PermissionState;
}

/// Platforms that deliver orientation without asking.
pub struct NoPermissionNeeded;

impl MotionPermission for NoPermissionNeeded {
    fn request(&mut self) -> PermissionState {
        PermissionState::NotRequired
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Gyroscope {
    supported: bool,
    enabled: bool,
    beta: f64,
    gamma: f64,
}

impl Gyroscope {
    pub fn new(supported: bool) -> Self {
        Self {
            supported,
            ..Default::default()
        }
    }

    pub fn supported(&self) -> bool {
        self.supported
    }

    pub fn enabled(&self) -> bool {
        self.enabled
    }

    /// Returns whether tilt is enabled afterwards.
    pub fn enable(&mut self, permission: &mut dyn MotionPermission) -> bool {
        if !self.supported {
            return false;
        }
        match permission.request() {
            PermissionState::Granted | PermissionState::NotRequired => {
                self.enabled = true;
                info!("gyroscope enabled");
            }
            PermissionState::Denied => info!("gyroscope permission denied"),
        }
        self.enabled
    }

    pub fn disable(&mut self) {
        self.enabled = false;
        self.beta = 0.0;
        self.gamma = 0.0;
    }

    fn scale(deg: Option<f64>) -> f64 {
        (deg.unwrap_or(0.0) / 90.0 * GYRO_MAX_TILT).clamp(-GYRO_MAX_TILT, GYRO_MAX_TILT)
    }

    /// Device orientation event, angles in degrees. Missing angles read as 0.
    pub fn on_orientation(&mut self, beta: Option<f64>, gamma: Option<f64>) {
        if !self.enabled {
            return;
        }
        self.beta = Self::scale(beta);
        self.gamma = Self::scale(gamma);
    }

    /// scaled (beta, gamma) in radians
    pub fn orientation(&self) -> (f64, f64) {
        (self.beta, self.gamma)
    }

    /// this frame's torque impulse, None when disabled
    pub fn torque(&self) -> Option<Vec3> {
        if !self.enabled {
            return None;
        }
        Some(Vec3::new(
            (self.beta * GYRO_TORQUE) as f32,
            (self.gamma * GYRO_TORQUE) as f32,
            0.0,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Deny;
    impl MotionPermission for Deny {
        fn request(&mut self) -> PermissionState {
            PermissionState::Denied
        }
    }

    #[test]
    fn tilt_is_scaled_and_clamped() {
        let mut g = Gyroscope::new(true);
        assert!(g.enable(&mut NoPermissionNeeded));
        g.on_orientation(Some(45.0), Some(-180.0));
        let (b, gm) = g.orientation();
        assert!((b - GYRO_MAX_TILT / 2.0).abs() < 1e-12);
        assert_eq!(gm, -GYRO_MAX_TILT);
        g.on_orientation(None, Some(9.0));
        assert_eq!(g.orientation().0, 0.0);
        let t = g.torque().unwrap();
        assert!((t.y as f64 - GYRO_MAX_TILT / 10.0 * GYRO_TORQUE).abs() < 1e-6);
    }

    #[test]
    fn denied_or_unsupported_stays_off() {
        let mut g = Gyroscope::new(true);
        assert!(!g.enable(&mut Deny));
        g.on_orientation(Some(90.0), Some(90.0));
        assert_eq!(g.orientation(), (0.0, 0.0));
        assert!(g.torque().is_none());
        let mut u = Gyroscope::new(false);
        assert!(!u.enable(&mut NoPermissionNeeded));
    }
}
