// SpecHack
// copyright zipxing@hotmail.com 2022～2025

//! Decorative effects around the card. None of them take input or affect
//! the card state, they are pure functions of the scene clock (plus a rng
//! for particle respawns).

use crate::color::Rgba;
use crate::util::Rand;
use glam::Vec3;
use keyframe::{ease, functions::Linear};

pub const PARTICLE_COUNT: usize = 200;
pub const PARTICLE_SPREAD: f32 = 8.0;
/// upward drift, units per second
pub const PARTICLE_DRIFT: f32 = 0.3;
pub const PARTICLE_SIZE: f32 = 0.03;
pub const PARTICLE_OPACITY: f32 = 0.6;

/// Background dust drifting upwards behind the card.
pub struct ParticleStream {
    pub positions: Vec<Vec3>,
    pub color: Rgba,
    rnd: Rand,
}

impl ParticleStream {
    pub fn new(color: Rgba, mut rnd: Rand) -> Self {
        let positions = (0..PARTICLE_COUNT)
            .map(|_| {
                let x = Self::spread_coord(&mut rnd);
                let y = Self::spread_coord(&mut rnd);
                Vec3::new(x, y, Self::depth(&mut rnd))
            })
            .collect();
        Self {
            positions,
            color,
            rnd,
        }
    }

    fn spread_coord(rnd: &mut Rand) -> f32 {
        (rnd.unit() as f32 - 0.5) * PARTICLE_SPREAD
    }

    /// z in (-6, -2], always behind the card
    fn depth(rnd: &mut Rand) -> f32 {
        -2.0 - rnd.unit() as f32 * 4.0
    }

    pub fn update(&mut self, dt: f64) {
        let dy = dt.max(0.0) as f32 * PARTICLE_DRIFT;
        for p in self.positions.iter_mut() {
            p.y += dy;
            if p.y > PARTICLE_SPREAD / 2.0 {
                p.y = -PARTICLE_SPREAD / 2.0;
                p.x = Self::spread_coord(&mut self.rnd);
                p.z = Self::depth(&mut self.rnd);
            }
        }
    }
}

/// Thin torus slowly spinning around the card.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HoloRing {
    pub color: Rgba,
    pub emissive: Rgba,
    pub radius: f32,
    pub tube: f32,
}

impl HoloRing {
    pub fn new(color: Rgba, emissive: Rgba) -> Self {
        Self {
            color,
            emissive,
            radius: 3.0,
            tube: 0.02,
        }
    }

    /// (pitch, yaw) in radians at scene time t
    pub fn rotation(&self, t: f64) -> (f64, f64) {
        ((t * 0.2).sin() * 0.1, t * 0.3)
    }
}

pub const PING_PERIOD: f64 = 1.5;
pub const PING_DELAYS: [f64; 3] = [0.0, 0.5, 1.0];

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PingFrame {
    pub visible: bool,
    pub scale: f64,
    pub opacity: f64,
}

/// Three expanding rings shown while the signal is being locked.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RadarPing {
    pub color: Rgba,
}

impl RadarPing {
    pub fn new(color: Rgba) -> Self {
        Self { color }
    }

    /// ring state at scene time t. A ring is hidden before its delay.
    pub fn ring(t: f64, delay: f64) -> PingFrame {
        // truncated remainder, negative before the delay
        let p = ((t - delay) % PING_PERIOD) / PING_PERIOD;
        if p < 0.0 {
            return PingFrame {
                visible: false,
                scale: 1.0,
                opacity: 0.0,
            };
        }
        PingFrame {
            visible: true,
            scale: ease(Linear, 1.0, 4.0, p),
            opacity: ease(Linear, 1.0, 0.0, p),
        }
    }

    pub fn frames(&self, t: f64) -> [PingFrame; 3] {
        PING_DELAYS.map(|d| Self::ring(t, d))
    }
}
