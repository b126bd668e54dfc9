// SpecHack
// copyright zipxing@hotmail.com 2022～2025

use rand::Rng;
use rand_xoshiro::{
    rand_core::{RngCore, SeedableRng},
    Xoshiro256StarStar,
};
#[cfg(not(target_arch = "wasm32"))]
use std::time::{SystemTime, UNIX_EPOCH};

/// RNG for everything that is intentionally not reproducible:
/// builder classes at registration, glitch numbers, particle respawns.
pub struct Rand {
    rng: Xoshiro256StarStar,
}

impl Default for Rand {
    fn default() -> Self {
        Rand::new()
    }
}

/// Xoshiro256** wrapper
impl Rand {
    pub fn new() -> Self {
        Self {
            rng: Xoshiro256StarStar::seed_from_u64(0),
        }
    }

    /// A generator seeded from the clock.
    pub fn from_now() -> Self {
        let mut r = Self::new();
        r.srand_now();
        r
    }

    pub fn srand(&mut self, seed: u64) {
        self.rng = Xoshiro256StarStar::seed_from_u64(seed);
    }

    #[cfg(target_arch = "wasm32")]
    pub fn srand_now(&mut self) {
        let mut buf = [0u8; 8];
        let seed = match getrandom::fill(&mut buf) {
            Ok(()) => u64::from_le_bytes(buf),
            Err(_) => 0x5eed,
        };
        self.srand(seed);
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub fn srand_now(&mut self) {
        // a clock before the epoch only costs randomness, not correctness
        let seed = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or(0x5eed);
        self.srand(seed);
    }

    pub fn rand64(&mut self) -> u64 {
        self.rng.next_u64()
    }

    pub fn rand(&mut self) -> u32 {
        self.rng.next_u64() as u32
    }

    /// uniform float in [0, 1)
    pub fn unit(&mut self) -> f64 {
        (self.rng.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    /// uniform float in [min, max)
    pub fn gen_range(&mut self, min: f64, max: f64) -> f64 {
        if min >= max {
            return min.min(max);
        }
        self.rng.random_range(min..max)
    }

    /// uniform index in [0, len), 0 for an empty range
    pub fn index(&mut self, len: usize) -> usize {
        if len == 0 {
            return 0;
        }
        self.rng.random_range(0..len)
    }

    pub fn pick<'a, T>(&mut self, items: &'a [T]) -> Option<&'a T> {
        if items.is_empty() {
            return None;
        }
        let i = self.index(items.len());
        items.get(i)
    }
}

/// Park-Miller minimal standard generator (multiplier 16807, modulus 2^31-1).
/// Used where a pattern must be identical for everybody rendering the same
/// name, e.g. the circuit overlay and the qr placeholder.
pub struct RandLCG {
    random_next: u64,
}

pub const LCG_MODULUS: u64 = 2_147_483_647;

impl RandLCG {
    pub fn new(seed: u32) -> Self {
        Self {
            random_next: seed as u64,
        }
    }

    pub fn srand(&mut self, seed: u32) {
        self.random_next = seed as u64;
    }

    /// next raw state in [0, 2^31-1)
    pub fn rand(&mut self) -> u64 {
        self.random_next = (self.random_next * 16807) % LCG_MODULUS;
        self.random_next
    }

    /// next state scaled into [0, 1)
    pub fn unit(&mut self) -> f64 {
        self.rand() as f64 / LCG_MODULUS as f64
    }
}
