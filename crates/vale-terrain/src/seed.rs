//! Deterministic seeded generation utilities.
//!
//! Provides the 32-bit [`SeededStream`] used for every placement decision,
//! a non-deterministic seed source for fresh worlds, and deterministic math
//! wrappers via `libm` so generated terrain does not depend on the platform's
//! libc.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::time::{SystemTime, UNIX_EPOCH};

use rand::rand_core::impls;
use rand::rngs::OsRng;
use rand::{RngCore, TryRngCore};

// ---------------------------------------------------------------------------
// Seed derivation
// ---------------------------------------------------------------------------

/// Mixes the world seed into the landmark stream seed.
pub const LANDMARK_SEED_MIX: u32 = 0x1234_ABCD;
/// Mixes the world seed into the spawn search stream seed.
pub const SPAWN_SEED_MIX: u32 = 0xDEAD_C0DE;
/// Mixes the world seed into the scatter stream seed.
pub const SCATTER_SEED_MIX: u32 = 0x85EB_CA6B;

const STREAM_INCREMENT: u32 = 0x6D2B_79F5;
const TWO_POW_32: f64 = 4_294_967_296.0;

/// Small, fast, deterministic PRNG over a single 32-bit state word.
///
/// Every operation wraps at 32 bits, so the same seed reproduces the same
/// sequence on every platform. The stream also implements [`RngCore`] and can
/// be handed to anything in the `rand` ecosystem.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SeededStream {
    state: u32,
}

impl SeededStream {
    /// Create a stream from a 32-bit seed.
    pub fn new(seed: u32) -> Self {
        Self { state: seed }
    }

    /// Next raw 32-bit output.
    pub fn next_raw(&mut self) -> u32 {
        self.state = self.state.wrapping_add(STREAM_INCREMENT);
        let a = self.state;
        let mut t = (a ^ (a >> 15)).wrapping_mul(a | 1);
        t = t.wrapping_add((t ^ (t >> 7)).wrapping_mul(t | 61)) ^ t;
        t ^ (t >> 14)
    }

    /// Next value in `[0, 1)`.
    pub fn next_f64(&mut self) -> f64 {
        f64::from(self.next_raw()) / TWO_POW_32
    }

    /// Next value in `[min, max)`.
    pub fn next_range(&mut self, min: f64, max: f64) -> f64 {
        min + self.next_f64() * (max - min)
    }

    /// Next value centred on zero: `(r - 0.5) * span`.
    pub fn next_centered(&mut self, span: f64) -> f64 {
        (self.next_f64() - 0.5) * span
    }

    /// Next angle in `[0, 2π)`.
    pub fn next_angle(&mut self) -> f64 {
        self.next_f64() * std::f64::consts::TAU
    }
}

impl RngCore for SeededStream {
    fn next_u32(&mut self) -> u32 {
        self.next_raw()
    }

    fn next_u64(&mut self) -> u64 {
        impls::next_u64_via_u32(self)
    }

    fn fill_bytes(&mut self, dst: &mut [u8]) {
        impls::fill_bytes_via_next(self, dst)
    }
}

/// Draw a fresh world seed.
///
/// Uses the operating system's cryptographic source; if that is unavailable,
/// falls back to hashing the wall clock. The result is not reproducible;
/// only used when no seed was configured.
pub fn new_seed() -> u32 {
    match OsRng.try_next_u32() {
        Ok(seed) => seed,
        Err(err) => {
            tracing::warn!("OS random source unavailable ({err}), using clock-derived seed");
            clock_seed()
        }
    }
}

fn clock_seed() -> u32 {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos())
        .unwrap_or_default();
    let mut hasher = DefaultHasher::new();
    nanos.hash(&mut hasher);
    std::process::id().hash(&mut hasher);
    let h = hasher.finish();
    (h ^ (h >> 32)) as u32
}

// ---------------------------------------------------------------------------
// Deterministic math (libm)
// ---------------------------------------------------------------------------

/// Deterministic sine using libm (not platform libc).
#[inline]
pub fn det_sin(x: f64) -> f64 {
    libm::sin(x)
}

/// Deterministic cosine using libm.
#[inline]
pub fn det_cos(x: f64) -> f64 {
    libm::cos(x)
}

/// Deterministic power using libm.
#[inline]
pub fn det_pow(base: f64, exp: f64) -> f64 {
    libm::pow(base, exp)
}

/// Deterministic `sqrt(x² + y²)` using libm.
#[inline]
pub fn det_hypot(x: f64, y: f64) -> f64 {
    libm::hypot(x, y)
}

/// Linear interpolation from `a` toward `b` by `t`.
#[inline]
pub fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a + (b - a) * t
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stream_deterministic() {
        let mut a = SeededStream::new(12345);
        let mut b = SeededStream::new(12345);
        for _ in 0..1000 {
            assert_eq!(a.next_raw(), b.next_raw(), "Streams must match for same seed");
        }
    }

    #[test]
    fn test_stream_known_first_outputs() {
        // Reference values for seed 0 and seed 1.
        let mut s0 = SeededStream::new(0);
        assert_eq!(s0.next_raw(), 1_144_304_738);
        let mut s1 = SeededStream::new(1);
        assert_eq!(s1.next_raw(), 2_693_262_067);
    }

    #[test]
    fn test_stream_values_in_unit_interval() {
        let mut s = SeededStream::new(0xFFFF_FFFF);
        for _ in 0..10_000 {
            let v = s.next_f64();
            assert!((0.0..1.0).contains(&v), "value {v} outside [0, 1)");
        }
    }

    #[test]
    fn test_different_seeds_diverge() {
        let mut a = SeededStream::new(1);
        let mut b = SeededStream::new(2);
        let same = (0..32).filter(|_| a.next_raw() == b.next_raw()).count();
        assert!(same < 4, "Different seeds should produce different sequences");
    }

    #[test]
    fn test_rng_core_matches_raw_stream() {
        let mut a = SeededStream::new(77);
        let mut b = SeededStream::new(77);
        assert_eq!(a.next_u32(), b.next_raw());
        let lo = u64::from(b.next_raw());
        let hi = u64::from(b.next_raw());
        assert_eq!(a.next_u64(), (hi << 32) | lo);
    }

    #[test]
    fn test_next_range_bounds() {
        let mut s = SeededStream::new(9);
        for _ in 0..1000 {
            let r = s.next_range(18.0, 40.0);
            assert!((18.0..40.0).contains(&r));
            let c = s.next_centered(10.0);
            assert!((-5.0..5.0).contains(&c));
        }
    }

    #[test]
    fn test_new_seed_varies() {
        let seeds: Vec<u32> = (0..8).map(|_| new_seed()).collect();
        assert!(
            seeds.windows(2).any(|w| w[0] != w[1]),
            "fresh seeds should not all be identical"
        );
    }

    #[test]
    fn test_deterministic_math_functions() {
        let x = 1.234_567_890_123_4;
        assert_eq!(det_sin(x), det_sin(x));
        assert_eq!(det_cos(x), det_cos(x));
        assert_eq!(det_pow(x, 1.8), det_pow(x, 1.8));
        assert_eq!(det_hypot(3.0, 4.0), 5.0);
        assert_eq!(lerp(2.0, 4.0, 0.5), 3.0);
    }
}
