//! Seeded gradient noise over a periodic 256-cell lattice.
//!
//! The permutation table is shuffled once with a linear-congruential
//! generator and never mutated afterwards, so a [`NoiseField`] is a pure
//! function of its input and can be shared freely.

use noise::NoiseFn;

const LCG_MUL: u32 = 1_664_525;
const LCG_ADD: u32 = 1_013_904_223;

/// One seeded gradient-noise source.
///
/// Output lies roughly in `[-1, 1]` and is not normalised; callers remap it
/// explicitly (e.g. `n * 0.5 + 0.5`).
#[derive(Clone)]
pub struct NoiseField {
    seed: u32,
    perm: [u8; 512],
}

impl NoiseField {
    /// Build the lattice permutation for `seed`.
    pub fn new(seed: u32) -> Self {
        let mut base = [0u8; 256];
        for (i, slot) in base.iter_mut().enumerate() {
            *slot = i as u8;
        }

        // Fisher-Yates, walking down from the top index.
        let mut s = seed;
        for i in (1..256usize).rev() {
            s = s.wrapping_mul(LCG_MUL).wrapping_add(LCG_ADD);
            let j = (s % (i as u32 + 1)) as usize;
            base.swap(i, j);
        }

        let mut perm = [0u8; 512];
        for (i, slot) in perm.iter_mut().enumerate() {
            *slot = base[i & 255];
        }
        Self { seed, perm }
    }

    /// Seed this field was built from.
    pub fn seed(&self) -> u32 {
        self.seed
    }

    /// Sample the field at a 3-D point.
    pub fn sample(&self, x: f64, y: f64, z: f64) -> f64 {
        let (xi, xf) = lattice(x);
        let (yi, yf) = lattice(y);
        let (zi, zf) = lattice(z);
        let u = fade(xf);
        let v = fade(yf);
        let w = fade(zf);

        let p = &self.perm;
        let a = p[xi] as usize + yi;
        let aa = p[a] as usize + zi;
        let ab = p[a + 1] as usize + zi;
        let b = p[xi + 1] as usize + yi;
        let ba = p[b] as usize + zi;
        let bb = p[b + 1] as usize + zi;

        lerp(
            w,
            lerp(
                v,
                lerp(u, grad(p[aa], xf, yf, zf), grad(p[ba], xf - 1.0, yf, zf)),
                lerp(
                    u,
                    grad(p[ab], xf, yf - 1.0, zf),
                    grad(p[bb], xf - 1.0, yf - 1.0, zf),
                ),
            ),
            lerp(
                v,
                lerp(
                    u,
                    grad(p[aa + 1], xf, yf, zf - 1.0),
                    grad(p[ba + 1], xf - 1.0, yf, zf - 1.0),
                ),
                lerp(
                    u,
                    grad(p[ab + 1], xf, yf - 1.0, zf - 1.0),
                    grad(p[bb + 1], xf - 1.0, yf - 1.0, zf - 1.0),
                ),
            ),
        )
    }
}

impl std::fmt::Debug for NoiseField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NoiseField").field("seed", &self.seed).finish()
    }
}

impl NoiseFn<f64, 3> for NoiseField {
    fn get(&self, point: [f64; 3]) -> f64 {
        self.sample(point[0], point[1], point[2])
    }
}

/// 2-D sampling on the `y = 0` plane, matching how terrain layers read it.
impl NoiseFn<f64, 2> for NoiseField {
    fn get(&self, point: [f64; 2]) -> f64 {
        self.sample(point[0], 0.0, point[1])
    }
}

/// Lattice cell index (wrapped to 0..=255) and fractional offset.
#[inline]
fn lattice(c: f64) -> (usize, f64) {
    let floor = c.floor();
    ((floor as i64 & 255) as usize, c - floor)
}

/// Quintic smoothstep `t³(t(6t − 15) + 10)`.
#[inline]
fn fade(t: f64) -> f64 {
    t * t * t * (t * (t * 6.0 - 15.0) + 10.0)
}

#[inline]
fn lerp(t: f64, a: f64, b: f64) -> f64 {
    a + t * (b - a)
}

/// Dot product with one of 12 gradient directions picked by the hash's low nibble.
#[inline]
fn grad(hash: u8, x: f64, y: f64, z: f64) -> f64 {
    let h = hash & 15;
    let u = if h < 8 { x } else { y };
    let v = if h < 4 {
        y
    } else if h == 12 || h == 14 {
        x
    } else {
        z
    };
    let u = if h & 1 == 0 { u } else { -u };
    let v = if h & 2 == 0 { v } else { -v };
    u + v
}
