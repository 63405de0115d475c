//! Multi-layer fractal height synthesis.
//!
//! Five seeded [`NoiseField`]s are summed over several octaves each and then
//! blended into a single height and water level. Every layer is normalised to
//! roughly `[0, 1]` before blending, so the composite only depends on relative
//! layer shapes and the final height scale.

use noise::NoiseFn;

use crate::perlin::NoiseField;
use crate::seed::{det_pow, lerp};
use crate::world_config::WorldConfig;

/// Lowest-octave frequency shared by every layer, in cycles per world unit.
pub const DEFAULT_BASE_FREQUENCY: f64 = 0.005;

/// Octave parameters for one fractal layer.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FbmParams {
    /// Frequency of the first octave, as a multiple of the base frequency.
    pub frequency: f64,
    /// Frequency multiplier between octaves.
    pub lacunarity: f64,
    /// Amplitude multiplier between octaves.
    pub gain: f64,
    /// Number of octaves summed.
    pub octaves: u32,
    /// Fold each octave as `1 - |n|` instead of remapping to `[0, 1]`.
    pub ridged: bool,
}

impl FbmParams {
    /// Sharp ridgelines.
    pub const RIDGE: Self = Self::new(0.65, 2.0, 0.5, 4, true);
    /// Broad rolling lowlands.
    pub const VALLEY: Self = Self::new(1.0, 2.1, 0.55, 5, false);
    /// Erosion weighting, ridged so channels stay narrow.
    pub const EROSION: Self = Self::new(1.6, 2.2, 0.6, 3, true);
    /// Ridge/valley selector. Sampled from the valley field.
    pub const MASK: Self = Self::new(0.5, 2.0, 0.7, 3, false);
    /// Small-scale surface detail.
    pub const DETAIL: Self = Self::new(3.2, 2.3, 0.45, 3, false);

    /// Build a parameter set.
    pub const fn new(frequency: f64, lacunarity: f64, gain: f64, octaves: u32, ridged: bool) -> Self {
        Self {
            frequency,
            lacunarity,
            gain,
            octaves,
            ridged,
        }
    }
}

/// Amplitude-weighted average of `octaves` noise samples on the `y = 0` plane.
///
/// Returns 0 when no octaves are requested.
pub fn fbm<N>(noise: &N, x: f64, z: f64, base_frequency: f64, params: &FbmParams) -> f64
where
    N: NoiseFn<f64, 3> + ?Sized,
{
    let mut amplitude = 1.0;
    let mut frequency = base_frequency * params.frequency;
    let mut sum = 0.0;
    let mut total = 0.0;

    for _ in 0..params.octaves {
        let n = noise.get([x * frequency, 0.0, z * frequency]);
        let n = if params.ridged { 1.0 - n.abs() } else { n * 0.5 + 0.5 };
        sum += n * amplitude;
        total += amplitude;
        amplitude *= params.gain;
        frequency *= params.lacunarity;
    }

    if total > 0.0 { sum / total } else { 0.0 }
}

/// Composite sample at one point.
///
/// `height` and `water_level` are what consumers read; the layer values are
/// kept for river carving and diagnostics.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct HeightSample {
    pub height: f64,
    pub water_level: f64,
    pub ridge: f64,
    pub valley: f64,
    /// `erosion^0.8`, in `[0, 1]`.
    pub erosion_weight: f64,
    /// In `[0, 1]`.
    pub mask: f64,
}

/// Seeded composite height function.
#[derive(Clone, Debug)]
pub struct FractalSampler {
    ridge: NoiseField,
    valley: NoiseField,
    erosion: NoiseField,
    detail: NoiseField,
    water: NoiseField,
    base_frequency: f64,
    height_scale: f64,
    flatten: f64,
}

impl FractalSampler {
    /// Derive all five noise fields from the config's seed.
    pub fn new(config: &WorldConfig) -> Self {
        let seed = config.seed();
        Self {
            ridge: NoiseField::new(seed),
            valley: NoiseField::new(seed.wrapping_mul(1_664_525).wrapping_add(1_013_904_223)),
            erosion: NoiseField::new(seed.wrapping_mul(69_069).wrapping_add(1)),
            detail: NoiseField::new(seed ^ 0x9E37_79B9),
            water: NoiseField::new(seed ^ 0x5F35_6495),
            base_frequency: DEFAULT_BASE_FREQUENCY,
            height_scale: config.height_scale(),
            flatten: config.flatten(),
        }
    }

    /// Override the base frequency. Non-positive or non-finite values are ignored.
    pub fn with_base_frequency(mut self, base_frequency: f64) -> Self {
        if base_frequency.is_finite() && base_frequency > 0.0 {
            self.base_frequency = base_frequency;
        } else {
            tracing::warn!(base_frequency, "ignoring invalid base frequency");
        }
        self
    }

    pub fn base_frequency(&self) -> f64 {
        self.base_frequency
    }

    pub fn height_scale(&self) -> f64 {
        self.height_scale
    }

    /// Full composite sample at `(x, z)`.
    pub fn sample(&self, x: f64, z: f64) -> HeightSample {
        let base = self.base_frequency;
        let ridge = fbm(&self.ridge, x, z, base, &FbmParams::RIDGE);
        let valley = fbm(&self.valley, x, z, base, &FbmParams::VALLEY);
        let erosion = fbm(&self.erosion, x, z, base, &FbmParams::EROSION);
        let mask = fbm(&self.valley, x, z, base, &FbmParams::MASK);
        let detail = fbm(&self.detail, x, z, base, &FbmParams::DETAIL);

        let erosion_weight = det_pow(erosion, 0.8);
        let mut blend = lerp(valley, ridge, det_pow(mask, 1.2));
        blend = lerp(blend, valley, (1.0 - erosion_weight) * 0.5);
        blend += detail * 0.25 * erosion_weight;
        blend = blend.clamp(0.0, 1.0);
        blend = lerp(blend, 0.5, self.flatten);
        let height = blend * self.height_scale;

        let wf = base * 0.8;
        let mut water = valley * 0.75 + (1.0 - mask) * 0.25;
        water += det_pow(1.0 - erosion_weight, 2.5) * 0.35;
        water += (self.water.sample(x * wf, 0.0, z * wf) * 0.5 + 0.5) * 0.1;
        let water = (water - 0.4).clamp(0.0, 1.0);

        HeightSample {
            height,
            water_level: water * self.height_scale * 0.85,
            ridge,
            valley,
            erosion_weight,
            mask,
        }
    }

    /// Composite height only.
    pub fn height(&self, x: f64, z: f64) -> f64 {
        self.sample(x, z).height
    }
}
