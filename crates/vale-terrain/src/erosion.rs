//! Single-pass river carving.
//!
//! Each point walks a few steps downhill along the local gradient and sums
//! the height it loses on the way. Steep, long descents become rivers: the
//! ground is carved in proportion and the water table rises toward it.
//! This is a static approximation, not a time-stepped erosion simulation.

use vale_config::ErosionSettings;

use crate::fractal::{FractalSampler, HeightSample};
use crate::seed::det_hypot;

const MIN_GRADIENT: f64 = 1e-4;

/// Result of carving one point.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CarvedSample {
    /// Ground height after carving.
    pub height: f64,
    /// Water level after the river/shore/dry policy.
    pub water_level: f64,
    /// River strength in `[0, 1]`.
    pub river_strength: f64,
}

/// Carves river channels into composite samples.
#[derive(Clone, Debug)]
pub struct RiverCarver {
    settings: ErosionSettings,
    step: f64,
}

impl RiverCarver {
    /// `cell_size` is the grid spacing; the gradient step is a fraction of it.
    pub fn new(settings: ErosionSettings, cell_size: f64) -> Self {
        let step = cell_size * settings.gradient_step_factor;
        Self { settings, step }
    }

    pub fn settings(&self) -> &ErosionSettings {
        &self.settings
    }

    /// Distance used for the central-difference gradient and each walk step.
    pub fn step(&self) -> f64 {
        self.step
    }

    /// Accumulated downhill drop from `(x, z)`, scaled and clamped to `[0, 1]`.
    ///
    /// Flat points (gradient magnitude at or below `1e-4`) never become rivers.
    pub fn river_strength(&self, sampler: &FractalSampler, x: f64, z: f64) -> f64 {
        let step = self.step;
        let grad_x = sampler.height(x + step, z) - sampler.height(x - step, z);
        let grad_z = sampler.height(x, z + step) - sampler.height(x, z - step);
        let len = det_hypot(grad_x, grad_z);
        if len <= MIN_GRADIENT {
            return 0.0;
        }

        let (dir_x, dir_z) = (-grad_x / len, -grad_z / len);
        let (mut px, mut pz) = (x, z);
        let mut here = sampler.height(px, pz);
        let mut accumulation = 0.0;
        for _ in 0..self.settings.walk_steps {
            px += dir_x * step;
            pz += dir_z * step;
            let ahead = sampler.height(px, pz);
            accumulation += (here - ahead).max(0.0);
            here = ahead;
        }

        (accumulation * self.settings.flow_scale).clamp(0.0, 1.0)
    }

    /// Carve `sample` (taken at `(x, z)`) and settle its water level.
    pub fn carve(&self, sampler: &FractalSampler, x: f64, z: f64, sample: &HeightSample) -> CarvedSample {
        let river_strength = self.river_strength(sampler, x, z);
        let s = &self.settings;
        let height =
            sample.height - (s.carve_base + sample.erosion_weight * s.carve_erosion) * river_strength;

        let water = sample.water_level;
        let water_level = if river_strength > s.river_threshold {
            (height - s.river_clearance).min(water + river_strength * s.river_rise)
        } else if water > height - s.shore_band {
            height - s.shore_band
        } else if water < height - s.dry_band {
            height - s.dry_depth
        } else {
            water
        };

        CarvedSample {
            height,
            water_level,
            river_strength,
        }
    }
}
