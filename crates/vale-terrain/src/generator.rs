//! World generation: the per-point surface pipeline and the whole-world pass.
//!
//! A [`WorldGenerator`] owns everything derived from one seed (noise fields,
//! river carver, landmarks). It answers point queries for streamed tiles and
//! builds the origin-centred [`GeneratedWorld`] used for spawn and ruin
//! placement.

use glam::DVec3;
use vale_config::{Config, ErosionSettings, LandmarkSettings, TerrainSettings, TileMode};

use crate::erosion::RiverCarver;
use crate::fractal::FractalSampler;
use crate::heightfield::HeightField;
use crate::landmark::{Landmark, LandmarkSet, SurfacePoint};
use crate::seed::{SPAWN_SEED_MIX, SeededStream};
use crate::world_config::WorldConfig;

/// Height added to the ground for a standing eye position at spawn.
pub const SPAWN_EYE_OFFSET: f64 = 1.6;
/// Candidates tried before spawn falls back to the origin.
pub const SPAWN_ATTEMPTS: u32 = 200;
/// Spawn candidates are drawn within `±SPAWN_SPREAD / 2 * size` of the origin.
pub const SPAWN_SPREAD: f64 = 0.6;

/// Generation tunables that are not part of the validated [`WorldConfig`].
#[derive(Clone, Debug, Default, PartialEq)]
pub struct GenerationProfile {
    pub terrain: TerrainSettings,
    pub landmarks: LandmarkSettings,
    pub erosion: ErosionSettings,
}

impl From<&Config> for GenerationProfile {
    fn from(config: &Config) -> Self {
        Self {
            terrain: config.terrain.clone(),
            landmarks: config.landmarks.clone(),
            erosion: config.erosion.clone(),
        }
    }
}

/// Seed-derived generation state.
#[derive(Clone, Debug)]
pub struct WorldGenerator {
    config: WorldConfig,
    profile: GenerationProfile,
    sampler: FractalSampler,
    carver: RiverCarver,
    landmarks: LandmarkSet,
}

impl WorldGenerator {
    pub fn new(config: WorldConfig, profile: GenerationProfile) -> Self {
        let sampler =
            FractalSampler::new(&config).with_base_frequency(profile.terrain.base_frequency);
        let carver = RiverCarver::new(profile.erosion.clone(), config.cell_size());
        let landmarks = LandmarkSet::generate(config.seed(), config.size(), &profile.landmarks);
        Self {
            config,
            profile,
            sampler,
            carver,
            landmarks,
        }
    }

    /// A generator for `seed` with the same parameters and tunables.
    pub fn reseeded(&self, seed: u32) -> Self {
        Self::new(self.config.with_seed(seed), self.profile.clone())
    }

    pub fn config(&self) -> &WorldConfig {
        &self.config
    }

    pub fn profile(&self) -> &GenerationProfile {
        &self.profile
    }

    pub fn sampler(&self) -> &FractalSampler {
        &self.sampler
    }

    pub fn landmarks(&self) -> &LandmarkSet {
        &self.landmarks
    }

    /// Full surface at `(x, z)`: composite, river carving, landmarks and the
    /// final water clearance.
    pub fn surface_at(&self, x: f64, z: f64) -> SurfacePoint {
        let sample = self.sampler.sample(x, z);
        let carved = self.carver.carve(&self.sampler, x, z, &sample);
        let mut point = self.landmarks.apply_at(
            x,
            z,
            SurfacePoint {
                base: sample.height,
                height: carved.height,
                water_level: carved.water_level,
            },
        );
        let clearance = self.profile.erosion.final_clearance;
        point.water_level = point.water_level.min(point.height - clearance);
        point
    }

    /// Ground height at `(x, z)` for the given fill mode.
    pub fn height_at(&self, x: f64, z: f64, mode: TileMode) -> f64 {
        match mode {
            TileMode::Plain => self.sampler.height(x, z),
            TileMode::Detailed => self.surface_at(x, z).height,
        }
    }

    /// Height grid for the tile at chunk coordinates `(ix, iz)`.
    ///
    /// The tile is centred on `(ix * size, iz * size)` and has
    /// `subdivisions + 1` vertices per edge.
    pub fn tile_field(&self, ix: i32, iz: i32, mode: TileMode) -> HeightField {
        let size = self.config.size();
        let half = size * 0.5;
        HeightField::from_fn(
            f64::from(ix) * size - half,
            f64::from(iz) * size - half,
            self.config.cell_size(),
            self.config.grid_width(),
            |x, z| self.height_at(x, z, mode),
        )
    }

    /// Run the whole-world pass over one `size x size` grid centred on the origin.
    pub fn build(&self) -> GeneratedWorld {
        let size = self.config.size();
        let step = self.config.cell_size();
        let width = self.config.grid_width();
        let origin = -size * 0.5;

        let mut heights = HeightField::zeroed(origin, origin, step, width);
        let mut base = HeightField::zeroed(origin, origin, step, width);
        let mut water = HeightField::zeroed(origin, origin, step, width);

        for row in 0..width {
            for col in 0..width {
                let (x, z) = heights.position(col, row);
                let point = self.surface_at(x, z);
                heights.set(col, row, point.height as f32);
                base.set(col, row, point.base as f32);
                water.set(col, row, point.water_level as f32);
            }
        }

        let ruins = self
            .landmarks
            .ruins()
            .filter_map(|landmark| match *landmark {
                Landmark::Ruin { center, yaw } => heights.sample(center.x, center.y).map(|y| {
                    RuinPlacement {
                        position: DVec3::new(center.x, y, center.y),
                        yaw,
                    }
                }),
                _ => None,
            })
            .collect::<Vec<_>>();

        tracing::info!(
            seed = self.config.seed(),
            vertices = width * width,
            ruins = ruins.len(),
            "generated world"
        );

        GeneratedWorld {
            seed: self.config.seed(),
            heights,
            base,
            water,
            ruins,
        }
    }
}

/// Where a ruin cluster stands.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RuinPlacement {
    /// Ruin centre with `y` on the ground.
    pub position: DVec3,
    pub yaw: f64,
}

/// Output of the whole-world pass.
#[derive(Clone, Debug)]
pub struct GeneratedWorld {
    seed: u32,
    heights: HeightField,
    base: HeightField,
    water: HeightField,
    ruins: Vec<RuinPlacement>,
}

impl GeneratedWorld {
    pub fn seed(&self) -> u32 {
        self.seed
    }

    /// Final ground heights.
    pub fn heights(&self) -> &HeightField {
        &self.heights
    }

    /// Composite heights before carving and landmarks.
    pub fn base_heights(&self) -> &HeightField {
        &self.base
    }

    pub fn water(&self) -> &HeightField {
        &self.water
    }

    pub fn ruins(&self) -> &[RuinPlacement] {
        &self.ruins
    }

    /// Ground height at `(x, z)`, `None` outside the generated area.
    pub fn ground_height_at(&self, x: f64, z: f64) -> Option<f64> {
        self.heights.sample(x, z)
    }

    /// Pick a standing eye position for the viewer.
    ///
    /// Draws up to [`SPAWN_ATTEMPTS`] candidates from a seed-derived stream and
    /// takes the first one with ground under it. Falls back to the origin
    /// column, at eye offset above zero if even that has no ground.
    pub fn pick_spawn(&self) -> DVec3 {
        let size = self.heights.step() * (self.heights.width() - 1) as f64;
        let span = size * SPAWN_SPREAD;
        let mut rng = SeededStream::new(self.seed ^ SPAWN_SEED_MIX);
        for _ in 0..SPAWN_ATTEMPTS {
            let x = rng.next_centered(span);
            let z = rng.next_centered(span);
            if let Some(y) = self.ground_height_at(x, z) {
                return DVec3::new(x, y + SPAWN_EYE_OFFSET, z);
            }
        }

        tracing::warn!(seed = self.seed, "no spawn candidate had ground, using origin");
        let y = self.ground_height_at(0.0, 0.0).unwrap_or(0.0);
        DVec3::new(0.0, y + SPAWN_EYE_OFFSET, 0.0)
    }
}
