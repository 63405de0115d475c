//! Procedural terrain synthesis: seeded noise, fractal height blending,
//! river carving, landmarks, and the whole-world generation pass.

mod erosion;
mod error;
mod fractal;
mod generator;
mod heightfield;
mod landmark;
mod perlin;
mod scatter;
mod world_config;

pub mod seed;

pub use erosion::{CarvedSample, RiverCarver};
pub use error::ConfigurationError;
pub use fractal::{DEFAULT_BASE_FREQUENCY, FbmParams, FractalSampler, HeightSample, fbm};
pub use generator::{
    GeneratedWorld, GenerationProfile, RuinPlacement, SPAWN_ATTEMPTS, SPAWN_EYE_OFFSET,
    WorldGenerator,
};
pub use heightfield::HeightField;
pub use landmark::{Landmark, LandmarkSet, SurfacePoint};
pub use perlin::NoiseField;
pub use scatter::{ScatterPoint, scatter_points};
pub use seed::{SeededStream, new_seed};
pub use world_config::WorldConfig;
