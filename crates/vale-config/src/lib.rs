//! Configuration system for Vale.
//!
//! Holds every generation tunable (world dimensions, landmark shapes, erosion
//! thresholds, scatter) plus viewer and debug settings. Settings persist to
//! disk as RON, accept CLI overrides via clap, and tolerate missing or extra
//! fields so older files keep loading.

mod cli;
mod config;
mod error;

pub use cli::CliArgs;
pub use config::{
    Config, DebugConfig, ErosionSettings, LandmarkSettings, ScatterSettings, TerrainSettings,
    TileMode, ViewerSettings, WorldSettings,
};
pub use error::ConfigError;
