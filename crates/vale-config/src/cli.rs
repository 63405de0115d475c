//! Command-line argument parsing for the Vale viewer.

use std::path::PathBuf;

use clap::Parser;

use crate::Config;

/// Vale command-line arguments.
///
/// CLI values override settings loaded from `config.ron`.
#[derive(Parser, Debug, Default)]
#[command(name = "vale", about = "Procedural terrain generation and tile streaming")]
pub struct CliArgs {
    /// World seed (0..=4294967295).
    #[arg(long)]
    pub seed: Option<u64>,

    /// Tile edge length in world units.
    #[arg(long)]
    pub size: Option<f64>,

    /// Grid cells per tile edge.
    #[arg(long)]
    pub subdivisions: Option<u32>,

    /// Streaming radius in tiles.
    #[arg(long)]
    pub radius: Option<u32>,

    /// Number of simulated viewer frames.
    #[arg(long)]
    pub frames: Option<u32>,

    /// Switch to a fresh seed at this frame.
    #[arg(long)]
    pub reseed_at: Option<u32>,

    /// Log level (error, warn, info, debug, trace).
    #[arg(long)]
    pub log_level: Option<String>,

    /// Path to config directory (overrides default location).
    #[arg(long)]
    pub config: Option<PathBuf>,
}

impl Config {
    /// Apply CLI overrides to a loaded config.
    pub fn apply_cli_overrides(&mut self, args: &CliArgs) {
        if let Some(seed) = args.seed {
            self.world.seed = Some(seed);
        }
        if let Some(size) = args.size {
            self.world.size = size;
        }
        if let Some(sub) = args.subdivisions {
            self.world.subdivisions = sub;
        }
        if let Some(radius) = args.radius {
            self.world.stream_radius = radius;
        }
        if let Some(frames) = args.frames {
            self.viewer.frames = frames;
        }
        if let Some(frame) = args.reseed_at {
            self.viewer.reseed_at_frame = Some(frame);
        }
        if let Some(ref level) = args.log_level {
            self.debug.log_level = level.clone();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_override() {
        let mut config = Config::default();
        let args = CliArgs {
            seed: Some(7),
            radius: Some(1),
            ..Default::default()
        };
        config.apply_cli_overrides(&args);
        assert_eq!(config.world.seed, Some(7));
        assert_eq!(config.world.stream_radius, 1);
        // Non-overridden fields retain defaults
        assert_eq!(config.world.size, 240.0);
        assert_eq!(config.world.subdivisions, 160);
    }

    #[test]
    fn test_cli_no_override() {
        let original = Config::default();
        let mut config = Config::default();
        config.apply_cli_overrides(&CliArgs::default());
        assert_eq!(config, original);
    }

    #[test]
    fn test_cli_parses_flags() {
        let args =
            CliArgs::try_parse_from(["vale", "--seed", "99", "--frames", "10", "--reseed-at", "5"])
                .unwrap();
        assert_eq!(args.seed, Some(99));
        assert_eq!(args.frames, Some(10));
        assert_eq!(args.reseed_at, Some(5));
        assert!(args.config.is_none());
    }
}
