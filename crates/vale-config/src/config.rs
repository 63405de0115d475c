//! Configuration structs with sensible defaults and RON persistence.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Top-level configuration for world generation and the viewer.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// World dimensions, seed and streaming radius.
    pub world: WorldSettings,
    /// How streamed tiles are filled.
    pub terrain: TerrainSettings,
    /// Landmark counts, placement spreads and shape constants.
    pub landmarks: LandmarkSettings,
    /// River carving and water-table policy.
    pub erosion: ErosionSettings,
    /// Decorative scatter (trees) placement.
    pub scatter: ScatterSettings,
    /// Headless viewer walk.
    pub viewer: ViewerSettings,
    /// Debug/development settings.
    pub debug: DebugConfig,
}

/// Raw world settings as written in `config.ron`.
///
/// These are unvalidated; the terrain crate turns them into a checked
/// `WorldConfig` and rejects anything generation cannot honour.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct WorldSettings {
    /// Edge length of one tile in world units.
    pub size: f64,
    /// Grid cells per tile edge. Each tile has `(subdivisions + 1)^2` vertices.
    pub subdivisions: u32,
    /// Vertical scale applied to the normalised height.
    pub height_scale: f64,
    /// Pull toward mid-height, `0.0` keeps full relief, `1.0` is flat.
    pub flatten: f64,
    /// Tiles kept active on each side of the viewer's tile.
    pub stream_radius: u32,
    /// World seed. `None` draws a fresh seed at startup.
    pub seed: Option<u64>,
}

/// Which per-point pipeline fills streamed tiles.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub enum TileMode {
    /// Composite fractal height only.
    #[default]
    Plain,
    /// Composite height, river carving and landmark perturbation.
    Detailed,
}

/// Streamed tile generation settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct TerrainSettings {
    /// Fill pipeline for tiles requested by the streamer.
    pub tile_mode: TileMode,
    /// Frequency of the base noise layer; every fractal layer scales from it.
    pub base_frequency: f64,
}

/// Landmark placement and shaping tunables.
///
/// Centres are drawn as `(r - 0.5) * spread * size`, so a spread of `0.6`
/// keeps landmarks within 30% of the tile size from the origin.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LandmarkSettings {
    /// Number of cliffs.
    pub cliff_count: u32,
    /// Placement spread for cliff centres, as a fraction of world size.
    pub cliff_spread: f64,
    /// Cliff radius range `(min, max)`.
    pub cliff_radius: (f64, f64),
    /// Peak height offset at a cliff centre.
    pub cliff_strength: f64,
    /// Exponent of the cliff falloff `(1 - d/r)^falloff`.
    pub cliff_falloff: f64,
    /// Water is kept at least this far below a cliff-shaped surface.
    pub cliff_water_clearance: f64,
    /// Number of mesas.
    pub mesa_count: u32,
    /// Placement spread for mesa centres.
    pub mesa_spread: f64,
    /// Mesa radius range `(min, max)`.
    pub mesa_radius: (f64, f64),
    /// Plateau height range `(min, max)` above the uncarved surface.
    pub mesa_plateau: (f64, f64),
    /// Exponent of the mesa falloff.
    pub mesa_falloff: f64,
    /// Water depression at a mesa centre, scaled by falloff.
    pub mesa_water_depression: f64,
    /// Number of ruin clusters.
    pub ruin_count: u32,
    /// Placement spread for ruin centres.
    pub ruin_spread: f64,
}

/// River carving and water-table tunables.
///
/// The water policy has three ordered branches (river, shoreline, dry pocket);
/// the thresholds here only move the branch boundaries.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ErosionSettings {
    /// Gradient/walk step as a fraction of the grid cell size.
    pub gradient_step_factor: f64,
    /// Maximum downhill walk steps.
    pub walk_steps: u32,
    /// Scale from accumulated drop to river strength.
    pub flow_scale: f64,
    /// Carve depth per unit river strength on uneroded ground.
    pub carve_base: f64,
    /// Extra carve depth per unit river strength at full erosion weight.
    pub carve_erosion: f64,
    /// River strength above which a point counts as a river.
    pub river_threshold: f64,
    /// Water rise per unit river strength.
    pub river_rise: f64,
    /// River water stays this far below the carved ground.
    pub river_clearance: f64,
    /// Natural water closer than this to the ground is pulled down to it.
    pub shore_band: f64,
    /// Natural water further than this below the ground is treated as dry.
    pub dry_band: f64,
    /// Depth below ground where dry pockets are parked.
    pub dry_depth: f64,
    /// Final clearance between ground and water after landmarks.
    pub final_clearance: f64,
}

/// Decorative scatter settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ScatterSettings {
    /// Candidate count.
    pub count: u32,
    /// Candidate spread as a fraction of world size.
    pub spread: f64,
    /// Candidates on ground lower than this are dropped.
    pub min_height: f64,
}

/// Headless viewer walk settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ViewerSettings {
    /// Movement speed in world units per second.
    pub move_speed: f64,
    /// Eye height above the ground.
    pub eye_height: f64,
    /// Eye height used when the ground cannot be queried.
    pub fallback_height: f64,
    /// Per-frame interpolation toward the target eye height.
    pub follow: f64,
    /// Number of simulated frames.
    pub frames: u32,
    /// Walk heading in degrees, measured from +Z toward +X.
    pub heading_degrees: f64,
    /// Frame at which the walk switches to a freshly drawn seed.
    pub reseed_at_frame: Option<u32>,
}

/// Debug/development configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DebugConfig {
    /// Log level override (e.g., "debug", "info", "warn").
    pub log_level: String,
}

// --- Default implementations ---

impl Default for WorldSettings {
    fn default() -> Self {
        Self {
            size: 240.0,
            subdivisions: 160,
            height_scale: 18.0,
            flatten: 0.6,
            stream_radius: 2,
            seed: None,
        }
    }
}

impl Default for TerrainSettings {
    fn default() -> Self {
        Self {
            tile_mode: TileMode::Plain,
            base_frequency: 0.005,
        }
    }
}

impl Default for LandmarkSettings {
    fn default() -> Self {
        Self {
            cliff_count: 3,
            cliff_spread: 0.6,
            cliff_radius: (18.0, 40.0),
            cliff_strength: 2.2,
            cliff_falloff: 1.8,
            cliff_water_clearance: 0.8,
            mesa_count: 2,
            mesa_spread: 0.5,
            mesa_radius: (16.0, 34.0),
            mesa_plateau: (3.0, 7.0),
            mesa_falloff: 2.4,
            mesa_water_depression: 1.2,
            ruin_count: 4,
            ruin_spread: 0.55,
        }
    }
}

impl Default for ErosionSettings {
    fn default() -> Self {
        Self {
            gradient_step_factor: 0.6,
            walk_steps: 4,
            flow_scale: 0.35,
            carve_base: 0.6,
            carve_erosion: 1.4,
            river_threshold: 0.05,
            river_rise: 1.4,
            river_clearance: 0.05,
            shore_band: 0.2,
            dry_band: 0.6,
            dry_depth: 3.0,
            final_clearance: 0.05,
        }
    }
}

impl Default for ScatterSettings {
    fn default() -> Self {
        Self {
            count: 30,
            spread: 0.75,
            min_height: 2.0,
        }
    }
}

impl Default for ViewerSettings {
    fn default() -> Self {
        Self {
            move_speed: 8.0,
            eye_height: 2.8,
            fallback_height: 6.0,
            follow: 0.35,
            frames: 3600,
            heading_degrees: 30.0,
            reseed_at_frame: None,
        }
    }
}

impl Default for DebugConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}

// --- Validation ---

fn check_range(field: &'static str, (min, max): (f64, f64), positive: bool) -> Result<(), ConfigError> {
    if !min.is_finite() || !max.is_finite() || min > max {
        return Err(ConfigError::InvalidValue {
            field,
            reason: format!("expected finite min <= max, got ({min}, {max})"),
        });
    }
    if positive && min <= 0.0 {
        return Err(ConfigError::InvalidValue {
            field,
            reason: format!("lower bound must be positive, got {min}"),
        });
    }
    Ok(())
}

fn check_non_negative(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(ConfigError::InvalidValue {
            field,
            reason: format!("expected a finite non-negative value, got {value}"),
        })
    }
}

impl Config {
    /// Check the generation tunables.
    ///
    /// World size, subdivisions and seed are validated by the terrain crate
    /// when it builds a `WorldConfig`; this covers everything else.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let lm = &self.landmarks;
        check_range("landmarks.cliff_radius", lm.cliff_radius, true)?;
        check_range("landmarks.mesa_radius", lm.mesa_radius, true)?;
        check_range("landmarks.mesa_plateau", lm.mesa_plateau, false)?;
        check_non_negative("landmarks.cliff_spread", lm.cliff_spread)?;
        check_non_negative("landmarks.mesa_spread", lm.mesa_spread)?;
        check_non_negative("landmarks.ruin_spread", lm.ruin_spread)?;

        let er = &self.erosion;
        check_non_negative("erosion.gradient_step_factor", er.gradient_step_factor)?;
        check_non_negative("erosion.flow_scale", er.flow_scale)?;
        if er.shore_band > er.dry_band {
            return Err(ConfigError::InvalidValue {
                field: "erosion.shore_band",
                reason: format!(
                    "shore band {} must not exceed dry band {}",
                    er.shore_band, er.dry_band
                ),
            });
        }

        check_non_negative("scatter.spread", self.scatter.spread)?;
        if !(0.0..=1.0).contains(&self.viewer.follow) {
            return Err(ConfigError::InvalidValue {
                field: "viewer.follow",
                reason: format!("expected a value in [0, 1], got {}", self.viewer.follow),
            });
        }
        if !self.terrain.base_frequency.is_finite() || self.terrain.base_frequency <= 0.0 {
            return Err(ConfigError::InvalidValue {
                field: "terrain.base_frequency",
                reason: format!("expected a positive value, got {}", self.terrain.base_frequency),
            });
        }
        Ok(())
    }
}

// --- Load / Save / Reload ---

impl Config {
    /// Load config from the given directory, or create a default config file.
    pub fn load_or_create(config_dir: &Path) -> Result<Self, ConfigError> {
        let config_path = config_dir.join("config.ron");

        if config_path.exists() {
            let contents = std::fs::read_to_string(&config_path).map_err(ConfigError::ReadError)?;
            let config: Config = ron::from_str(&contents).map_err(ConfigError::ParseError)?;
            config.validate()?;
            log::info!("Loaded config from {}", config_path.display());
            Ok(config)
        } else {
            let config = Config::default();
            config.save(config_dir)?;
            log::info!("Created default config at {}", config_path.display());
            Ok(config)
        }
    }

    /// Save config to the given directory as `config.ron`.
    pub fn save(&self, config_dir: &Path) -> Result<(), ConfigError> {
        std::fs::create_dir_all(config_dir).map_err(ConfigError::WriteError)?;

        let config_path = config_dir.join("config.ron");
        let pretty = ron::ser::PrettyConfig::new()
            .depth_limit(3)
            .separate_tuple_members(false)
            .enumerate_arrays(false);

        let serialized =
            ron::ser::to_string_pretty(self, pretty).map_err(ConfigError::SerializeError)?;

        std::fs::write(&config_path, serialized).map_err(ConfigError::WriteError)?;
        log::debug!("Saved config to {}", config_path.display());
        Ok(())
    }

    /// Re-read `config.ron`; returns `Some(new_config)` if it differs from `self`.
    pub fn reload(&self, config_dir: &Path) -> Result<Option<Self>, ConfigError> {
        let config_path = config_dir.join("config.ron");
        let contents = std::fs::read_to_string(&config_path).map_err(ConfigError::ReadError)?;
        let new_config: Config = ron::from_str(&contents).map_err(ConfigError::ParseError)?;
        new_config.validate()?;

        if &new_config != self {
            log::info!("Config reloaded with changes");
            Ok(Some(new_config))
        } else {
            Ok(None)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_serializes() {
        let config = Config::default();
        let ron_str =
            ron::ser::to_string_pretty(&config, ron::ser::PrettyConfig::new().depth_limit(3))
                .unwrap();
        assert!(ron_str.contains("subdivisions: 160"));
        assert!(ron_str.contains("tile_mode: Plain"));
    }

    #[test]
    fn test_config_roundtrip_keeps_seed() {
        let mut config = Config::default();
        config.world.seed = Some(1234);
        config.terrain.tile_mode = TileMode::Detailed;
        let ron_str = ron::to_string(&config).unwrap();
        let deserialized: Config = ron::from_str(&ron_str).unwrap();
        assert_eq!(config, deserialized);
    }

    #[test]
    fn test_missing_section_uses_default() {
        let ron_str = "(world: (size: 100.0), debug: ())";
        let config: Config = ron::from_str(ron_str).unwrap();
        assert_eq!(config.world.size, 100.0);
        assert_eq!(config.world.subdivisions, 160);
        assert_eq!(config.landmarks, LandmarkSettings::default());
    }

    #[test]
    fn test_default_landmark_counts() {
        let lm = LandmarkSettings::default();
        assert_eq!((lm.cliff_count, lm.mesa_count, lm.ruin_count), (3, 2, 4));
    }

    #[test]
    fn test_default_config_validates() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn test_inverted_radius_range_rejected() {
        let mut config = Config::default();
        config.landmarks.cliff_radius = (40.0, 18.0);
        let err = config.validate().unwrap_err();
        assert!(
            matches!(err, ConfigError::InvalidValue { field: "landmarks.cliff_radius", .. }),
            "unexpected error: {err}"
        );
    }

    #[test]
    fn test_shore_band_beyond_dry_band_rejected() {
        let mut config = Config::default();
        config.erosion.shore_band = 1.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = Config::default();
        config.world.seed = Some(42);
        config.world.stream_radius = 3;

        config.save(dir.path()).unwrap();
        let loaded = Config::load_or_create(dir.path()).unwrap();
        assert_eq!(config, loaded);
    }

    #[test]
    fn test_load_or_create_writes_default() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_or_create(dir.path()).unwrap();
        assert_eq!(config, Config::default());
        assert!(dir.path().join("config.ron").exists());
    }

    #[test]
    fn test_reload_detects_changes() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::default();
        config.save(dir.path()).unwrap();

        let mut modified = config.clone();
        modified.world.flatten = 0.2;
        modified.save(dir.path()).unwrap();

        let result = config.reload(dir.path()).unwrap();
        assert_eq!(result.map(|c| c.world.flatten), Some(0.2));
    }

    #[test]
    fn test_reload_no_changes() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::default();
        config.save(dir.path()).unwrap();

        let result = config.reload(dir.path()).unwrap();
        assert!(result.is_none());
    }

    #[test]
    fn test_invalid_ron_produces_error() {
        let result: Result<Config, _> = ron::from_str("{{not valid}}");
        assert!(result.is_err());
    }
}
