//! Validated world parameters shared by generation and streaming.

use vale_config::WorldSettings;

use crate::error::ConfigurationError;

/// Immutable parameters for one generation of the world.
///
/// Built through [`WorldConfig::new`] or [`WorldConfig::from_settings`], which
/// reject values generation cannot honour. `flatten` is a quality knob and is
/// clamped into `[0, 1]` instead.
#[derive(Clone, Debug, PartialEq)]
pub struct WorldConfig {
    size: f64,
    subdivisions: u32,
    height_scale: f64,
    flatten: f64,
    stream_radius: u32,
    seed: u32,
}

impl WorldConfig {
    /// Validate and build a config.
    pub fn new(
        size: f64,
        subdivisions: u32,
        height_scale: f64,
        flatten: f64,
        stream_radius: u32,
        seed: u64,
    ) -> Result<Self, ConfigurationError> {
        if !size.is_finite() || size <= 0.0 {
            return Err(ConfigurationError::InvalidSize(size));
        }
        if subdivisions == 0 {
            return Err(ConfigurationError::ZeroSubdivisions);
        }
        let seed = u32::try_from(seed).map_err(|_| ConfigurationError::SeedOutOfRange(seed))?;
        if !height_scale.is_finite() {
            return Err(ConfigurationError::InvalidHeightScale(height_scale));
        }

        let clamped = if flatten.is_nan() { 0.0 } else { flatten.clamp(0.0, 1.0) };
        if clamped != flatten {
            tracing::warn!(flatten, clamped, "flatten factor outside [0, 1], clamping");
        }

        Ok(Self {
            size,
            subdivisions,
            height_scale,
            flatten: clamped,
            stream_radius,
            seed,
        })
    }

    /// Build from file settings, using `seed` in place of the settings' seed.
    ///
    /// The caller resolves the seed so that a missing seed can be replaced by
    /// a freshly drawn one outside the deterministic core.
    pub fn from_settings(settings: &WorldSettings, seed: u64) -> Result<Self, ConfigurationError> {
        Self::new(
            settings.size,
            settings.subdivisions,
            settings.height_scale,
            settings.flatten,
            settings.stream_radius,
            seed,
        )
    }

    /// Same parameters with a different seed.
    pub fn with_seed(&self, seed: u32) -> Self {
        Self {
            seed,
            ..self.clone()
        }
    }

    /// Tile edge length in world units.
    pub fn size(&self) -> f64 {
        self.size
    }

    /// Grid cells per tile edge.
    pub fn subdivisions(&self) -> u32 {
        self.subdivisions
    }

    /// Vertical scale applied to normalised heights.
    pub fn height_scale(&self) -> f64 {
        self.height_scale
    }

    /// Flatten factor in `[0, 1]`.
    pub fn flatten(&self) -> f64 {
        self.flatten
    }

    /// Tiles kept active on each side of the centre tile.
    pub fn stream_radius(&self) -> u32 {
        self.stream_radius
    }

    /// World seed.
    pub fn seed(&self) -> u32 {
        self.seed
    }

    /// Distance between neighbouring grid vertices.
    pub fn cell_size(&self) -> f64 {
        self.size / f64::from(self.subdivisions)
    }

    /// Vertices per grid row (`subdivisions + 1`).
    pub fn grid_width(&self) -> usize {
        self.subdivisions as usize + 1
    }
}
