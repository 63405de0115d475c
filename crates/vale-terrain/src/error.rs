//! Terrain configuration errors.

/// Reasons a [`WorldConfig`](crate::WorldConfig) cannot be built.
///
/// These are rejected outright, never clamped: generation has no sensible
/// interpretation for them.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigurationError {
    /// Tile size must be a finite value greater than zero.
    #[error("tile size must be finite and > 0, got {0}")]
    InvalidSize(f64),

    /// A tile needs at least one grid cell per edge.
    #[error("subdivision count must be at least 1")]
    ZeroSubdivisions,

    /// The seed does not fit in 32 bits.
    #[error("seed {0} exceeds the 32-bit range (max {max})", max = u32::MAX)]
    SeedOutOfRange(u64),

    /// Height scale must be finite.
    #[error("height scale must be finite, got {0}")]
    InvalidHeightScale(f64),
}
