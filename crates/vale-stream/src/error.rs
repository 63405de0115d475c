//! Streaming errors.

use crate::tile::TileCoord;

/// Errors surfaced by [`TileStreamer`](crate::TileStreamer) operations.
///
/// Generic over the builder's own error type so callers keep the underlying
/// failure as the error source.
#[derive(Debug, thiserror::Error)]
pub enum StreamError<E>
where
    E: std::error::Error + 'static,
{
    /// The builder failed to create or refresh a tile.
    #[error("failed to build tile {coord}")]
    Build {
        coord: TileCoord,
        #[source]
        source: E,
    },
    /// The position is non-finite or too far out to address a tile.
    #[error("position ({x}, {z}) is outside the streamable area")]
    OutOfRange { x: f64, z: f64 },
}

impl<E> StreamError<E>
where
    E: std::error::Error + 'static,
{
    /// Tile the failure happened on, if it got that far.
    pub fn coord(&self) -> Option<TileCoord> {
        match self {
            StreamError::Build { coord, .. } => Some(*coord),
            StreamError::OutOfRange { .. } => None,
        }
    }
}
