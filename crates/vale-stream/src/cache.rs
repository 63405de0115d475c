//! Per-tile height grids, generated on first use.
//!
//! The cache is the single place streamed tiles and point queries read
//! heights from, so a tile's mesh and ground collision always agree. Fields
//! stay cached until [`HeightCache::clear`], a generator swap, or the
//! streamer evicts them once they fall well outside its window. Point
//! queries that never reach the streamer still add grids, about
//! `4 * (subdivisions + 1)^2` bytes each.

use rustc_hash::FxHashMap;
use vale_config::TileMode;
use vale_terrain::{HeightField, WorldGenerator};

use crate::tile::TileCoord;

/// Relative slack, in units of `f64::EPSILON` times the coordinate
/// magnitude, within which a point on a shared tile edge is still sampled
/// from the tile it was located in.
const EDGE_SLACK: f64 = 64.0;

/// Lazily filled map from tile coordinates to height grids.
#[derive(Debug)]
pub struct HeightCache {
    generator: WorldGenerator,
    mode: TileMode,
    fields: FxHashMap<TileCoord, HeightField>,
}

impl HeightCache {
    pub fn new(generator: WorldGenerator, mode: TileMode) -> Self {
        Self {
            generator,
            mode,
            fields: FxHashMap::default(),
        }
    }

    pub fn generator(&self) -> &WorldGenerator {
        &self.generator
    }

    pub fn mode(&self) -> TileMode {
        self.mode
    }

    /// Tile edge length in world units.
    pub fn size(&self) -> f64 {
        self.generator.config().size()
    }

    /// Tile containing the world-space point `(x, z)`, `None` when the point
    /// is non-finite or out of tile range.
    pub fn chunk_coords(&self, x: f64, z: f64) -> Option<TileCoord> {
        TileCoord::containing(x, z, self.size())
    }

    /// Height grid for `coord`, generating it on a miss.
    pub fn ensure_field(&mut self, coord: TileCoord) -> &HeightField {
        let generator = &self.generator;
        let mode = self.mode;
        self.fields.entry(coord).or_insert_with(|| {
            tracing::debug!(%coord, ?mode, "generating tile heights");
            generator.tile_field(coord.ix, coord.iz, mode)
        })
    }

    /// Cached grid for `coord`, if any.
    pub fn field(&self, coord: TileCoord) -> Option<&HeightField> {
        self.fields.get(&coord)
    }

    /// Ground height at `(x, z)`, generating the containing tile if needed.
    ///
    /// Non-finite coordinates yield `None` without touching the cache.
    /// Points on a shared edge always resolve, even when rounding puts them
    /// a few ULPs outside the located tile's stored extent.
    pub fn sample_height(&mut self, x: f64, z: f64) -> Option<f64> {
        let coord = self.chunk_coords(x, z)?;
        let slack = self.edge_slack(x, z);
        self.ensure_field(coord).sample_within(x, z, slack)
    }

    /// Ground height at `(x, z)` from already-cached tiles only.
    pub fn sample_cached(&self, x: f64, z: f64) -> Option<f64> {
        let coord = self.chunk_coords(x, z)?;
        self.field(coord)?.sample_within(x, z, self.edge_slack(x, z))
    }

    fn edge_slack(&self, x: f64, z: f64) -> f64 {
        EDGE_SLACK * f64::EPSILON * (self.size() + x.abs().max(z.abs()))
    }

    /// Drop grids further than `keep` tiles (Chebyshev) from `center`.
    ///
    /// Returns how many were dropped.
    pub fn evict_outside(&mut self, center: TileCoord, keep: u32) -> usize {
        let before = self.fields.len();
        self.fields.retain(|coord, _| coord.distance(center) <= keep);
        before - self.fields.len()
    }

    /// Drop every cached grid.
    pub fn clear(&mut self) {
        let dropped = self.fields.len();
        self.fields.clear();
        tracing::debug!(dropped, "cleared height cache");
    }

    /// Swap in a new generator (for example after a reseed) and clear.
    pub fn set_generator(&mut self, generator: WorldGenerator) {
        self.generator = generator;
        self.clear();
    }

    /// Number of cached grids.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}
