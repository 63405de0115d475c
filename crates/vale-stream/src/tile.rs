//! Tile addressing and the per-tile record kept by the streamer.

use std::fmt;

use glam::DVec3;

/// Integer grid position of a tile.
///
/// Tile `(ix, iz)` covers `[ix * size - size/2, ix * size + size/2]` on X (and
/// likewise on Z), so tile `(0, 0)` is centred on the world origin.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TileCoord {
    pub ix: i32,
    pub iz: i32,
}

/// Largest tile index on either axis that [`TileCoord::containing`] hands out.
///
/// Leaves headroom so a window around any valid centre stays in `i32`.
pub const MAX_TILE_INDEX: i32 = 1 << 24;

impl TileCoord {
    pub fn new(ix: i32, iz: i32) -> Self {
        Self { ix, iz }
    }

    /// Tile containing the world-space point `(x, z)`.
    ///
    /// Points exactly on a shared edge belong to the tile on the positive side.
    /// Returns `None` for non-finite points and for points further than
    /// [`MAX_TILE_INDEX`] tiles from the origin.
    pub fn containing(x: f64, z: f64, size: f64) -> Option<Self> {
        let half = size * 0.5;
        let index = |p: f64| {
            let i = ((p + half) / size).floor();
            let max = f64::from(MAX_TILE_INDEX);
            (i.is_finite() && (-max..=max).contains(&i)).then_some(i as i32)
        };
        Some(Self {
            ix: index(x)?,
            iz: index(z)?,
        })
    }

    /// World-space centre of the tile, on the `y = 0` plane.
    pub fn center(self, size: f64) -> DVec3 {
        DVec3::new(f64::from(self.ix) * size, 0.0, f64::from(self.iz) * size)
    }

    pub fn offset(self, dx: i32, dz: i32) -> Self {
        Self {
            ix: self.ix.saturating_add(dx),
            iz: self.iz.saturating_add(dz),
        }
    }

    /// Chebyshev distance in tiles.
    pub fn distance(self, other: Self) -> u32 {
        self.ix.abs_diff(other.ix).max(self.iz.abs_diff(other.iz))
    }

    /// Every tile within `radius` of `self`, row by row (Z outer, X inner).
    pub fn window(self, radius: u32) -> impl Iterator<Item = TileCoord> {
        let r = i32::try_from(radius).unwrap_or(i32::MAX);
        (-r..=r).flat_map(move |dz| (-r..=r).map(move |dx| self.offset(dx, dz)))
    }
}

impl fmt::Display for TileCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.ix, self.iz)
    }
}

/// Diagnostic name for one acquisition of a tile.
pub fn tile_name(coord: TileCoord, serial: u64) -> String {
    format!("chunk_{}_{}_{}", coord.ix, coord.iz, serial)
}

/// An active tile and the resource backing it.
///
/// Only active tiles are represented; released resources go back to the
/// streamer's pool as bare handles.
#[derive(Debug)]
pub struct Tile<H> {
    coord: TileCoord,
    handle: H,
    serial: u64,
}

impl<H> Tile<H> {
    pub(crate) fn new(coord: TileCoord, handle: H, serial: u64) -> Self {
        Self {
            coord,
            handle,
            serial,
        }
    }

    pub fn coord(&self) -> TileCoord {
        self.coord
    }

    pub fn handle(&self) -> &H {
        &self.handle
    }

    pub(crate) fn handle_mut(&mut self) -> &mut H {
        &mut self.handle
    }

    /// Acquisition serial, unique for the streamer's lifetime.
    pub fn serial(&self) -> u64 {
        self.serial
    }

    pub fn name(&self) -> String {
        tile_name(self.coord, self.serial)
    }

    pub(crate) fn into_handle(self) -> H {
        self.handle
    }
}
