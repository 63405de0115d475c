//! The tile resource collaborator.
//!
//! The streamer decides which tiles exist; a [`TileBuilder`] turns height
//! grids into whatever the host renders (GPU meshes, CPU buffers, test
//! doubles) and owns those resources through opaque handles.

use glam::DVec3;
use vale_terrain::HeightField;

use crate::tile::TileCoord;

/// Everything a builder needs to (re)build one tile.
#[derive(Clone, Copy, Debug)]
pub struct TileRequest<'a> {
    pub coord: TileCoord,
    /// World-space centre of the tile.
    pub center: DVec3,
    /// Heights for every tile vertex.
    pub field: &'a HeightField,
    /// Diagnostic name, unique per acquisition.
    pub name: &'a str,
}

/// Creates and updates tile resources on behalf of the streamer.
pub trait TileBuilder {
    /// Opaque resource handle. Handles are recycled, never destroyed, while
    /// the streamer is alive.
    type Handle;
    type Error: std::error::Error + Send + Sync + 'static;

    /// Build a brand-new resource for `request`.
    fn create_tile(&mut self, request: &TileRequest<'_>) -> Result<Self::Handle, Self::Error>;

    /// Rebuild an existing resource in place for `request`.
    ///
    /// On error the handle must still be usable as a pooled resource.
    fn refresh_tile(
        &mut self,
        handle: &mut Self::Handle,
        request: &TileRequest<'_>,
    ) -> Result<(), Self::Error>;

    /// Show or hide a resource.
    fn set_enabled(&mut self, handle: &mut Self::Handle, enabled: bool);

    /// Drop any geometry templates derived from earlier builds.
    fn invalidate_templates(&mut self) {}
}
