//! Keeps a square window of tiles alive around a moving point.
//!
//! When the reference point crosses into a new tile, tiles that fell out of
//! the `(2r + 1)^2` window are disabled and their resources parked in a pool;
//! newly needed tiles take a pooled resource (rebuilt in place) before the
//! builder is asked for a fresh one. Resources are never destroyed, so after
//! warm-up the streamer stops allocating.

use glam::DVec3;
use rustc_hash::FxHashMap;
use vale_terrain::WorldConfig;

use crate::builder::{TileBuilder, TileRequest};
use crate::cache::HeightCache;
use crate::error::StreamError;
use crate::tile::{Tile, TileCoord, tile_name};
use crate::view::ViewSettings;

/// Tiles beyond the window whose height grids stay cached, so short
/// back-and-forth moves do not regenerate them.
pub const CACHE_MARGIN: u32 = 2;

/// Result of a single [`TileStreamer::update`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct StreamUpdate {
    /// Whether the window was recomputed (centre moved or forced).
    pub changed: bool,
    /// Tiles disabled and returned to the pool.
    pub released: usize,
    /// Tiles built on a pooled resource.
    pub reused: usize,
    /// Tiles built on a freshly created resource.
    pub created: usize,
}

/// The streaming controller.
///
/// Call [`TileStreamer::update`] every frame with the viewer position.
pub struct TileStreamer<B: TileBuilder> {
    builder: B,
    size: f64,
    radius: u32,
    center: Option<TileCoord>,
    active: FxHashMap<TileCoord, Tile<B::Handle>>,
    pool: Vec<B::Handle>,
    next_serial: u64,
}

impl<B: TileBuilder> TileStreamer<B> {
    /// Create a streamer for the config's tile size and stream radius.
    pub fn new(builder: B, config: &WorldConfig) -> Self {
        Self {
            builder,
            size: config.size(),
            radius: config.stream_radius(),
            center: None,
            active: FxHashMap::default(),
            pool: Vec::new(),
            next_serial: 0,
        }
    }

    pub fn builder(&self) -> &B {
        &self.builder
    }

    pub fn builder_mut(&mut self) -> &mut B {
        &mut self.builder
    }

    pub fn size(&self) -> f64 {
        self.size
    }

    pub fn radius(&self) -> u32 {
        self.radius
    }

    /// Centre tile of the last successful update.
    pub fn center(&self) -> Option<TileCoord> {
        self.center
    }

    /// Clip and fog distances for the current window.
    pub fn view(&self) -> ViewSettings {
        ViewSettings::for_window(self.size, self.radius)
    }

    pub fn active_count(&self) -> usize {
        self.active.len()
    }

    /// Parked resources waiting for reuse.
    pub fn pool_len(&self) -> usize {
        self.pool.len()
    }

    pub fn is_active(&self, coord: TileCoord) -> bool {
        self.active.contains_key(&coord)
    }

    pub fn tile(&self, coord: TileCoord) -> Option<&Tile<B::Handle>> {
        self.active.get(&coord)
    }

    /// Active tile coordinates in sorted order.
    pub fn active_coords(&self) -> Vec<TileCoord> {
        let mut coords: Vec<_> = self.active.keys().copied().collect();
        coords.sort_unstable();
        coords
    }

    /// Recompute the window around `position` if its tile changed or `force` is set.
    ///
    /// On a build failure the tiles acquired so far stay active, the failed
    /// tile is not, and the centre is forgotten so the next call retries.
    /// Non-finite or unaddressable positions are rejected before anything
    /// changes.
    pub fn update(
        &mut self,
        position: DVec3,
        force: bool,
        cache: &mut HeightCache,
    ) -> Result<StreamUpdate, StreamError<B::Error>> {
        let Some(center) = TileCoord::containing(position.x, position.z, self.size) else {
            tracing::warn!(x = position.x, z = position.z, "position outside streamable area");
            return Err(StreamError::OutOfRange {
                x: position.x,
                z: position.z,
            });
        };
        if !force && self.center == Some(center) {
            return Ok(StreamUpdate::default());
        }
        self.center = None;

        let mut outcome = StreamUpdate {
            changed: true,
            ..StreamUpdate::default()
        };

        let mut stale: Vec<TileCoord> = self
            .active
            .keys()
            .filter(|coord| coord.distance(center) > self.radius)
            .copied()
            .collect();
        stale.sort_unstable();
        for coord in stale {
            if let Some(tile) = self.active.remove(&coord) {
                let mut handle = tile.into_handle();
                self.builder.set_enabled(&mut handle, false);
                self.pool.push(handle);
                outcome.released += 1;
            }
        }

        for coord in center.window(self.radius) {
            if !self.active.contains_key(&coord) {
                self.acquire(coord, cache, &mut outcome)?;
            }
        }

        self.center = Some(center);
        let evicted = cache.evict_outside(center, self.radius + CACHE_MARGIN);
        tracing::debug!(
            %center,
            released = outcome.released,
            reused = outcome.reused,
            created = outcome.created,
            pooled = self.pool.len(),
            evicted,
            "streaming window updated"
        );
        Ok(outcome)
    }

    fn acquire(
        &mut self,
        coord: TileCoord,
        cache: &mut HeightCache,
        outcome: &mut StreamUpdate,
    ) -> Result<(), StreamError<B::Error>> {
        let serial = self.next_serial;
        self.next_serial += 1;
        let name = tile_name(coord, serial);
        let request = TileRequest {
            coord,
            center: coord.center(self.size),
            field: cache.ensure_field(coord),
            name: &name,
        };

        let mut handle = match self.pool.pop() {
            Some(mut handle) => {
                if let Err(source) = self.builder.refresh_tile(&mut handle, &request) {
                    self.pool.push(handle);
                    tracing::warn!(%coord, error = %source, "failed to refresh pooled tile");
                    return Err(StreamError::Build { coord, source });
                }
                outcome.reused += 1;
                handle
            }
            None => match self.builder.create_tile(&request) {
                Ok(handle) => {
                    outcome.created += 1;
                    handle
                }
                Err(source) => {
                    tracing::warn!(%coord, error = %source, "failed to create tile");
                    return Err(StreamError::Build { coord, source });
                }
            },
        };

        self.builder.set_enabled(&mut handle, true);
        self.active.insert(coord, Tile::new(coord, handle, serial));
        Ok(())
    }

    /// Rebuild every active tile in place from the cache's current heights.
    ///
    /// Leaves the active set and the pool untouched. Returns the number of
    /// tiles rebuilt.
    pub fn rebuild_active(&mut self, cache: &mut HeightCache) -> Result<usize, StreamError<B::Error>> {
        let coords = self.active_coords();
        for &coord in &coords {
            let Some(tile) = self.active.get_mut(&coord) else {
                continue;
            };
            let name = tile.name();
            let request = TileRequest {
                coord,
                center: coord.center(self.size),
                field: cache.ensure_field(coord),
                name: &name,
            };
            self.builder
                .refresh_tile(tile.handle_mut(), &request)
                .map_err(|source| {
                    tracing::warn!(%coord, error = %source, "failed to rebuild active tile");
                    StreamError::Build { coord, source }
                })?;
        }
        tracing::debug!(rebuilt = coords.len(), "rebuilt active tiles");
        Ok(coords.len())
    }
}


#[cfg(test)]
mod tests {
    use super::test_support::{MockBuilder, MockError};
    use super::*;
    use vale_config::TileMode;
    use vale_terrain::{GenerationProfile, WorldGenerator};

    fn setup(size: f64, radius: u32) -> (TileStreamer<MockBuilder>, HeightCache) {
        let config = WorldConfig::new(size, 4, 18.0, 0.5, radius, 7).unwrap();
        let streamer = TileStreamer::new(MockBuilder::default(), &config);
        let cache = HeightCache::new(
            WorldGenerator::new(config, GenerationProfile::default()),
            TileMode::Plain,
        );
        (streamer, cache)
    }

    fn at(x: f64, z: f64) -> DVec3 {
        DVec3::new(x, 2.0, z)
    }

    #[test]
    fn test_window_size_matches_radius() {
        for radius in 0..=3 {
            let (mut streamer, mut cache) = setup(10.0, radius);
            streamer.update(at(0.0, 0.0), false, &mut cache).unwrap();
            let side = (2 * radius + 1) as usize;
            assert_eq!(streamer.active_count(), side * side, "radius {radius}");
        }
    }

    #[test]
    fn test_radius_one_walk_scenario() {
        let (mut streamer, mut cache) = setup(10.0, 1);

        let first = streamer.update(at(0.0, 0.0), false, &mut cache).unwrap();
        assert_eq!(streamer.active_count(), 9);
        assert_eq!(streamer.pool_len(), 0);
        assert_eq!(first.created, 9);

        let second = streamer.update(at(11.0, 0.0), false, &mut cache).unwrap();
        assert_eq!(streamer.center(), Some(TileCoord::new(1, 0)));
        assert_eq!(second.released, 3, "column ix = -1 leaves the window");
        assert_eq!(second.reused, 3, "column ix = 2 reuses those resources");
        assert_eq!(second.created, 0);
        assert_eq!(streamer.active_count(), 9);
        assert_eq!(streamer.pool_len(), 0);
        for coord in streamer.active_coords() {
            assert!((0..=2).contains(&coord.ix), "unexpected column in {coord}");
            assert!((-1..=1).contains(&coord.iz), "unexpected row in {coord}");
        }
    }

    #[test]
    fn test_unchanged_center_is_noop() {
        let (mut streamer, mut cache) = setup(10.0, 1);
        streamer.update(at(0.0, 0.0), false, &mut cache).unwrap();
        let again = streamer.update(at(3.0, -4.0), false, &mut cache).unwrap();
        assert_eq!(again, StreamUpdate::default());
        assert_eq!(streamer.builder().created, 9);
    }

    #[test]
    fn test_forced_update_keeps_window() {
        let (mut streamer, mut cache) = setup(10.0, 1);
        streamer.update(at(0.0, 0.0), false, &mut cache).unwrap();
        let forced = streamer.update(at(0.0, 0.0), true, &mut cache).unwrap();
        assert!(forced.changed);
        assert_eq!((forced.released, forced.reused, forced.created), (0, 0, 0));
        assert_eq!(streamer.active_count(), 9);
    }

    #[test]
    fn test_locality_and_pool_conservation() {
        let (mut streamer, mut cache) = setup(10.0, 2);
        let path = [
            (0.0, 0.0),
            (12.0, 0.0),
            (26.0, 3.0),
            (26.0, 40.0),
            (-70.0, -70.0),
            (-64.0, -71.0),
            (0.0, 0.0),
        ];
        for &(x, z) in &path {
            streamer.update(at(x, z), false, &mut cache).unwrap();
            let center = streamer.center().unwrap();
            assert_eq!(streamer.active_count(), 25);
            for coord in streamer.active_coords() {
                assert!(coord.distance(center) <= 2, "{coord} outside window around {center}");
            }
            let created = streamer.builder().created as usize;
            assert_eq!(
                streamer.active_count() + streamer.pool_len(),
                created,
                "every created resource is either active or pooled"
            );
        }
    }

    #[test]
    fn test_pooled_handles_are_disabled_and_active_enabled() {
        let (mut streamer, mut cache) = setup(10.0, 1);
        streamer.update(at(0.0, 0.0), false, &mut cache).unwrap();
        // Every tile leaves the window and the first replacement fails, so
        // all nine resources end up parked.
        streamer.builder_mut().fail_on.insert(TileCoord::new(9, 9));
        assert!(streamer.update(at(100.0, 100.0), false, &mut cache).is_err());
        assert_eq!(streamer.pool_len(), 9);
        assert!(streamer.pool.iter().all(|h| !h.enabled), "pooled handles must be disabled");

        streamer.builder_mut().fail_on.clear();
        streamer.update(at(0.0, 0.0), false, &mut cache).unwrap();
        for coord in streamer.active_coords() {
            let tile = streamer.tile(coord).unwrap();
            assert!(tile.handle().enabled);
            assert_eq!(tile.handle().coord, coord);
        }
    }

    #[test]
    fn test_serials_increase_per_acquisition() {
        let (mut streamer, mut cache) = setup(10.0, 0);
        streamer.update(at(0.0, 0.0), false, &mut cache).unwrap();
        streamer.update(at(10.0, 0.0), false, &mut cache).unwrap();
        streamer.update(at(0.0, 0.0), false, &mut cache).unwrap();
        let tile = streamer.tile(TileCoord::new(0, 0)).unwrap();
        assert_eq!(tile.serial(), 2);
        assert_eq!(tile.handle().name, "chunk_0_0_2");
        assert_eq!(tile.name(), "chunk_0_0_2");
    }

    #[test]
    fn test_create_failure_is_not_marked_active() {
        let (mut streamer, mut cache) = setup(10.0, 1);
        streamer.builder_mut().fail_on.insert(TileCoord::new(1, 1));

        let err = streamer.update(at(0.0, 0.0), false, &mut cache).unwrap_err();
        assert_eq!(err.coord(), Some(TileCoord::new(1, 1)));
        assert!(matches!(err, StreamError::Build { source: MockError(_), .. }));
        assert!(!streamer.is_active(TileCoord::new(1, 1)));
        assert!(streamer.active_count() < 9);
        assert_eq!(streamer.center(), None, "failed update must be retried");

        streamer.builder_mut().fail_on.clear();
        streamer.update(at(0.0, 0.0), false, &mut cache).unwrap();
        assert_eq!(streamer.active_count(), 9);
        assert_eq!(streamer.pool_len() + streamer.active_count(), 9);
    }

    #[test]
    fn test_refresh_failure_returns_handle_to_pool() {
        let (mut streamer, mut cache) = setup(10.0, 1);
        streamer.update(at(0.0, 0.0), false, &mut cache).unwrap();
        streamer.builder_mut().fail_on.insert(TileCoord::new(2, 0));

        let err = streamer.update(at(11.0, 0.0), false, &mut cache).unwrap_err();
        assert_eq!(err.coord(), Some(TileCoord::new(2, 0)));
        assert!(!streamer.is_active(TileCoord::new(2, 0)));
        assert_eq!(
            streamer.active_count() + streamer.pool_len(),
            9,
            "no resource may be lost on failure"
        );
    }

    #[test]
    fn test_rebuild_active_keeps_partition() {
        let (mut streamer, mut cache) = setup(10.0, 1);
        streamer.update(at(0.0, 0.0), false, &mut cache).unwrap();
        streamer.update(at(11.0, 0.0), false, &mut cache).unwrap();
        let before = streamer.active_coords();
        let pooled = streamer.pool_len();

        let rebuilt = streamer.rebuild_active(&mut cache).unwrap();
        assert_eq!(rebuilt, 9);
        assert_eq!(streamer.active_coords(), before);
        assert_eq!(streamer.pool_len(), pooled);
        assert!(streamer.active_coords().iter().all(|&c| streamer.tile(c).unwrap().handle().builds >= 2));
    }

    #[test]
    fn test_far_and_non_finite_positions_rejected() {
        let (mut streamer, mut cache) = setup(10.0, 1);
        streamer.update(at(0.0, 0.0), false, &mut cache).unwrap();
        let before = streamer.active_coords();

        for position in [at(3.0e10, 0.0), at(0.0, -3.0e10), at(f64::NAN, 0.0), at(0.0, f64::INFINITY)] {
            let err = streamer.update(position, true, &mut cache).unwrap_err();
            assert!(matches!(err, StreamError::OutOfRange { .. }), "{position:?} accepted");
            assert_eq!(err.coord(), None);
        }
        assert_eq!(streamer.active_coords(), before, "rejected updates must not move the window");
        assert_eq!(streamer.center(), Some(TileCoord::new(0, 0)));
    }

    #[test]
    fn test_cache_evicts_grids_far_behind() {
        let (mut streamer, mut cache) = setup(10.0, 1);
        streamer.update(at(0.0, 0.0), false, &mut cache).unwrap();
        assert!(cache.field(TileCoord::new(0, 0)).is_some());

        let keep = (2 * (1 + CACHE_MARGIN) + 1) as usize;
        for step in 1..=20 {
            streamer.update(at(f64::from(step) * 10.0, 0.0), false, &mut cache).unwrap();
            assert!(cache.len() <= keep * keep, "cache grew to {} grids", cache.len());
        }
        assert!(cache.field(TileCoord::new(0, 0)).is_none(), "origin grid should be evicted");
        for coord in streamer.active_coords() {
            assert!(cache.field(coord).is_some(), "active tile {coord} lost its grid");
        }
    }

    #[test]
    fn test_view_follows_window() {
        let (streamer, _) = setup(10.0, 1);
        assert_eq!(streamer.view(), ViewSettings::for_window(10.0, 1));
        assert!((streamer.view().far_clip - 42.0).abs() < 1e-9);
    }
}
