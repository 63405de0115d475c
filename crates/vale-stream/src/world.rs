//! One handle over the height cache and the streamer.
//!
//! Keeps the cache-invalidation flows in one place: clearing heights also
//! drops builder templates, and reseeding clears, swaps the generator,
//! rebuilds active tiles and forces a window update.

use glam::DVec3;
use vale_config::TileMode;
use vale_terrain::WorldGenerator;

use crate::builder::TileBuilder;
use crate::cache::HeightCache;
use crate::error::StreamError;
use crate::streamer::{StreamUpdate, TileStreamer};
use crate::tile::TileCoord;

/// Streamed terrain around a moving viewer.
pub struct StreamingWorld<B: TileBuilder> {
    cache: HeightCache,
    streamer: TileStreamer<B>,
    last_position: Option<DVec3>,
}

impl<B: TileBuilder> StreamingWorld<B> {
    pub fn new(generator: WorldGenerator, mode: TileMode, builder: B) -> Self {
        let streamer = TileStreamer::new(builder, generator.config());
        Self {
            cache: HeightCache::new(generator, mode),
            streamer,
            last_position: None,
        }
    }

    pub fn cache(&self) -> &HeightCache {
        &self.cache
    }

    pub fn streamer(&self) -> &TileStreamer<B> {
        &self.streamer
    }

    pub fn builder_mut(&mut self) -> &mut B {
        self.streamer.builder_mut()
    }

    pub fn seed(&self) -> u32 {
        self.cache.generator().config().seed()
    }

    /// Per-frame tick: move the window to `position` if needed.
    pub fn update(
        &mut self,
        position: DVec3,
        force: bool,
    ) -> Result<StreamUpdate, StreamError<B::Error>> {
        self.last_position = Some(position);
        self.streamer.update(position, force, &mut self.cache)
    }

    /// Ground height at `(x, z)`, generating the containing tile on demand.
    pub fn sample_height(&mut self, x: f64, z: f64) -> Option<f64> {
        self.cache.sample_height(x, z)
    }

    /// Drop cached heights and builder templates.
    pub fn clear_cache(&mut self) {
        self.cache.clear();
        self.streamer.builder_mut().invalidate_templates();
    }

    /// Rebuild active tiles from current heights.
    pub fn rebuild_active(&mut self) -> Result<usize, StreamError<B::Error>> {
        self.streamer.rebuild_active(&mut self.cache)
    }

    /// Switch the world to `seed` and bring every active tile up to date.
    ///
    /// The active coordinate set is kept; only tile contents change.
    pub fn reseed(&mut self, seed: u32) -> Result<(), StreamError<B::Error>> {
        tracing::info!(from = self.seed(), to = seed, "reseeding world");
        self.clear_cache();
        let generator = self.cache.generator().reseeded(seed);
        self.cache.set_generator(generator);
        self.rebuild_active()?;

        let position = self
            .last_position
            .or_else(|| self.streamer.center().map(|c| c.center(self.streamer.size())));
        if let Some(position) = position {
            self.streamer.update(position, true, &mut self.cache)?;
        }
        Ok(())
    }

    pub fn active_coords(&self) -> Vec<TileCoord> {
        self.streamer.active_coords()
    }
}
