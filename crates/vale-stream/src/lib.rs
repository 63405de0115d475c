//! Tile streaming: per-tile height caching and a pooled window of active
//! tiles that follows the viewer.

mod builder;
mod cache;
mod error;
mod streamer;
mod tile;
mod view;
mod world;

pub use builder::{TileBuilder, TileRequest};
pub use cache::HeightCache;
pub use error::StreamError;
pub use streamer::{CACHE_MARGIN, StreamUpdate, TileStreamer};
pub use tile::{MAX_TILE_INDEX, Tile, TileCoord, tile_name};
pub use view::ViewSettings;
pub use world::StreamingWorld;
