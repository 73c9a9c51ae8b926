//! Tile generation: zoom estimation, per-layer MVT building, group composition,
//! read-through caching and TileJSON documents.

mod builder;
mod cache;
mod compositor;
mod service;
mod tilejson;
mod zoom;

pub use builder::{DEFAULT_MAX_TILE_ZOOM, TILE_SIZE, TileBuilder};
pub use cache::{TileCache, TileCacheKey};
pub use compositor::TileCompositor;
pub use service::{TileService, TileServiceOptions};
pub use tilejson::{RequestHost, TileJsonGenerator};
pub use zoom::{DEFAULT_MAXZOOM, DEFAULT_MINZOOM, MAX_GUESSED_ZOOM, guess_layer_zoom, guess_maxzoom, guess_minzoom};
