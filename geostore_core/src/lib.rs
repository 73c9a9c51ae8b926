//! Contains binary primitives, tile coordinates, bounding boxes, the cache port and the TileJSON document.

pub mod cache;

pub mod io;

pub mod tilejson;

mod types;
pub use types::*;
