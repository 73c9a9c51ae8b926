//! Geographic features and their path into Mapbox Vector Tiles.

mod geo;
pub mod tile;
pub mod vector_tile;

pub use geo::*;
