//! Mapbox Vector Tile (MVT 2.1) encoding.
//!
//! - [`VectorTile`]: top-level container of layers.
//! - [`VectorTileLayer`]: one named layer with its key/value tables and features.
//! - [`VectorTileFeature`]: compact geometry commands plus tag indices.
//!
//! Geometries handed to the encoder must already be in tile-local coordinates;
//! see [`crate::tile`] for the projection pipeline.

mod feature;
mod geometry_type;
mod layer;
mod property_manager;
mod tile;
mod value;

pub use feature::{VectorTileFeature, ring_area};
pub use geometry_type::GeomType;
pub use layer::{DEFAULT_EXTENT, MVT_VERSION, VectorTileLayer};
pub use tile::VectorTile;
