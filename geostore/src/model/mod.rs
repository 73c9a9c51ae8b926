//! Layers, groups and the settings that drive tile generation.

mod catalog;
mod filter;
mod group;
mod layer;
mod schema;
mod target;

pub use catalog::Catalog;
pub use filter::FeatureFilter;
pub use group::LayerGroup;
pub use layer::{DEFAULT_FEATURES_LIMIT, DEFAULT_PIXEL_BUFFER, ExtraGeometry, Layer, LayerSettings, TILE_RANGE_MAX};
pub use schema::{PropertyType, SchemaProperty};
pub use target::Target;
