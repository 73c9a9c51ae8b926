//! Server configuration, read from a YAML file.
//!
//! - [`Config`]: top-level document, environment overrides and wiring into a [`TileService`](crate::tiles::TileService)
//! - [`ServerConfig`]: bind address
//! - [`TilesConfig`]: zoom ceiling, tile extent and public hostnames
//! - [`CacheConfig`]: cache backend and TTL
//! - [`LayerConfig`]: one layer with its settings, schema and optional GeoJSON data file

mod cache;
mod layer;
mod main;
mod server;
mod tiles;

pub use cache::{CacheBackendKind, CacheConfig};
pub use layer::{ExtraGeometryConfig, LayerConfig};
pub use main::Config;
pub use server::ServerConfig;
pub use tiles::TilesConfig;
