//! # geostore
//!
//! Serves Mapbox Vector Tiles rendered on the fly from stored features, together with the
//! TileJSON documents that describe them.
//!
//! Layers hold features. Groups combine several layers into one composite tile.
//! Every tile is built by querying the features that touch the tile, projecting them into
//! tile space, clipping, simplifying and encoding them. The result is cached under a key that
//! changes whenever the data of a constituent layer changes.
//!
//! ## Usage Example
//!
//! ```rust
//! use geostore::{config::Config, model::Target};
//! use geostore::core::TileCoord;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::from_path(std::path::Path::new("../testdata/config.yml"))?;
//!     let service = config.build_service()?;
//!
//!     let tile = service
//!         .tile(&Target::Layer(String::from("layerLine")), TileCoord::new(10, 515, 373)?, None)
//!         .await?;
//!     assert!(!tile.is_empty());
//!     Ok(())
//! }
//! ```

pub mod config;
mod error;
pub mod model;
pub mod server;
pub mod source;
pub mod tiles;

pub use error::GeostoreError;
pub use geostore_core as core;
pub use geostore_geometry as geometry;
