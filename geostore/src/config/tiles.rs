use crate::tiles::DEFAULT_MAX_TILE_ZOOM;
use anyhow::{Context, Result, ensure};
use geostore_geometry::vector_tile::DEFAULT_EXTENT;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct TilesConfig {
	/// Highest zoom rendered with data. Deeper tiles are empty placeholders.
	pub max_zoom: u8,

	/// Public URL prefixes emitted in TileJSON `tiles`, in this order.
	/// Empty means the request's own host is used.
	pub hostnames: Vec<String>,

	/// Size of the tile coordinate space.
	pub extent: u32,
}

impl Default for TilesConfig {
	fn default() -> Self {
		TilesConfig {
			max_zoom: DEFAULT_MAX_TILE_ZOOM,
			hostnames: Vec::new(),
			extent: DEFAULT_EXTENT,
		}
	}
}

impl TilesConfig {
	/// Applies `MAX_TILE_ZOOM` and `TILE_HOSTNAMES` as returned by `lookup`.
	pub fn apply_env<F>(&mut self, lookup: F) -> Result<()>
	where
		F: Fn(&str) -> Option<String>,
	{
		if let Some(value) = lookup("MAX_TILE_ZOOM") {
			self.max_zoom = value
				.trim()
				.parse()
				.with_context(|| format!("MAX_TILE_ZOOM must be a zoom level, got '{value}'"))?;
		}
		if let Some(value) = lookup("TILE_HOSTNAMES") {
			self.hostnames = value
				.split(',')
				.map(str::trim)
				.filter(|h| !h.is_empty())
				.map(str::to_string)
				.collect();
		}
		Ok(())
	}

	pub fn check(&self) -> Result<()> {
		ensure!(self.max_zoom <= 30, "tiles.max_zoom ({}) must be <= 30", self.max_zoom);
		ensure!(self.extent > 0, "tiles.extent must be positive");
		Ok(())
	}
}
