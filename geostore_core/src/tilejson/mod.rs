//! TileJSON 3.0.0 documents describing vector tile endpoints.
//!
//! <https://github.com/mapbox/tilejson-spec/tree/master/3.0.0>

mod vector_layer;

pub use vector_layer::VectorLayer;

use crate::{Blob, GeoBBox};
use anyhow::{Context, Result, ensure};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

pub const TILEJSON_VERSION: &str = "3.0.0";

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TileJSON {
	pub tilejson: String,
	pub name: String,
	/// Serialized as `null` when unset.
	pub attribution: Option<String>,
	/// Serialized as `null` when unset.
	pub description: Option<String>,
	pub scheme: String,
	pub format: String,
	pub minzoom: u8,
	pub maxzoom: u8,
	pub bounds: [f64; 4],
	pub center: [f64; 3],
	pub tiles: Vec<String>,
	pub vector_layers: Vec<VectorLayer>,
}

impl TileJSON {
	/// A document with the given name, whole-world bounds and zoom range 0..=22.
	#[must_use]
	pub fn new(name: &str) -> TileJSON {
		TileJSON {
			tilejson: TILEJSON_VERSION.to_string(),
			name: name.to_string(),
			attribution: None,
			description: None,
			scheme: String::from("xyz"),
			format: String::from("pbf"),
			minzoom: 0,
			maxzoom: 22,
			bounds: GeoBBox::world().as_array(),
			center: [0.0, 0.0, 0.0],
			tiles: Vec::new(),
			vector_layers: Vec::new(),
		}
	}

	/// Sets `bounds` and places `center` in the middle of them at `minzoom`.
	pub fn set_bounds(&mut self, bbox: &GeoBBox) {
		self.bounds = bbox.as_array();
		self.center = [
			(bbox.x_min + bbox.x_max) / 2.0,
			(bbox.y_min + bbox.y_max) / 2.0,
			f64::from(self.minzoom),
		];
	}

	/// Validates zoom ordering, bounds and layer id uniqueness.
	pub fn check(&self) -> Result<()> {
		ensure!(
			self.minzoom <= self.maxzoom,
			"minzoom ({}) must be <= maxzoom ({})",
			self.minzoom,
			self.maxzoom
		);
		GeoBBox::try_from(self.bounds).context("invalid bounds")?;
		let mut ids = HashSet::new();
		for layer in &self.vector_layers {
			layer.check()?;
			ensure!(ids.insert(layer.id.as_str()), "duplicate vector layer id '{}'", layer.id);
		}
		Ok(())
	}

	pub fn to_blob(&self) -> Result<Blob> {
		Ok(Blob::from(serde_json::to_vec(self).context("Failed to serialize TileJSON")?))
	}

	pub fn from_blob(blob: &Blob) -> Result<TileJSON> {
		serde_json::from_slice(blob.as_slice()).context("Failed to parse TileJSON")
	}
}
