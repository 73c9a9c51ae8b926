//! Renders one layer of one tile.

use crate::{
	model::Layer,
	source::{FeatureQuery, GeometrySource},
};
use anyhow::{Context, Result};
use geostore_core::{Blob, TileCoord};
use geostore_geometry::{
	GeoFeature,
	tile::TilePipeline,
	vector_tile::{DEFAULT_EXTENT, VectorTile, VectorTileLayer},
};
use std::sync::Arc;

/// Screen size of a tile, used to turn pixel settings into tile units.
pub const TILE_SIZE: u32 = 256;
pub const DEFAULT_MAX_TILE_ZOOM: u8 = 22;

#[derive(Clone, Debug)]
pub struct TileBuilder {
	source: Arc<dyn GeometrySource>,
	max_tile_zoom: u8,
	extent: u32,
}

impl TileBuilder {
	pub fn new(source: Arc<dyn GeometrySource>) -> TileBuilder {
		TileBuilder {
			source,
			max_tile_zoom: DEFAULT_MAX_TILE_ZOOM,
			extent: DEFAULT_EXTENT,
		}
	}

	/// Global ceiling; no tile above this zoom queries the source.
	pub fn with_max_tile_zoom(mut self, max_tile_zoom: u8) -> TileBuilder {
		self.max_tile_zoom = max_tile_zoom;
		self
	}

	pub fn with_extent(mut self, extent: u32) -> TileBuilder {
		self.extent = extent;
		self
	}

	pub fn max_tile_zoom(&self) -> u8 {
		self.max_tile_zoom
	}

	pub fn extent(&self) -> u32 {
		self.extent
	}

	/// `false` if `coord` is above the ceiling or outside the layer's zoom range.
	pub fn renders(&self, layer: &Layer, coord: &TileCoord) -> bool {
		coord.level <= self.max_tile_zoom && layer.settings.tile_zoom_range().contains(&coord.level)
	}

	/// Encodes the features of `layer` that reach into `coord`.
	///
	/// `Ok(None)` when the zoom is out of range. A layer without surviving features is `Ok(Some(empty))`.
	/// Malformed stored geometry is skipped with a warning; source failures are returned.
	pub async fn build_layer(&self, layer: &Layer, coord: TileCoord) -> Result<Option<VectorTileLayer>> {
		if !self.renders(layer, &coord) {
			log::trace!("layer '{}' is not rendered at {coord}", layer.id);
			return Ok(None);
		}

		let settings = &layer.settings;
		let pixel_buffer = f64::from(settings.pixel_buffer);

		let query = FeatureQuery::new(&layer.id, coord.to_geo_bbox_buffered(pixel_buffer, TILE_SIZE))
			.with_filter(settings.features_filter.clone())
			.with_limit(settings.features_limit);
		let features = self
			.source
			.query_by_bbox(&query)
			.await
			.with_context(|| format!("Failed to query features of layer '{}' for tile {coord}", layer.id))?;

		let pipeline = TilePipeline::new(coord, self.extent, pixel_buffer);
		let mut prepared: Vec<GeoFeature> = Vec::with_capacity(features.len());

		for mut feature in features {
			let geometry = match pipeline.prepare(&feature.geometry) {
				Ok(Some(geometry)) => geometry,
				Ok(None) => continue,
				Err(err) => {
					log::warn!("skipping malformed feature {:?} of layer '{}': {err:#}", feature.id, layer.id);
					continue;
				}
			};
			feature.geometry = geometry;
			if let Some(allowed) = &settings.properties_filter {
				feature.properties.retain_keys(allowed);
			}
			prepared.push(feature);
		}

		let vector_layer = VectorTileLayer::from_features(&layer.id, prepared, self.extent)
			.with_context(|| format!("Failed to encode layer '{}' for tile {coord}", layer.id))?;
		log::trace!("layer '{}' at {coord}: {} features", layer.id, vector_layer.features.len());
		Ok(Some(vector_layer))
	}

	/// One layer as a complete tile. Empty when nothing survives.
	pub async fn build_tile(&self, layer: &Layer, coord: TileCoord) -> Result<Blob> {
		match self.build_layer(layer, coord).await? {
			Some(vector_layer) if !vector_layer.is_empty() => VectorTile::new(vec![vector_layer]).to_blob(),
			_ => Ok(Blob::new_empty()),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::{model::LayerSettings, source::InMemorySource};
	use geo::{Geometry, LineString, line_string, point};
	use geostore_geometry::GeoValue;
	use pretty_assertions::assert_eq;

	const TOULOUSE: [(f64, f64); 2] = [(1.3700294494628906, 43.603640347220924), (1.2984466552734375, 43.57902295875415)];

	fn toulouse_line() -> GeoFeature {
		let mut feature = GeoFeature::new(Geometry::LineString(LineString::from(TOULOUSE.to_vec())));
		feature.set_property("foo", "bar");
		feature.set_property("baba", "fifi");
		feature
	}

	fn setup(settings: LayerSettings) -> (Arc<InMemorySource>, Layer) {
		let layer = Layer::new("layerLine", "layerLine").with_settings(settings);
		let source = Arc::new(InMemorySource::new());
		source.register_layer(&layer).unwrap();
		source.insert_feature("layerLine", toulouse_line()).unwrap();
		(source, layer)
	}

	fn coord(z: u8, x: u32, y: u32) -> TileCoord {
		TileCoord::new(z, x, y).unwrap()
	}

	#[tokio::test]
	async fn builds_the_line() -> Result<()> {
		let (source, layer) = setup(LayerSettings::default());
		let builder = TileBuilder::new(source.clone());

		let vector_layer = builder.build_layer(&layer, coord(10, 515, 373)).await?.unwrap();
		assert_eq!(vector_layer.name, "layerLine");
		assert_eq!(vector_layer.features.len(), 1);

		let features = vector_layer.to_features()?;
		assert_eq!(features[0].properties.get("foo"), Some(&GeoValue::from("bar")));
		assert_eq!(features[0].properties.len(), 2);
		assert_eq!(source.query_count(), 1);
		Ok(())
	}

	#[tokio::test]
	async fn builds_at_high_zoom() -> Result<()> {
		let (source, layer) = setup(LayerSettings::default());
		let blob = TileBuilder::new(source).build_tile(&layer, coord(15, 16506, 11966)).await?;
		assert!(!blob.is_empty());
		Ok(())
	}

	#[tokio::test]
	async fn empty_tile_is_zero_bytes() -> Result<()> {
		let (source, layer) = setup(LayerSettings::default());
		let builder = TileBuilder::new(source);
		assert!(builder.build_tile(&layer, coord(10, 1, 1)).await?.is_empty());
		assert!(builder.build_layer(&layer, coord(10, 1, 1)).await?.unwrap().is_empty());
		Ok(())
	}

	#[tokio::test]
	async fn idempotent() -> Result<()> {
		let (source, layer) = setup(LayerSettings::default());
		let builder = TileBuilder::new(source);
		let a = builder.build_tile(&layer, coord(10, 515, 373)).await?;
		let b = builder.build_tile(&layer, coord(10, 515, 373)).await?;
		assert!(!a.is_empty());
		assert_eq!(a, b);
		Ok(())
	}

	#[tokio::test]
	async fn out_of_range_zoom_skips_the_source() -> Result<()> {
		let settings = LayerSettings {
			minzoom: Some(11),
			maxzoom: Some(14),
			..LayerSettings::default()
		};
		let (source, layer) = setup(settings);
		let builder = TileBuilder::new(source.clone());

		assert!(builder.build_layer(&layer, coord(10, 515, 373)).await?.is_none());
		assert!(builder.build_tile(&layer, coord(15, 16506, 11966)).await?.is_empty());

		let ceiling = TileBuilder::new(source.clone()).with_max_tile_zoom(9);
		assert!(ceiling.build_tile(&Layer::new("layerLine", "x"), coord(10, 515, 373)).await?.is_empty());
		assert_eq!(source.query_count(), 0);
		Ok(())
	}

	#[tokio::test]
	async fn properties_filter_drops_keys() -> Result<()> {
		let settings = LayerSettings {
			properties_filter: Some(vec![String::from("foo")]),
			..LayerSettings::default()
		};
		let (source, layer) = setup(settings);
		let vector_layer = TileBuilder::new(source).build_layer(&layer, coord(10, 515, 373)).await?.unwrap();
		let features = vector_layer.to_features()?;
		assert_eq!(features[0].properties.len(), 1);
		assert!(features[0].properties.contains_key("foo"));
		Ok(())
	}

	#[tokio::test]
	async fn features_limit_keeps_lowest_ids() -> Result<()> {
		let settings = LayerSettings {
			features_limit: 2,
			..LayerSettings::default()
		};
		let (source, layer) = setup(settings);
		for _ in 0..3 {
			source.insert_feature("layerLine", toulouse_line())?;
		}
		let vector_layer = TileBuilder::new(source).build_layer(&layer, coord(10, 515, 373)).await?.unwrap();
		let ids: Vec<Option<u64>> = vector_layer.features.iter().map(|f| f.id).collect();
		assert_eq!(ids, vec![Some(1), Some(2)]);
		Ok(())
	}

	#[tokio::test]
	async fn malformed_geometry_is_skipped() -> Result<()> {
		let (source, layer) = setup(LayerSettings::default());
		let broken = GeoFeature::new(Geometry::LineString(line_string![(x: 1.33, y: 43.59)]));
		source.insert_feature("layerLine", broken)?;
		source.insert_feature("layerLine", GeoFeature::new(Geometry::Point(point!(x: 1.33, y: 43.59))))?;

		let vector_layer = TileBuilder::new(source).build_layer(&layer, coord(10, 515, 373)).await?.unwrap();
		let ids: Vec<Option<u64>> = vector_layer.features.iter().map(|f| f.id).collect();
		assert_eq!(ids, vec![Some(1), Some(3)]);
		Ok(())
	}
}
