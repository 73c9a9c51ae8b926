use super::TileBuilder;
use crate::model::Layer;
use anyhow::Result;
use futures::future::try_join_all;
use geostore_core::{Blob, TileCoord};
use geostore_geometry::vector_tile::{VectorTile, VectorTileLayer};

/// Merges the layers of a group into one tile.
#[derive(Clone, Debug)]
pub struct TileCompositor {
	builder: TileBuilder,
}

impl TileCompositor {
	pub fn new(builder: TileBuilder) -> TileCompositor {
		TileCompositor { builder }
	}

	pub fn builder(&self) -> &TileBuilder {
		&self.builder
	}

	/// Builds every layer and concatenates those with features, in the given order.
	///
	/// Above the global zoom ceiling the result is a placeholder carrying one empty layer per
	/// input layer. Otherwise a tile without any features is zero bytes long.
	pub async fn build_composite_tile(&self, layers: &[&Layer], coord: TileCoord) -> Result<Blob> {
		if coord.level > self.builder.max_tile_zoom() {
			log::debug!("{coord} is above the zoom ceiling {}", self.builder.max_tile_zoom());
			return self.placeholder_tile(layers);
		}

		let built = try_join_all(layers.iter().map(|layer| self.builder.build_layer(layer, coord))).await?;

		let tile = VectorTile::new(built.into_iter().flatten().filter(|layer| !layer.is_empty()).collect());
		if tile.layers.is_empty() {
			return Ok(Blob::new_empty());
		}
		tile.to_blob()
	}

	/// One empty layer per input layer, as served above the zoom ceiling.
	pub fn placeholder_tile(&self, layers: &[&Layer]) -> Result<Blob> {
		let mut tile = VectorTile::default();
		for layer in layers {
			let mut empty = VectorTileLayer::new_standard(&layer.id);
			empty.extent = self.builder.extent();
			tile.layers.push(empty);
		}
		tile.to_blob()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::{model::LayerSettings, source::InMemorySource};
	use geo::{Geometry, LineString, point};
	use geostore_geometry::GeoFeature;
	use pretty_assertions::assert_eq;
	use std::sync::Arc;

	struct Fixture {
		source: Arc<InMemorySource>,
		line: Layer,
		points: Layer,
		empty: Layer,
	}

	fn fixture() -> Fixture {
		let source = Arc::new(InMemorySource::new());
		let line = Layer::new("layerLine", "Line");
		let points = Layer::new("layerPoint", "Points");
		let empty = Layer::new("layerEmpty", "Empty");
		for layer in [&line, &points, &empty] {
			source.register_layer(layer).unwrap();
		}
		source
			.insert_feature(
				"layerLine",
				GeoFeature::new(Geometry::LineString(LineString::from(vec![
					(1.3700294494628906, 43.603640347220924),
					(1.2984466552734375, 43.57902295875415),
				]))),
			)
			.unwrap();
		source
			.insert_feature("layerPoint", GeoFeature::new(Geometry::Point(point!(x: 1.33, y: 43.59))))
			.unwrap();
		Fixture {
			source,
			line,
			points,
			empty,
		}
	}

	fn coord(z: u8, x: u32, y: u32) -> TileCoord {
		TileCoord::new(z, x, y).unwrap()
	}

	#[tokio::test]
	async fn keeps_order_and_omits_empty_layers() -> Result<()> {
		let f = fixture();
		let compositor = TileCompositor::new(TileBuilder::new(f.source.clone()));

		let blob = compositor
			.build_composite_tile(&[&f.points, &f.empty, &f.line], coord(10, 515, 373))
			.await?;
		let tile = VectorTile::from_blob(&blob)?;
		let names: Vec<&str> = tile.layers.iter().map(|l| l.name.as_str()).collect();
		assert_eq!(names, vec!["layerPoint", "layerLine"]);
		Ok(())
	}

	#[tokio::test]
	async fn equals_concatenated_single_layer_tiles() -> Result<()> {
		let f = fixture();
		let builder = TileBuilder::new(f.source.clone());
		let compositor = TileCompositor::new(builder.clone());
		let c = coord(10, 515, 373);

		let mut expected = builder.build_tile(&f.line, c).await?;
		expected.append(&builder.build_tile(&f.points, c).await?);
		assert_eq!(compositor.build_composite_tile(&[&f.line, &f.points], c).await?, expected);
		Ok(())
	}

	#[tokio::test]
	async fn nothing_here_is_zero_bytes() -> Result<()> {
		let f = fixture();
		let compositor = TileCompositor::new(TileBuilder::new(f.source.clone()));
		let blob = compositor.build_composite_tile(&[&f.line, &f.points], coord(10, 1, 1)).await?;
		assert!(blob.is_empty());
		Ok(())
	}

	#[tokio::test]
	async fn placeholder_above_ceiling() -> Result<()> {
		let f = fixture();
		let compositor = TileCompositor::new(TileBuilder::new(f.source.clone()).with_max_tile_zoom(9));

		let blob = compositor.build_composite_tile(&[&f.line, &f.empty], coord(10, 515, 373)).await?;
		let tile = VectorTile::from_blob(&blob)?;
		assert_eq!(tile.layers.len(), 2);
		assert!(tile.layers.iter().all(VectorTileLayer::is_empty));
		assert_eq!(tile.layers[0].name, "layerLine");
		assert_eq!(f.source.query_count(), 0);

		let again = compositor.build_composite_tile(&[&f.line, &f.empty], coord(12, 2063, 1495)).await?;
		assert_eq!(again.len(), blob.len());
		Ok(())
	}

	#[tokio::test]
	async fn layer_zoom_ranges_apply_per_layer() -> Result<()> {
		let f = fixture();
		let high_only = f.points.clone().with_settings(LayerSettings {
			minzoom: Some(12),
			..LayerSettings::default()
		});
		let compositor = TileCompositor::new(TileBuilder::new(f.source.clone()));
		let tile = VectorTile::from_blob(
			&compositor
				.build_composite_tile(&[&f.line, &high_only], coord(10, 515, 373))
				.await?,
		)?;
		assert_eq!(tile.layers.len(), 1);
		assert_eq!(tile.layers[0].name, "layerLine");
		Ok(())
	}
}
