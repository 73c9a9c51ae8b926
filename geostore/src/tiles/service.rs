use super::{
	DEFAULT_MAX_TILE_ZOOM, RequestHost, TileBuilder, TileCache, TileCacheKey, TileCompositor, TileJsonGenerator,
};
use crate::{
	model::{Catalog, Layer, Target},
	source::GeometrySource,
};
use anyhow::Result;
use futures::future::try_join_all;
use geostore_core::{Blob, TileCoord, cache::CacheBackend, tilejson::TileJSON};
use geostore_geometry::vector_tile::DEFAULT_EXTENT;
use std::{sync::Arc, time::Duration};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TileServiceOptions {
	pub max_tile_zoom: u8,
	pub extent: u32,
	pub hostnames: Vec<String>,
	pub ttl: Option<Duration>,
}

impl Default for TileServiceOptions {
	fn default() -> Self {
		TileServiceOptions {
			max_tile_zoom: DEFAULT_MAX_TILE_ZOOM,
			extent: DEFAULT_EXTENT,
			hostnames: Vec::new(),
			ttl: None,
		}
	}
}

/// Cached tiles and TileJSON documents for every layer and group of a catalog.
#[derive(Clone, Debug)]
pub struct TileService {
	catalog: Arc<Catalog>,
	source: Arc<dyn GeometrySource>,
	compositor: TileCompositor,
	cache: TileCache,
	tilejson: TileJsonGenerator,
}

impl TileService {
	pub fn new(
		catalog: Catalog,
		source: Arc<dyn GeometrySource>,
		backend: Arc<dyn CacheBackend>,
		options: TileServiceOptions,
	) -> TileService {
		let catalog = Arc::new(catalog);
		let builder = TileBuilder::new(source.clone())
			.with_max_tile_zoom(options.max_tile_zoom)
			.with_extent(options.extent);
		let tilejson = TileJsonGenerator::new(catalog.clone(), source.clone(), options.max_tile_zoom)
			.with_hostnames(options.hostnames);

		TileService {
			catalog,
			source,
			compositor: TileCompositor::new(builder),
			cache: TileCache::new(backend, options.ttl),
			tilejson,
		}
	}

	pub fn catalog(&self) -> &Catalog {
		&self.catalog
	}

	/// Tile bytes of a layer or group. Zero bytes when nothing intersects the tile.
	pub async fn tile(&self, target: &Target, coord: TileCoord, token: Option<&str>) -> Result<Blob> {
		log::debug!("tile {target} {coord}");
		let layers = self.catalog.resolve(target)?;
		let versions = self.versions(&layers).await?;
		let key = TileCacheKey::tile(&target.scope(), &versions, token, &coord);

		self
			.cache
			.get_or_build(&key, self.compositor.build_composite_tile(&layers, coord))
			.await
	}

	/// Placeholder of a layer or group for levels that exceed the zoom ceiling, even those no
	/// [`TileCoord`] can represent.
	pub fn tile_above_ceiling(&self, target: &Target, level: u64) -> Result<Blob> {
		log::debug!("tile {target} at level {level} is above the zoom ceiling {}", self.max_tile_zoom());
		let layers = self.catalog.resolve(target)?;
		self.compositor.placeholder_tile(&layers)
	}

	pub fn max_tile_zoom(&self) -> u8 {
		self.compositor.builder().max_tile_zoom()
	}

	pub async fn tilejson(&self, target: &Target, host: &RequestHost, token: Option<&str>) -> Result<TileJSON> {
		log::debug!("tilejson {target}");
		let layers = self.catalog.resolve(target)?;
		let versions = self.versions(&layers).await?;
		let base_urls = self.tilejson.base_urls(host)?;
		let key = TileCacheKey::tilejson(&target.scope(), &versions, token, &base_urls);

		self
			.cache
			.get_or_build_json(&key, self.tilejson.build_tilejson(target, host))
			.await
	}

	async fn versions(&self, layers: &[&Layer]) -> Result<Vec<u64>> {
		try_join_all(layers.iter().map(|layer| self.source.layer_version(&layer.id))).await
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::{
		GeostoreError,
		model::{LayerGroup, LayerSettings},
		source::InMemorySource,
	};
	use geo::{Geometry, LineString};
	use geostore_core::cache::{MemoryCache, NoCache};
	use geostore_geometry::GeoFeature;
	use pretty_assertions::assert_eq;

	fn toulouse() -> GeoFeature {
		GeoFeature::new(Geometry::LineString(LineString::from(vec![
			(1.3700294494628906, 43.603640347220924),
			(1.2984466552734375, 43.57902295875415),
		])))
	}

	fn service(backend: Arc<dyn CacheBackend>, options: TileServiceOptions) -> (TileService, Arc<InMemorySource>) {
		let source = Arc::new(InMemorySource::new());
		let mut catalog = Catalog::new();
		for id in ["layerLine", "layerEmpty"] {
			let layer = Layer::new(id, id).with_settings(LayerSettings {
				attribution: Some(String::from("plop")),
				..LayerSettings::default()
			});
			source.register_layer(&layer).unwrap();
			catalog.add_layer(layer).unwrap();
		}
		catalog.add_group(LayerGroup::new("mygroup", &["layerLine", "layerEmpty"])).unwrap();
		source.insert_feature("layerLine", toulouse()).unwrap();
		(TileService::new(catalog, source.clone(), backend, options), source)
	}

	fn line() -> Target {
		Target::Layer(String::from("layerLine"))
	}

	#[tokio::test]
	async fn second_request_is_served_from_cache() -> Result<()> {
		let (service, source) = service(Arc::new(MemoryCache::new(100)), TileServiceOptions::default());
		let coord = TileCoord::new(10, 515, 373)?;

		let first = service.tile(&line(), coord, None).await?;
		let queries = source.query_count();
		let second = service.tile(&line(), coord, None).await?;

		assert!(!first.is_empty());
		assert_eq!(first, second);
		assert_eq!(source.query_count(), queries);
		Ok(())
	}

	#[tokio::test]
	async fn token_and_data_change_bypass_cache() -> Result<()> {
		let (service, source) = service(Arc::new(MemoryCache::new(100)), TileServiceOptions::default());
		let coord = TileCoord::new(10, 515, 373)?;

		service.tile(&line(), coord, None).await?;
		let queries = source.query_count();

		service.tile(&line(), coord, Some("reimport")).await?;
		assert_eq!(source.query_count(), queries + 1);

		source.insert_feature("layerLine", toulouse())?;
		service.tile(&line(), coord, Some("reimport")).await?;
		assert_eq!(source.query_count(), queries + 2);
		Ok(())
	}

	#[tokio::test]
	async fn without_cache_every_request_queries() -> Result<()> {
		let (service, source) = service(Arc::new(NoCache), TileServiceOptions::default());
		let coord = TileCoord::new(10, 515, 373)?;
		service.tile(&line(), coord, None).await?;
		service.tile(&line(), coord, None).await?;
		assert_eq!(source.query_count(), 2);
		Ok(())
	}

	#[tokio::test]
	async fn group_tile_and_ceiling() -> Result<()> {
		let options = TileServiceOptions {
			max_tile_zoom: 9,
			..TileServiceOptions::default()
		};
		let (service, source) = service(Arc::new(NoCache), options);
		let group = Target::Group(String::from("mygroup"));

		let placeholder = service.tile(&group, TileCoord::new(10, 515, 373)?, None).await?;
		assert!(!placeholder.is_empty());
		assert!(placeholder.len() < 64);
		assert_eq!(source.query_count(), 0);

		let empty = service.tile(&group, TileCoord::new(9, 1, 1)?, None).await?;
		assert!(empty.is_empty());

		assert_eq!(service.max_tile_zoom(), 9);
		assert_eq!(service.tile_above_ceiling(&group, 40)?, placeholder);
		assert_eq!(source.query_count(), 0);
		assert!(service.tile_above_ceiling(&Target::Group(String::from("nope")), 40).is_err());
		Ok(())
	}

	#[tokio::test]
	async fn tilejson_is_cached_per_base_url() -> Result<()> {
		let (service, _) = service(Arc::new(MemoryCache::new(100)), TileServiceOptions::default());

		let a = service.tilejson(&line(), &RequestHost::new("http", Some("localhost")), None).await?;
		let b = service.tilejson(&line(), &RequestHost::new("https", Some("tiles.example.com")), None).await?;

		assert_eq!(a.tiles, vec!["http://localhost/layer/layerLine/tile/{z}/{x}/{y}.pbf"]);
		assert_eq!(b.tiles, vec!["https://tiles.example.com/layer/layerLine/tile/{z}/{x}/{y}.pbf"]);
		Ok(())
	}

	#[tokio::test]
	async fn unknown_target() {
		let (service, _) = service(Arc::new(NoCache), TileServiceOptions::default());
		let err = service
			.tile(&Target::Layer(String::from("nope")), TileCoord::new(0, 0, 0).unwrap(), None)
			.await
			.unwrap_err();
		assert_eq!(GeostoreError::find(&err), Some(&GeostoreError::not_found("layer", "nope")));
	}
}
