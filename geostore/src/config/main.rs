use super::{CacheConfig, LayerConfig, ServerConfig, TilesConfig};
use crate::{
	model::{Catalog, LayerGroup},
	source::InMemorySource,
	tiles::{TileService, TileServiceOptions},
};
use anyhow::{Context, Result};
use serde::Deserialize;
use std::{
	fs::File,
	io::{BufReader, Read},
	path::Path,
	sync::Arc,
};

#[derive(Default, Debug, Clone, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct Config {
	/// HTTP server configuration
	#[serde(default)]
	pub server: ServerConfig,

	/// Tile generation settings
	#[serde(default)]
	pub tiles: TilesConfig,

	/// Tile and TileJSON cache
	#[serde(default)]
	pub cache: CacheConfig,

	#[serde(default)]
	pub layers: Vec<LayerConfig>,

	#[serde(default)]
	pub groups: Vec<LayerGroup>,
}

impl Config {
	pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
		Ok(serde_yaml_ng::from_reader(reader)?)
	}

	pub fn from_string(text: &str) -> Result<Self> {
		Ok(serde_yaml_ng::from_str(text)?)
	}

	/// Parse from a file path and resolve layer `data` paths relative to that file.
	pub fn from_path(path: &Path) -> Result<Self> {
		let file = File::open(path).with_context(|| format!("Failed to open config {path:?}"))?;
		let mut cfg = Config::from_reader(BufReader::new(file)).with_context(|| format!("Failed to parse config {path:?}"))?;

		cfg.resolve_paths(path.parent().unwrap_or(Path::new(".")));
		Ok(cfg)
	}

	pub fn resolve_paths(&mut self, base: &Path) {
		for layer in &mut self.layers {
			layer.resolve_paths(base);
		}
	}

	/// Applies `MAX_TILE_ZOOM` and `TILE_HOSTNAMES` from the process environment.
	pub fn apply_env(&mut self) -> Result<()> {
		self.apply_env_with(|key| std::env::var(key).ok())
	}

	pub fn apply_env_with<F>(&mut self, lookup: F) -> Result<()>
	where
		F: Fn(&str) -> Option<String>,
	{
		self.tiles.apply_env(lookup)
	}

	/// Layers and groups, checked for duplicates and dangling references.
	pub fn catalog(&self) -> Result<Catalog> {
		let mut catalog = Catalog::new();
		for layer in &self.layers {
			catalog.add_layer(layer.to_layer())?;
		}
		for group in &self.groups {
			catalog.add_group(group.clone())?;
		}
		Ok(catalog)
	}

	/// An in-memory source with every configured layer registered and its data file loaded.
	pub fn load_source(&self) -> Result<Arc<InMemorySource>> {
		let source = InMemorySource::new();
		for layer in &self.layers {
			source.register_layer(&layer.to_layer())?;
			for (layer_id, data) in layer.data_files() {
				source.load_geojson_path(&layer_id, data)?;
			}
		}
		Ok(Arc::new(source))
	}

	pub fn service_options(&self) -> TileServiceOptions {
		TileServiceOptions {
			max_tile_zoom: self.tiles.max_zoom,
			extent: self.tiles.extent,
			hostnames: self.tiles.hostnames.clone(),
			ttl: self.cache.ttl(),
		}
	}

	pub fn build_service(&self) -> Result<TileService> {
		self.tiles.check()?;
		let catalog = self.catalog()?;
		let source = self.load_source()?;
		Ok(TileService::new(
			catalog,
			source,
			self.cache.build_backend(),
			self.service_options(),
		))
	}
}
