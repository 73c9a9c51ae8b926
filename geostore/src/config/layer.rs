use crate::model::{ExtraGeometry, Layer, LayerSettings, SchemaProperty};
use geostore_geometry::GeometryType;
use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct LayerConfig {
	/// Layer identifier, used in URLs and as the MVT layer name.
	pub id: String,

	/// Display name. Defaults to `id`.
	#[serde(default)]
	pub name: Option<String>,

	/// Restricts the layer to one geometry type.
	#[serde(default)]
	pub type_geom: Option<GeometryType>,

	/// GeoJSON FeatureCollection loaded at startup, relative to the config file.
	#[serde(default)]
	pub data: Option<PathBuf>,

	#[serde(default)]
	pub settings: LayerSettings,

	#[serde(default)]
	pub schema: Vec<SchemaProperty>,

	/// Secondary geometries, served as sub-layers `{id}:{slug}`.
	#[serde(default)]
	pub extra_geometries: Vec<ExtraGeometryConfig>,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct ExtraGeometryConfig {
	pub slug: String,
	pub title: String,
	pub type_geom: GeometryType,

	/// GeoJSON FeatureCollection loaded at startup, relative to the config file.
	#[serde(default)]
	pub data: Option<PathBuf>,
}

impl ExtraGeometryConfig {
	pub fn to_extra_geometry(&self) -> ExtraGeometry {
		ExtraGeometry::new(&self.slug, &self.title, self.type_geom)
	}
}

impl LayerConfig {
	pub fn resolve_paths(&mut self, base: &Path) {
		resolve_path(&mut self.data, base);
		for extra in &mut self.extra_geometries {
			resolve_path(&mut extra.data, base);
		}
	}

	pub fn to_layer(&self) -> Layer {
		Layer {
			id: self.id.clone(),
			name: self.name.clone().unwrap_or_else(|| self.id.clone()),
			type_geom: self.type_geom,
			settings: self.settings.clone(),
			schema: self.schema.clone(),
			extra_geometries: self
				.extra_geometries
				.iter()
				.map(ExtraGeometryConfig::to_extra_geometry)
				.collect(),
		}
	}

	/// Data files to load, keyed by the id of the (sub-)layer they belong to.
	pub fn data_files(&self) -> Vec<(String, &Path)> {
		let layer = self.to_layer();
		let mut files = Vec::new();
		if let Some(data) = &self.data {
			files.push((self.id.clone(), data.as_path()));
		}
		for extra in &self.extra_geometries {
			if let Some(data) = &extra.data {
				files.push((layer.extra_layer_id(&extra.slug), data.as_path()));
			}
		}
		files
	}
}

fn resolve_path(path: &mut Option<PathBuf>, base: &Path) {
	if let Some(data) = path.as_mut()
		&& data.is_relative()
	{
		*data = base.join(&*data);
	}
}
