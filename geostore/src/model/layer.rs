use super::{FeatureFilter, SchemaProperty};
use geostore_geometry::GeometryType;
use serde::{Deserialize, Deserializer};
use std::ops::RangeInclusive;

pub const DEFAULT_PIXEL_BUFFER: u32 = 4;
pub const DEFAULT_FEATURES_LIMIT: usize = 10_000;
/// Highest zoom a layer renders when it has no `maxzoom` of its own.
pub const TILE_RANGE_MAX: u8 = 22;

/// Rendering settings of one layer. Every field has a default.
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct LayerSettings {
	pub attribution: Option<String>,
	pub description: Option<String>,
	pub minzoom: Option<u8>,
	pub maxzoom: Option<u8>,
	/// Margin around each tile in 256 px screen pixels.
	pub pixel_buffer: u32,
	pub features_filter: Option<FeatureFilter>,
	/// Allow-list of property keys. A single string is read as a one-element list.
	#[serde(deserialize_with = "string_or_list")]
	pub properties_filter: Option<Vec<String>>,
	pub features_limit: usize,
}

impl Default for LayerSettings {
	fn default() -> Self {
		LayerSettings {
			attribution: None,
			description: None,
			minzoom: None,
			maxzoom: None,
			pixel_buffer: DEFAULT_PIXEL_BUFFER,
			features_filter: None,
			properties_filter: None,
			features_limit: DEFAULT_FEATURES_LIMIT,
		}
	}
}

impl LayerSettings {
	/// Zoom levels at which tiles of this layer contain data.
	pub fn tile_zoom_range(&self) -> RangeInclusive<u8> {
		self.minzoom.unwrap_or(0)..=self.maxzoom.unwrap_or(TILE_RANGE_MAX)
	}
}

fn string_or_list<'de, D>(deserializer: D) -> Result<Option<Vec<String>>, D::Error>
where
	D: Deserializer<'de>,
{
	#[derive(Deserialize)]
	#[serde(untagged)]
	enum StringOrList {
		One(String),
		Many(Vec<String>),
	}

	Ok(Option::<StringOrList>::deserialize(deserializer)?.map(|v| match v {
		StringOrList::One(key) => vec![key],
		StringOrList::Many(keys) => keys,
	}))
}

/// A secondary geometry kind attached to a layer, e.g. the footprint of a point of interest.
///
/// Its features are stored and served as a sub-layer of their own, named `{layer}:{slug}`.
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct ExtraGeometry {
	pub slug: String,
	pub title: String,
	pub type_geom: GeometryType,
}

impl ExtraGeometry {
	pub fn new(slug: &str, title: &str, type_geom: GeometryType) -> ExtraGeometry {
		ExtraGeometry {
			slug: slug.to_string(),
			title: title.to_string(),
			type_geom,
		}
	}
}

/// A named collection of features. `id` doubles as the MVT layer name.
#[derive(Clone, Debug, PartialEq)]
pub struct Layer {
	pub id: String,
	pub name: String,
	pub type_geom: Option<GeometryType>,
	pub settings: LayerSettings,
	pub schema: Vec<SchemaProperty>,
	pub extra_geometries: Vec<ExtraGeometry>,
}

impl Layer {
	pub fn new(id: &str, name: &str) -> Layer {
		Layer {
			id: id.to_string(),
			name: name.to_string(),
			type_geom: None,
			settings: LayerSettings::default(),
			schema: Vec::new(),
			extra_geometries: Vec::new(),
		}
	}

	pub fn with_type_geom(mut self, type_geom: GeometryType) -> Layer {
		self.type_geom = Some(type_geom);
		self
	}

	pub fn with_settings(mut self, settings: LayerSettings) -> Layer {
		self.settings = settings;
		self
	}

	pub fn with_schema(mut self, schema: Vec<SchemaProperty>) -> Layer {
		self.schema = schema;
		self
	}

	pub fn with_extra_geometry(mut self, extra: ExtraGeometry) -> Layer {
		self.extra_geometries.push(extra);
		self
	}

	pub fn extra_layer_id(&self, slug: &str) -> String {
		format!("{}:{slug}", self.id)
	}

	/// One sub-layer per extra geometry, in declaration order.
	///
	/// Sub-layers share the zoom range, buffer, limit and attribution of this layer, but not its
	/// filters or schema. The title becomes the TileJSON description.
	pub fn extra_layers(&self) -> Vec<Layer> {
		self
			.extra_geometries
			.iter()
			.map(|extra| Layer {
				id: self.extra_layer_id(&extra.slug),
				name: extra.title.clone(),
				type_geom: Some(extra.type_geom),
				settings: LayerSettings {
					description: Some(extra.title.clone()),
					features_filter: None,
					properties_filter: None,
					..self.settings.clone()
				},
				schema: Vec::new(),
				extra_geometries: Vec::new(),
			})
			.collect()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use pretty_assertions::assert_eq;

	#[test]
	fn defaults() {
		let settings: LayerSettings = serde_yaml_ng::from_str("{}").unwrap();
		assert_eq!(settings, LayerSettings::default());
		assert_eq!(settings.pixel_buffer, 4);
		assert_eq!(settings.features_limit, 10_000);
		assert_eq!(settings.tile_zoom_range(), 0..=22);
	}

	#[test]
	fn properties_filter_string_or_list() {
		let one: LayerSettings = serde_yaml_ng::from_str("properties_filter: Test").unwrap();
		assert_eq!(one.properties_filter, Some(vec![String::from("Test")]));

		let many: LayerSettings = serde_yaml_ng::from_str("properties_filter: [foo, baba]").unwrap();
		assert_eq!(many.properties_filter, Some(vec![String::from("foo"), String::from("baba")]));

		let none: LayerSettings = serde_yaml_ng::from_str("properties_filter: null").unwrap();
		assert_eq!(none.properties_filter, None);
	}

	#[test]
	fn zoom_range_overrides() {
		let settings: LayerSettings = serde_yaml_ng::from_str("{minzoom: 4, maxzoom: 12}").unwrap();
		assert_eq!(settings.tile_zoom_range(), 4..=12);
	}

	#[test]
	fn extra_geometries_become_sub_layers() {
		let settings: LayerSettings =
			serde_yaml_ng::from_str("{attribution: plop, maxzoom: 16, properties_filter: [name], pixel_buffer: 8}").unwrap();
		let layer = Layer::new("pois", "POIs")
			.with_type_geom(GeometryType::Point)
			.with_settings(settings)
			.with_schema(vec![SchemaProperty::new("name", crate::model::PropertyType::String)])
			.with_extra_geometry(ExtraGeometry::new("footprint", "Building footprint", GeometryType::Polygon));

		let extras = layer.extra_layers();
		assert_eq!(extras.len(), 1);
		let extra = &extras[0];
		assert_eq!(extra.id, "pois:footprint");
		assert_eq!(extra.name, "Building footprint");
		assert_eq!(extra.type_geom, Some(GeometryType::Polygon));
		assert_eq!(extra.settings.attribution.as_deref(), Some("plop"));
		assert_eq!(extra.settings.description.as_deref(), Some("Building footprint"));
		assert_eq!(extra.settings.tile_zoom_range(), 0..=16);
		assert_eq!(extra.settings.pixel_buffer, 8);
		assert_eq!(extra.settings.properties_filter, None);
		assert!(extra.schema.is_empty());
		assert!(extra.extra_layers().is_empty());
	}

	#[test]
	fn unknown_keys_are_rejected() {
		assert!(serde_yaml_ng::from_str::<LayerSettings>("pixel_bufer: 3").is_err());
	}
}
