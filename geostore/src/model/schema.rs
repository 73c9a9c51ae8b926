use crate::GeostoreError;
use anyhow::Result;
use geostore_geometry::GeoValue;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

#[derive(Clone, Copy, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum PropertyType {
	String,
	Number,
	Integer,
	Boolean,
	Array,
	Object,
}

impl PropertyType {
	/// Type name as written into TileJSON `fields`.
	///
	/// Arrays and objects have no MVT value, so they never reach a tile and have no field type.
	pub fn tilejson_type(self) -> Option<&'static str> {
		match self {
			PropertyType::String => Some("String"),
			PropertyType::Number | PropertyType::Integer => Some("Number"),
			PropertyType::Boolean => Some("Boolean"),
			PropertyType::Array | PropertyType::Object => None,
		}
	}

	/// Null is accepted for every type.
	pub fn accepts(self, value: &GeoValue) -> bool {
		match (self, value) {
			(_, GeoValue::Null) => true,
			(PropertyType::String, GeoValue::String(_)) => true,
			(PropertyType::Boolean, GeoValue::Bool(_)) => true,
			(PropertyType::Integer, GeoValue::Int(_) | GeoValue::UInt(_)) => true,
			(PropertyType::Number, v) => v.as_f64().is_some(),
			_ => false,
		}
	}
}

/// One declared property of a layer.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct SchemaProperty {
	pub slug: String,
	#[serde(default)]
	pub title: Option<String>,
	#[serde(rename = "type")]
	pub kind: PropertyType,
	/// Extra JSON schema keywords (`enum`, `format`, `maxLength`, ...), kept as written.
	#[serde(default, skip_serializing_if = "Map::is_empty")]
	pub options: Map<String, Value>,
	/// Properties of the objects inside an `array` property.
	#[serde(default, skip_serializing_if = "Vec::is_empty")]
	pub items: Vec<SchemaProperty>,
}

impl SchemaProperty {
	pub fn new(slug: &str, kind: PropertyType) -> SchemaProperty {
		SchemaProperty {
			slug: slug.to_string(),
			title: None,
			kind,
			options: Map::new(),
			items: Vec::new(),
		}
	}

	/// `items` belong to arrays only, and items cannot nest arrays themselves.
	pub fn check(&self) -> Result<()> {
		if !self.items.is_empty() && self.kind != PropertyType::Array {
			return Err(
				GeostoreError::ValidationFailure(format!("property '{}' has items but is not an array", self.slug)).into(),
			);
		}
		for item in &self.items {
			if item.kind == PropertyType::Array {
				return Err(GeostoreError::ValidationFailure(format!(
					"array property '{}' cannot contain the array '{}'",
					self.slug, item.slug
				))
				.into());
			}
			item.check()?;
		}
		Ok(())
	}
}
