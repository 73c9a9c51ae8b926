use super::{GeoProperties, GeoValue};
use geo::Geometry;

/// A stored feature: WGS84 geometry plus a property map.
#[derive(Clone, Debug, PartialEq)]
pub struct GeoFeature {
	pub id: Option<u64>,
	pub geometry: Geometry<f64>,
	pub properties: GeoProperties,
}

impl GeoFeature {
	#[must_use]
	pub fn new(geometry: Geometry<f64>) -> Self {
		Self {
			id: None,
			geometry,
			properties: GeoProperties::new(),
		}
	}

	pub fn set_id(&mut self, id: u64) {
		self.id = Some(id);
	}

	pub fn set_property<T>(&mut self, key: &str, value: T)
	where
		GeoValue: From<T>,
	{
		self.properties.insert(key.to_string(), GeoValue::from(value));
	}
}
