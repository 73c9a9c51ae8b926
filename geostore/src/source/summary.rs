use geostore_core::GeoBBox;
use geostore_geometry::{GeoFeature, GeoValue};
use std::collections::BTreeMap;

/// Aggregate facts about a layer's features.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct LayerSummary {
	pub feature_count: usize,
	/// `None` when the layer is empty.
	pub bbox: Option<GeoBBox>,
	/// Mean of the larger side of each feature's envelope, in Web Mercator metres.
	pub mean_extent: f64,
	/// Property name to TileJSON type name (`String`, `Number`, `Boolean`).
	pub fields: BTreeMap<String, String>,
}

impl LayerSummary {
	pub fn from_features<'a>(features: impl IntoIterator<Item = (&'a GeoFeature, GeoBBox)>) -> LayerSummary {
		let mut summary = LayerSummary::default();
		let mut extent_sum = 0.0;

		for (feature, bbox) in features {
			summary.feature_count += 1;
			extent_sum += bbox.mercator_extent();
			match &mut summary.bbox {
				Some(total) => total.extend(&bbox),
				None => summary.bbox = Some(bbox),
			}

			for (key, value) in feature.properties.iter() {
				if *value == GeoValue::Null {
					continue;
				}
				let type_name = value.type_name();
				summary
					.fields
					.entry(key.clone())
					.and_modify(|existing| {
						// mixed types degrade to String
						if existing != type_name {
							*existing = String::from("String");
						}
					})
					.or_insert_with(|| type_name.to_string());
			}
		}

		if summary.feature_count > 0 {
			summary.mean_extent = extent_sum / summary.feature_count as f64;
		}
		summary
	}

	pub fn is_empty(&self) -> bool {
		self.feature_count == 0
	}
}
