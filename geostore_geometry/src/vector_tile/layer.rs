//! A single MVT layer.
//!
//! Wire layout:
//!  * field 1: `name` (string)
//!  * field 2: repeated `feature` (embedded message)
//!  * field 3: repeated `keys` (string)
//!  * field 4: repeated `values` (embedded message)
//!  * field 5: `extent` (varint, default 4096)
//!  * field 15: `version` (varint)

use super::{feature::VectorTileFeature, property_manager::PropertyManager, value::GeoValuePBF};
use crate::geo::{GeoFeature, GeoProperties, GeoValue};
use anyhow::{Context, Result, anyhow};
use geo::{Geometry, LineString, MultiLineString, MultiPoint, MultiPolygon, Point, Polygon};
use geostore_core::{
	Blob,
	io::{PbfReader, PbfWriter},
};

pub const DEFAULT_EXTENT: u32 = 4096;
pub const MVT_VERSION: u32 = 2;

#[derive(Clone, Debug, Default, PartialEq)]
pub struct VectorTileLayer {
	/// Size of the tile-local coordinate square.
	pub extent: u32,
	pub features: Vec<VectorTileFeature>,
	pub name: String,
	pub property_manager: PropertyManager,
	pub version: u32,
}

impl VectorTileLayer {
	#[must_use]
	pub fn new(name: String, extent: u32, version: u32) -> VectorTileLayer {
		VectorTileLayer {
			extent,
			features: vec![],
			name,
			property_manager: PropertyManager::default(),
			version,
		}
	}

	/// An empty layer with extent 4096 and MVT version 2.
	#[must_use]
	pub fn new_standard(name: &str) -> VectorTileLayer {
		VectorTileLayer::new(name.to_string(), DEFAULT_EXTENT, MVT_VERSION)
	}

	#[must_use]
	pub fn is_empty(&self) -> bool {
		self.features.is_empty()
	}

	pub fn read(reader: &mut PbfReader<'_>) -> Result<VectorTileLayer> {
		let mut extent = DEFAULT_EXTENT;
		let mut features: Vec<VectorTileFeature> = Vec::new();
		let mut name = None;
		let mut property_manager = PropertyManager::new();
		let mut version = 1;

		while reader.has_remaining() {
			match reader.read_pbf_key().context("Failed to read PBF key")? {
				(1, 2) => name = Some(reader.read_pbf_string().context("Failed to read layer name")?),
				(2, 2) => features.push(
					VectorTileFeature::read(&mut reader.get_pbf_sub_reader()?).context("Failed to read VectorTileFeature")?,
				),
				(3, 2) => {
					property_manager.add_key(reader.read_pbf_string().context("Failed to read property key")?);
				}
				(4, 2) => {
					property_manager.add_val(GeoValue::read(&mut reader.get_pbf_sub_reader()?).context("Failed to read GeoValue")?);
				}
				(5, 0) => extent = u32::try_from(reader.read_varint().context("Failed to read extent")?)?,
				(15, 0) => version = u32::try_from(reader.read_varint().context("Failed to read version")?)?,
				(_, w) => reader.skip_field(w).context("Failed to skip unknown layer field")?,
			}
		}

		Ok(VectorTileLayer {
			extent,
			features,
			name: name.ok_or(anyhow!("Layer name is required"))?,
			property_manager,
			version,
		})
	}

	/// Serializes the layer. `extent` is only written when it differs from 4096.
	pub fn to_blob(&self) -> Result<Blob> {
		let mut writer = PbfWriter::new();

		writer.write_pbf_key(1, 2)?;
		writer.write_pbf_string(&self.name).context("Failed to write layer name")?;

		for feature in &self.features {
			writer.write_pbf_key(2, 2)?;
			writer
				.write_pbf_blob(&feature.to_blob().context("Failed to convert feature to blob")?)
				.context("Failed to write feature blob")?;
		}

		for key in self.property_manager.iter_key() {
			writer.write_pbf_key(3, 2)?;
			writer.write_pbf_string(key).context("Failed to write property key")?;
		}

		for value in self.property_manager.iter_val() {
			writer.write_pbf_key(4, 2)?;
			writer
				.write_pbf_blob(&value.to_blob().context("Failed to convert property value to blob")?)
				.context("Failed to write property value blob")?;
		}

		if self.extent != DEFAULT_EXTENT {
			writer.write_pbf_key(5, 0)?;
			writer.write_varint(u64::from(self.extent)).context("Failed to write extent")?;
		}

		if self.version != 1 {
			writer.write_pbf_key(15, 0)?;
			writer.write_varint(u64::from(self.version)).context("Failed to write version")?;
		}

		Ok(writer.into_blob())
	}

	/// Builds a layer from features whose geometries are already in tile-local coordinates.
	///
	/// Geometry collections become up to three features (points, lines, polygons) sharing id and properties.
	/// Features whose geometry collapses while encoding are dropped; the key/value tables only
	/// contain entries referenced by surviving features.
	pub fn from_features(name: &str, features: Vec<GeoFeature>, extent: u32) -> Result<VectorTileLayer> {
		let mut encoded: Vec<(VectorTileFeature, GeoProperties)> = Vec::new();

		for feature in features {
			for part in split_collection(feature.geometry) {
				if let Some(vt_feature) = VectorTileFeature::from_geometry(feature.id, vec![], &part)
					.with_context(|| format!("Failed to encode feature {:?}", feature.id))?
				{
					encoded.push((vt_feature, feature.properties.clone()));
				}
			}
		}

		let mut property_manager = PropertyManager::from_iter(encoded.iter().map(|(_, p)| p));
		let features = encoded
			.into_iter()
			.map(|(mut f, p)| {
				f.tag_ids = property_manager.encode_tag_ids(p);
				f
			})
			.collect();

		Ok(VectorTileLayer {
			extent,
			features,
			name: name.to_string(),
			property_manager,
			version: MVT_VERSION,
		})
	}

	/// Decodes all features back into tile-local [`GeoFeature`]s.
	pub fn to_features(&self) -> Result<Vec<GeoFeature>> {
		self
			.features
			.iter()
			.map(|feature| {
				let mut geo_feature = GeoFeature::new(feature.to_geometry().context("Failed to decode geometry")?);
				geo_feature.id = feature.id;
				geo_feature.properties = self.decode_tag_ids(&feature.tag_ids)?;
				Ok(geo_feature)
			})
			.collect()
	}

	pub fn decode_tag_ids(&self, tag_ids: &[u32]) -> Result<GeoProperties> {
		self.property_manager.decode_tag_ids(tag_ids)
	}
}

/// Flattens nested collections into at most one geometry per wire type, in the order points, lines, polygons.
fn split_collection(geometry: Geometry<f64>) -> Vec<Geometry<f64>> {
	let Geometry::GeometryCollection(collection) = geometry else {
		return vec![geometry];
	};

	let mut points: Vec<Point<f64>> = Vec::new();
	let mut lines: Vec<LineString<f64>> = Vec::new();
	let mut polygons: Vec<Polygon<f64>> = Vec::new();

	fn collect(geometry: Geometry<f64>, points: &mut Vec<Point<f64>>, lines: &mut Vec<LineString<f64>>, polygons: &mut Vec<Polygon<f64>>) {
		match geometry {
			Geometry::Point(p) => points.push(p),
			Geometry::MultiPoint(mp) => points.extend(mp.0),
			Geometry::Line(l) => lines.push(LineString::from(vec![l.start, l.end])),
			Geometry::LineString(ls) => lines.push(ls),
			Geometry::MultiLineString(mls) => lines.extend(mls.0),
			Geometry::Polygon(p) => polygons.push(p),
			Geometry::MultiPolygon(mp) => polygons.extend(mp.0),
			Geometry::Rect(r) => polygons.push(r.to_polygon()),
			Geometry::Triangle(t) => polygons.push(t.to_polygon()),
			Geometry::GeometryCollection(gc) => {
				for g in gc.0 {
					collect(g, points, lines, polygons);
				}
			}
		}
	}

	for g in collection.0 {
		collect(g, &mut points, &mut lines, &mut polygons);
	}

	let mut parts = Vec::new();
	if !points.is_empty() {
		parts.push(Geometry::MultiPoint(MultiPoint::new(points)));
	}
	if !lines.is_empty() {
		parts.push(Geometry::MultiLineString(MultiLineString::new(lines)));
	}
	if !polygons.is_empty() {
		parts.push(Geometry::MultiPolygon(MultiPolygon::new(polygons)));
	}
	parts
}
