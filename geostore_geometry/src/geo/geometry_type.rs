use geo::Geometry;
use serde::{Deserialize, Serialize};
use std::fmt::Display;

/// The geometry type a layer may be restricted to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GeometryType {
	Point,
	LineString,
	Polygon,
	MultiPoint,
	MultiLineString,
	MultiPolygon,
	GeometryCollection,
}

impl GeometryType {
	/// The type of a geometry, or `None` for variants GeoJSON cannot express (`Line`, `Rect`, `Triangle`).
	#[must_use]
	pub fn of(geometry: &Geometry<f64>) -> Option<GeometryType> {
		match geometry {
			Geometry::Point(_) => Some(GeometryType::Point),
			Geometry::LineString(_) => Some(GeometryType::LineString),
			Geometry::Polygon(_) => Some(GeometryType::Polygon),
			Geometry::MultiPoint(_) => Some(GeometryType::MultiPoint),
			Geometry::MultiLineString(_) => Some(GeometryType::MultiLineString),
			Geometry::MultiPolygon(_) => Some(GeometryType::MultiPolygon),
			Geometry::GeometryCollection(_) => Some(GeometryType::GeometryCollection),
			Geometry::Line(_) | Geometry::Rect(_) | Geometry::Triangle(_) => None,
		}
	}

	#[must_use]
	pub fn as_str(&self) -> &'static str {
		match self {
			GeometryType::Point => "Point",
			GeometryType::LineString => "LineString",
			GeometryType::Polygon => "Polygon",
			GeometryType::MultiPoint => "MultiPoint",
			GeometryType::MultiLineString => "MultiLineString",
			GeometryType::MultiPolygon => "MultiPolygon",
			GeometryType::GeometryCollection => "GeometryCollection",
		}
	}
}

impl Display for GeometryType {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.write_str(self.as_str())
	}
}
