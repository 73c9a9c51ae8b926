use geo::Geometry;

/// Wire-level MVT geometry type.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum GeomType {
	#[default]
	Unknown = 0,
	MultiPoint = 1,
	MultiLineString = 2,
	MultiPolygon = 3,
}

impl GeomType {
	pub fn as_u64(&self) -> u64 {
		*self as u64
	}

	/// The wire type a single geometry encodes to. Collections have none; they are split first.
	#[must_use]
	pub fn of(geometry: &Geometry<f64>) -> GeomType {
		match geometry {
			Geometry::Point(_) | Geometry::MultiPoint(_) => GeomType::MultiPoint,
			Geometry::Line(_) | Geometry::LineString(_) | Geometry::MultiLineString(_) => GeomType::MultiLineString,
			Geometry::Polygon(_) | Geometry::MultiPolygon(_) | Geometry::Rect(_) | Geometry::Triangle(_) => {
				GeomType::MultiPolygon
			}
			Geometry::GeometryCollection(_) => GeomType::Unknown,
		}
	}
}

impl From<u64> for GeomType {
	fn from(value: u64) -> Self {
		match value {
			1 => GeomType::MultiPoint,
			2 => GeomType::MultiLineString,
			3 => GeomType::MultiPolygon,
			_ => GeomType::Unknown,
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use geo::{GeometryCollection, line_string, point, polygon};

	#[test]
	fn u64_conversions() {
		assert_eq!(GeomType::Unknown.as_u64(), 0);
		assert_eq!(GeomType::MultiPolygon.as_u64(), 3);
		assert_eq!(GeomType::from(2), GeomType::MultiLineString);
		assert_eq!(GeomType::from(99), GeomType::Unknown);
	}

	#[test]
	fn of_geometry() {
		assert_eq!(GeomType::of(&point!(x: 1.0, y: 2.0).into()), GeomType::MultiPoint);
		assert_eq!(
			GeomType::of(&line_string![(x: 0.0, y: 0.0), (x: 1.0, y: 1.0)].into()),
			GeomType::MultiLineString
		);
		assert_eq!(
			GeomType::of(&polygon![(x: 0.0, y: 0.0), (x: 1.0, y: 0.0), (x: 1.0, y: 1.0)].into()),
			GeomType::MultiPolygon
		);
		assert_eq!(
			GeomType::of(&Geometry::GeometryCollection(GeometryCollection::default())),
			GeomType::Unknown
		);
	}
}
