use geo::{Geometry, GeometryCollection, LineString, MultiLineString, MultiPolygon, Polygon, Simplify, SimplifyVwPreserve};

/// Reduces vertices of a tile-local geometry with a distance tolerance in tile units.
///
/// Lines use Ramer-Douglas-Peucker. Polygons use the topology-preserving Visvalingam-Whyatt
/// variant with an area threshold of `tolerance²`, so rings never start to self-intersect.
pub fn simplify_geometry(geometry: Geometry<f64>, tolerance: f64) -> Geometry<f64> {
	if tolerance <= 0.0 {
		return geometry;
	}
	let area = tolerance * tolerance;

	match geometry {
		Geometry::LineString(ls) => Geometry::LineString(simplify_line(&ls, tolerance)),
		Geometry::MultiLineString(mls) => {
			Geometry::MultiLineString(MultiLineString::new(mls.0.iter().map(|l| simplify_line(l, tolerance)).collect()))
		}
		Geometry::Polygon(p) => Geometry::Polygon(simplify_polygon(&p, area)),
		Geometry::MultiPolygon(mp) => Geometry::MultiPolygon(MultiPolygon::new(mp.0.iter().map(|p| simplify_polygon(p, area)).collect())),
		Geometry::GeometryCollection(gc) => Geometry::GeometryCollection(GeometryCollection::new_from(
			gc.0.into_iter().map(|g| simplify_geometry(g, tolerance)).collect(),
		)),
		other => other,
	}
}

fn simplify_line(line: &LineString<f64>, tolerance: f64) -> LineString<f64> {
	line.simplify(&tolerance)
}

fn simplify_polygon(polygon: &Polygon<f64>, area: f64) -> Polygon<f64> {
	// VW needs at least a triangle plus the closing point to work on
	if polygon.exterior().0.len() <= 4 {
		return polygon.clone();
	}
	polygon.simplify_vw_preserve(&area)
}

#[cfg(test)]
mod tests {
	use super::*;
	use geo::{Area, line_string, polygon};
	use pretty_assertions::assert_eq;

	#[test]
	fn nearly_straight_line_collapses() {
		let line = line_string![(x: 0.0, y: 0.0), (x: 50.0, y: 0.4), (x: 100.0, y: 0.0)];
		assert_eq!(
			simplify_geometry(line.into(), 1.0),
			Geometry::LineString(line_string![(x: 0.0, y: 0.0), (x: 100.0, y: 0.0)])
		);
	}

	#[test]
	fn significant_vertex_is_kept() {
		let line = line_string![(x: 0.0, y: 0.0), (x: 50.0, y: 20.0), (x: 100.0, y: 0.0)];
		assert_eq!(simplify_geometry(line.clone().into(), 1.0), Geometry::LineString(line));
	}

	#[test]
	fn polygon_loses_tiny_notch_but_keeps_shape() {
		let poly = polygon![
			(x: 0.0, y: 0.0),
			(x: 50.0, y: 0.0),
			(x: 50.5, y: 0.3),
			(x: 51.0, y: 0.0),
			(x: 100.0, y: 0.0),
			(x: 100.0, y: 100.0),
			(x: 0.0, y: 100.0),
		];
		let simplified = simplify_geometry(poly.clone().into(), 1.0);
		let Geometry::Polygon(result) = &simplified else {
			panic!("expected polygon");
		};
		assert!(result.exterior().0.len() < poly.exterior().0.len());
		approx::assert_relative_eq!(simplified.unsigned_area(), 10000.0, epsilon = 1.0);
	}

	#[test]
	fn zero_tolerance_is_identity() {
		let line = line_string![(x: 0.0, y: 0.0), (x: 50.0, y: 0.1), (x: 100.0, y: 0.0)];
		assert_eq!(simplify_geometry(line.clone().into(), 0.0), Geometry::LineString(line));
	}
}
