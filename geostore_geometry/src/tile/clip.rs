use geo::{BooleanOps, BoundingRect, Coord, Geometry, GeometryCollection, LineString, MultiLineString, MultiPoint, MultiPolygon, Polygon, Rect};

/// An axis-aligned square in tile-local coordinates, usually the tile grown by its buffer.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ClipRect {
	pub min: f64,
	pub max: f64,
}

impl ClipRect {
	#[must_use]
	pub fn new(extent: f64, buffer: f64) -> ClipRect {
		ClipRect {
			min: -buffer,
			max: extent + buffer,
		}
	}

	fn contains(&self, c: Coord<f64>) -> bool {
		c.x >= self.min && c.x <= self.max && c.y >= self.min && c.y <= self.max
	}

	fn to_rect(self) -> Rect<f64> {
		Rect::new(Coord { x: self.min, y: self.min }, Coord { x: self.max, y: self.max })
	}

	/// `Some(true)` if `rect` lies completely inside, `Some(false)` if it is completely outside.
	fn classify(&self, rect: Option<Rect<f64>>) -> Option<bool> {
		let rect = rect?;
		if rect.max().x < self.min || rect.min().x > self.max || rect.max().y < self.min || rect.min().y > self.max {
			return Some(false);
		}
		if self.contains(rect.min()) && self.contains(rect.max()) {
			return Some(true);
		}
		None
	}
}

/// Cuts a tile-local geometry down to `clip`. Returns `None` when nothing is left.
pub fn clip_geometry(geometry: Geometry<f64>, clip: &ClipRect) -> Option<Geometry<f64>> {
	match geometry {
		Geometry::Point(p) => clip.contains(p.0).then_some(Geometry::Point(p)),
		Geometry::MultiPoint(mp) => {
			let points: Vec<_> = mp.0.into_iter().filter(|p| clip.contains(p.0)).collect();
			(!points.is_empty()).then(|| Geometry::MultiPoint(MultiPoint::new(points)))
		}
		Geometry::Line(l) => clip_lines(MultiLineString::new(vec![LineString::from(vec![l.start, l.end])]), clip),
		Geometry::LineString(ls) => clip_lines(MultiLineString::new(vec![ls]), clip),
		Geometry::MultiLineString(mls) => clip_lines(mls, clip),
		Geometry::Polygon(p) => clip_polygons(MultiPolygon::new(vec![p]), clip),
		Geometry::MultiPolygon(mp) => clip_polygons(mp, clip),
		Geometry::Rect(r) => clip_polygons(MultiPolygon::new(vec![r.to_polygon()]), clip),
		Geometry::Triangle(t) => clip_polygons(MultiPolygon::new(vec![t.to_polygon()]), clip),
		Geometry::GeometryCollection(gc) => {
			let parts: Vec<_> = gc.0.into_iter().filter_map(|g| clip_geometry(g, clip)).collect();
			(!parts.is_empty()).then(|| Geometry::GeometryCollection(GeometryCollection::new_from(parts)))
		}
	}
}

fn clip_lines(mls: MultiLineString<f64>, clip: &ClipRect) -> Option<Geometry<f64>> {
	let clipped = match clip.classify(mls.bounding_rect()) {
		Some(true) => mls,
		Some(false) => return None,
		None => clip.to_rect().to_polygon().clip(&mls, false),
	};

	let mut lines: Vec<LineString<f64>> = clipped.0.into_iter().filter(|l| l.0.len() >= 2).collect();
	match lines.len() {
		0 => None,
		1 => lines.pop().map(Geometry::LineString),
		_ => Some(Geometry::MultiLineString(MultiLineString::new(lines))),
	}
}

fn clip_polygons(mp: MultiPolygon<f64>, clip: &ClipRect) -> Option<Geometry<f64>> {
	let clipped = match clip.classify(mp.bounding_rect()) {
		Some(true) => mp,
		Some(false) => return None,
		None => mp.intersection(&MultiPolygon::new(vec![clip.to_rect().to_polygon()])),
	};

	let mut polygons: Vec<Polygon<f64>> = clipped.0;
	match polygons.len() {
		0 => None,
		1 => polygons.pop().map(Geometry::Polygon),
		_ => Some(Geometry::MultiPolygon(MultiPolygon::new(polygons))),
	}
}
