use super::geometry_type::GeomType;
use anyhow::{Context, Result, bail, ensure};
use geo::{Coord, Geometry, LineString, MultiLineString, MultiPoint, MultiPolygon, Point, Polygon};
use geostore_core::{
	Blob,
	io::{PbfReader, PbfWriter},
};

const CMD_MOVE_TO: u64 = 1;
const CMD_LINE_TO: u64 = 2;
const CMD_CLOSE_PATH: u64 = 7;

/// One encoded feature: geometry commands plus indices into the layer's property tables.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct VectorTileFeature {
	pub id: Option<u64>,
	pub tag_ids: Vec<u32>,
	pub geom_type: GeomType,
	pub geom_data: Blob,
}

impl VectorTileFeature {
	pub fn read(reader: &mut PbfReader<'_>) -> Result<VectorTileFeature> {
		let mut f = VectorTileFeature::default();

		while reader.has_remaining() {
			match reader.read_pbf_key().context("Failed to read PBF key")? {
				(1, 0) => f.id = Some(reader.read_varint().context("Failed to read feature ID")?),
				(2, 2) => f.tag_ids = reader.read_pbf_packed_uint32().context("Failed to read tag IDs")?,
				(3, 0) => f.geom_type = GeomType::from(reader.read_varint().context("Failed to read geometry type")?),
				(4, 2) => f.geom_data = reader.read_pbf_blob().context("Failed to read geometry data")?,
				(_, w) => reader.skip_field(w).context("Failed to skip unknown feature field")?,
			}
		}

		Ok(f)
	}

	pub fn to_blob(&self) -> Result<Blob> {
		let mut writer = PbfWriter::new();

		if let Some(id) = self.id {
			writer.write_pbf_key(1, 0)?;
			writer.write_varint(id).context("Failed to write feature ID")?;
		}

		if !self.tag_ids.is_empty() {
			writer.write_pbf_key(2, 2)?;
			writer
				.write_pbf_packed_uint32(&self.tag_ids)
				.context("Failed to write tag IDs")?;
		}

		writer.write_pbf_key(3, 0)?;
		writer
			.write_varint(self.geom_type.as_u64())
			.context("Failed to write geometry type")?;

		if !self.geom_data.is_empty() {
			writer.write_pbf_key(4, 2)?;
			writer
				.write_pbf_blob(&self.geom_data)
				.context("Failed to write geometry data")?;
		}

		Ok(writer.into_blob())
	}

	/// Encodes a geometry that is already in tile-local coordinates.
	///
	/// Coordinates are rounded to integers. Collections must be split by the caller.
	/// Returns `None` when nothing drawable remains (e.g. every ring collapsed).
	pub fn from_geometry(id: Option<u64>, tag_ids: Vec<u32>, geometry: &Geometry<f64>) -> Result<Option<VectorTileFeature>> {
		let mut writer = GeometryWriter::default();

		let geom_type = match geometry {
			Geometry::Point(p) => writer.write_points(std::slice::from_ref(p))?,
			Geometry::MultiPoint(mp) => writer.write_points(&mp.0)?,
			Geometry::Line(l) => writer.write_line_strings(std::slice::from_ref(&LineString::from(vec![l.start, l.end])))?,
			Geometry::LineString(ls) => writer.write_line_strings(std::slice::from_ref(ls))?,
			Geometry::MultiLineString(mls) => writer.write_line_strings(&mls.0)?,
			Geometry::Polygon(p) => writer.write_polygons(std::slice::from_ref(p))?,
			Geometry::MultiPolygon(mp) => writer.write_polygons(&mp.0)?,
			Geometry::Rect(r) => writer.write_polygons(&[r.to_polygon()])?,
			Geometry::Triangle(t) => writer.write_polygons(&[t.to_polygon()])?,
			Geometry::GeometryCollection(_) => bail!("geometry collections must be split before encoding"),
		};

		if writer.is_empty() {
			return Ok(None);
		}

		Ok(Some(VectorTileFeature {
			id,
			tag_ids,
			geom_type,
			geom_data: writer.into_blob(),
		}))
	}

	/// Decodes the command stream back into tile-local geometry.
	///
	/// Rings with positive area (y pointing down) start a new polygon, negative ones are holes.
	pub fn to_geometry(&self) -> Result<Geometry<f64>> {
		let lines = self.decode_commands()?;

		match self.geom_type {
			GeomType::Unknown => bail!("Unknown geometry type"),

			GeomType::MultiPoint => {
				ensure!(!lines.is_empty(), "(Multi)Points must not be empty");
				let points = lines
					.into_iter()
					.flatten()
					.map(Point::from)
					.collect::<Vec<_>>();
				if points.len() == 1 {
					Ok(Geometry::Point(points[0]))
				} else {
					Ok(Geometry::MultiPoint(MultiPoint::new(points)))
				}
			}

			GeomType::MultiLineString => {
				ensure!(!lines.is_empty(), "MultiLineStrings must have at least one entry");
				for line in &lines {
					ensure!(line.len() >= 2, "Each line must have at least two points");
				}
				let mut lines = lines.into_iter().map(LineString::new).collect::<Vec<_>>();
				if lines.len() == 1 {
					Ok(Geometry::LineString(lines.remove(0)))
				} else {
					Ok(Geometry::MultiLineString(MultiLineString::new(lines)))
				}
			}

			GeomType::MultiPolygon => {
				ensure!(!lines.is_empty(), "Polygons must have at least one entry");
				let mut polygons: Vec<(LineString<f64>, Vec<LineString<f64>>)> = Vec::new();

				for ring in lines {
					ensure!(ring.len() >= 4, "Each ring must have at least four points (A,B,C,A)");
					let area = ring_area(&ring);
					let ring = LineString::new(ring);
					if area > 0.0 {
						polygons.push((ring, Vec::new()));
					} else if area < 0.0 {
						match polygons.last_mut() {
							Some((_, interiors)) => interiors.push(ring),
							None => log::trace!("an exterior ring must precede interior rings"),
						}
					} else {
						log::trace!("skip ring with zero area");
					}
				}

				let mut polygons = polygons
					.into_iter()
					.map(|(exterior, interiors)| Polygon::new(exterior, interiors))
					.collect::<Vec<_>>();
				if polygons.len() == 1 {
					Ok(Geometry::Polygon(polygons.remove(0)))
				} else {
					Ok(Geometry::MultiPolygon(MultiPolygon::new(polygons)))
				}
			}
		}
	}

	fn decode_commands(&self) -> Result<Vec<Vec<Coord<f64>>>> {
		let mut reader = PbfReader::new(self.geom_data.as_slice());

		let mut lines: Vec<Vec<Coord<f64>>> = Vec::new();
		let mut line: Vec<Coord<f64>> = Vec::new();
		let mut x = 0i64;
		let mut y = 0i64;

		while reader.has_remaining() {
			let value = reader.read_varint().context("Failed to read geometry command")?;
			let command = value & 0x7;
			let count = value >> 3;

			match command {
				CMD_MOVE_TO | CMD_LINE_TO => {
					for _ in 0..count {
						if command == CMD_MOVE_TO && !line.is_empty() {
							lines.push(std::mem::take(&mut line));
						}
						x += reader.read_svarint().context("Failed to read x coordinate")?;
						y += reader.read_svarint().context("Failed to read y coordinate")?;
						line.push(Coord {
							x: x as f64,
							y: y as f64,
						});
					}
				}
				CMD_CLOSE_PATH => {
					ensure!(!line.is_empty(), "ClosePath command found on an empty linestring");
					line.push(line[0]);
				}
				_ => bail!("Unknown command {command}"),
			}
		}

		if !line.is_empty() {
			lines.push(line);
		}

		Ok(lines)
	}
}

/// Signed shoelace area. Positive means clockwise on screen (y down), which MVT uses for exterior rings.
pub fn ring_area(ring: &[Coord<f64>]) -> f64 {
	let mut sum = 0.0;
	for pair in ring.windows(2) {
		sum += pair[0].x * pair[1].y - pair[1].x * pair[0].y;
	}
	sum / 2.0
}

/// Writes MVT geometry commands, delta-encoding against the previous cursor position.
#[derive(Default)]
struct GeometryWriter {
	writer: PbfWriter,
	cursor: (i64, i64),
}

impl GeometryWriter {
	fn is_empty(&self) -> bool {
		self.writer.is_empty()
	}

	fn into_blob(self) -> Blob {
		self.writer.into_blob()
	}

	fn command(&mut self, id: u64, count: usize) -> Result<()> {
		self.writer.write_varint(((count as u64) << 3) | id)
	}

	fn point(&mut self, coord: Coord<f64>) -> Result<()> {
		let x = coord.x.round() as i64;
		let y = coord.y.round() as i64;
		self.writer.write_svarint(x - self.cursor.0)?;
		self.writer.write_svarint(y - self.cursor.1)?;
		self.cursor = (x, y);
		Ok(())
	}

	fn write_points(&mut self, points: &[Point<f64>]) -> Result<GeomType> {
		if !points.is_empty() {
			self.command(CMD_MOVE_TO, points.len())?;
			for point in points {
				self.point(point.0)?;
			}
		}
		Ok(GeomType::MultiPoint)
	}

	fn write_line_strings(&mut self, line_strings: &[LineString<f64>]) -> Result<GeomType> {
		for line_string in line_strings {
			let coords = dedup_rounded(&line_string.0);
			if coords.len() < 2 {
				continue;
			}
			self.command(CMD_MOVE_TO, 1)?;
			self.point(coords[0])?;
			self.command(CMD_LINE_TO, coords.len() - 1)?;
			for coord in &coords[1..] {
				self.point(*coord)?;
			}
		}
		Ok(GeomType::MultiLineString)
	}

	fn write_polygons(&mut self, polygons: &[Polygon<f64>]) -> Result<GeomType> {
		for polygon in polygons {
			let exterior = dedup_rounded(&polygon.exterior().0);
			if !self.write_ring(exterior, RingRole::Exterior)? {
				// holes of a collapsed exterior would become exteriors of their own
				continue;
			}
			for interior in polygon.interiors() {
				self.write_ring(dedup_rounded(&interior.0), RingRole::Interior)?;
			}
		}
		Ok(GeomType::MultiPolygon)
	}

	/// Writes a rounded ring without its closing point.
	///
	/// The winding is checked again on the integer grid, because rounding can flip or flatten a thin ring.
	/// Returns `false` if the ring has no area left.
	fn write_ring(&mut self, mut points: Vec<Coord<f64>>, role: RingRole) -> Result<bool> {
		if points.len() > 1 && points[0] == points[points.len() - 1] {
			points.pop();
		}
		if points.len() < 3 {
			return Ok(false);
		}

		let area = open_ring_area(&points);
		if area == 0.0 {
			return Ok(false);
		}
		if (area > 0.0) != (role == RingRole::Exterior) {
			points.reverse();
		}

		self.command(CMD_MOVE_TO, 1)?;
		self.point(points[0])?;
		self.command(CMD_LINE_TO, points.len() - 1)?;
		for coord in &points[1..] {
			self.point(*coord)?;
		}
		self.command(CMD_CLOSE_PATH, 1)?;
		Ok(true)
	}
}

#[derive(Clone, Copy, PartialEq)]
enum RingRole {
	Exterior,
	Interior,
}

/// Like [`ring_area`], for a ring whose closing point is implied.
fn open_ring_area(points: &[Coord<f64>]) -> f64 {
	let closing = [points[points.len() - 1], points[0]];
	ring_area(points) + ring_area(&closing)
}

/// Rounds to the integer grid and drops consecutive duplicates.
fn dedup_rounded(coords: &[Coord<f64>]) -> Vec<Coord<f64>> {
	let mut result: Vec<Coord<f64>> = Vec::with_capacity(coords.len());
	for coord in coords {
		let rounded = Coord {
			x: coord.x.round(),
			y: coord.y.round(),
		};
		if result.last() != Some(&rounded) {
			result.push(rounded);
		}
	}
	result
}
