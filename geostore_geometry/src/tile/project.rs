use geo::{Coord, Geometry, MapCoords};
use geostore_core::{MAX_MERCATOR_LAT, TileCoord};
use std::f64::consts::PI;

/// Maps WGS84 longitude/latitude into the local coordinate square of one tile.
///
/// `(0, 0)` is the tile's north-west corner and `(extent, extent)` its south-east corner.
/// Values outside that square belong to neighbouring tiles.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TileTransform {
	coord: TileCoord,
	extent: f64,
}

impl TileTransform {
	#[must_use]
	pub fn new(coord: TileCoord, extent: u32) -> TileTransform {
		TileTransform {
			coord,
			extent: f64::from(extent),
		}
	}

	#[must_use]
	pub fn coord(&self) -> TileCoord {
		self.coord
	}

	#[must_use]
	pub fn extent(&self) -> f64 {
		self.extent
	}

	/// Tile units per screen pixel of a 256 px tile.
	#[must_use]
	pub fn pixel(&self) -> f64 {
		self.extent / 256.0
	}

	#[must_use]
	pub fn project_coord(&self, lonlat: Coord<f64>) -> Coord<f64> {
		let n = self.coord.grid_size();
		let lat = lonlat.y.clamp(-MAX_MERCATOR_LAT, MAX_MERCATOR_LAT).to_radians();

		let grid_x = (lonlat.x + 180.0) / 360.0 * n;
		let grid_y = (1.0 - (lat.tan() + 1.0 / lat.cos()).ln() / PI) / 2.0 * n;

		Coord {
			x: (grid_x - f64::from(self.coord.x)) * self.extent,
			y: (grid_y - f64::from(self.coord.y)) * self.extent,
		}
	}

	#[must_use]
	pub fn project(&self, geometry: &Geometry<f64>) -> Geometry<f64> {
		geometry.map_coords(|c| self.project_coord(c))
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use approx::assert_abs_diff_eq;
	use geo::coord;

	fn transform(level: u8, x: u32, y: u32) -> TileTransform {
		TileTransform::new(TileCoord::new(level, x, y).unwrap(), 4096)
	}

	#[test]
	fn world_tile_corners() {
		let t = transform(0, 0, 0);
		let nw = t.project_coord(coord! { x: -180.0, y: MAX_MERCATOR_LAT });
		assert_abs_diff_eq!(nw.x, 0.0, epsilon = 1e-6);
		assert_abs_diff_eq!(nw.y, 0.0, epsilon = 1e-6);

		let center = t.project_coord(coord! { x: 0.0, y: 0.0 });
		assert_abs_diff_eq!(center.x, 2048.0, epsilon = 1e-6);
		assert_abs_diff_eq!(center.y, 2048.0, epsilon = 1e-6);
	}

	#[test]
	fn latitude_is_clamped() {
		let t = transform(0, 0, 0);
		let pole = t.project_coord(coord! { x: 0.0, y: 90.0 });
		assert_abs_diff_eq!(pole.y, 0.0, epsilon = 1e-6);
	}

	#[test]
	fn tile_bbox_maps_to_extent() {
		let coord = TileCoord::new(10, 515, 373).unwrap();
		let t = TileTransform::new(coord, 4096);
		let bbox = coord.to_geo_bbox();

		let nw = t.project_coord(coord! { x: bbox.x_min, y: bbox.y_max });
		let se = t.project_coord(coord! { x: bbox.x_max, y: bbox.y_min });
		assert_abs_diff_eq!(nw.x, 0.0, epsilon = 1e-6);
		assert_abs_diff_eq!(nw.y, 0.0, epsilon = 1e-6);
		assert_abs_diff_eq!(se.x, 4096.0, epsilon = 1e-6);
		assert_abs_diff_eq!(se.y, 4096.0, epsilon = 1e-6);
	}

	#[test]
	fn pixel_size() {
		assert_eq!(transform(3, 1, 1).pixel(), 16.0);
		assert_eq!(TileTransform::new(TileCoord::new(3, 1, 1).unwrap(), 512).pixel(), 2.0);
	}
}
