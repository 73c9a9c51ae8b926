//! Slippy-map tile coordinates and their geographic footprint.
//!
//! ```
//! use geostore_core::TileCoord;
//!
//! let coord = TileCoord::new(10, 515, 373).unwrap();
//! let bbox = coord.to_geo_bbox();
//! assert!(bbox.x_min < 1.37 && bbox.x_max > 1.37);
//! ```

use crate::{GeoBBox, MAX_MERCATOR_LAT};
use anyhow::{Result, ensure};
use std::{
	f64::consts::PI,
	fmt::{self, Debug, Display},
};

/// A tile coordinate with zoom `level` and `x`/`y` indices in `[0, 2^level)`.
#[derive(Eq, PartialEq, Clone, Hash, Copy)]
pub struct TileCoord {
	pub level: u8,
	pub x: u32,
	pub y: u32,
}

impl TileCoord {
	/// # Errors
	/// Returns an error if `level` > 31 or `x`/`y` lie outside the level's grid.
	pub fn new(level: u8, x: u32, y: u32) -> Result<TileCoord> {
		ensure!(level <= 31, "level ({level}) must be <= 31");
		let max = 2u64.pow(u32::from(level));
		ensure!(u64::from(x) < max, "x ({x}) out of bounds for level {level}");
		ensure!(u64::from(y) < max, "y ({y}) out of bounds for level {level}");
		Ok(TileCoord { level, x, y })
	}

	/// Number of tiles along one axis at this level.
	#[must_use]
	pub fn grid_size(&self) -> f64 {
		2.0f64.powi(i32::from(self.level))
	}

	/// Converts fractional tile-grid coordinates to `[longitude, latitude]` in degrees.
	#[must_use]
	pub fn grid_to_geo(level: u8, x: f64, y: f64) -> [f64; 2] {
		let zoom: f64 = 2.0f64.powi(i32::from(level));
		[
			(x / zoom - 0.5) * 360.0,
			((PI * (1.0 - 2.0 * y / zoom)).exp().atan() / PI - 0.25) * 360.0,
		]
	}

	/// Geographic bounding box of the tile.
	#[must_use]
	pub fn to_geo_bbox(&self) -> GeoBBox {
		self.to_geo_bbox_buffered(0.0, 256)
	}

	/// Geographic bounding box of the tile grown by `pixels` on every side,
	/// for a tile rendered at `tile_size` pixels. The result is clamped to the mercator world.
	#[must_use]
	pub fn to_geo_bbox_buffered(&self, pixels: f64, tile_size: u32) -> GeoBBox {
		let margin = pixels / f64::from(tile_size);
		let x0 = f64::from(self.x) - margin;
		let y0 = f64::from(self.y) - margin;
		let x1 = f64::from(self.x) + 1.0 + margin;
		let y1 = f64::from(self.y) + 1.0 + margin;

		let [west, north] = TileCoord::grid_to_geo(self.level, x0, y0);
		let [east, south] = TileCoord::grid_to_geo(self.level, x1, y1);

		let mut bbox = GeoBBox {
			x_min: west,
			y_min: south.max(-MAX_MERCATOR_LAT),
			x_max: east,
			y_max: north.min(MAX_MERCATOR_LAT),
		};
		bbox.limit_to_mercator();
		bbox
	}
}

impl Debug for TileCoord {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "TileCoord({}, [{}, {}])", self.level, self.x, self.y)
	}
}

impl Display for TileCoord {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}/{}/{}", self.level, self.x, self.y)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use approx::assert_abs_diff_eq;
	use rstest::rstest;

	#[rstest]
	#[case(0, 0, 0, true)]
	#[case(0, 1, 0, false)]
	#[case(10, 1023, 1023, true)]
	#[case(10, 1024, 0, false)]
	#[case(10, 0, 1024, false)]
	#[case(31, 0, 0, true)]
	#[case(32, 0, 0, false)]
	fn validation(#[case] level: u8, #[case] x: u32, #[case] y: u32, #[case] ok: bool) {
		assert_eq!(TileCoord::new(level, x, y).is_ok(), ok);
	}

	#[test]
	fn geo_bbox() {
		let coord = TileCoord::new(5, 3, 4).unwrap();
		let bbox = coord.to_geo_bbox().as_array();
		let expected = [-146.25, 76.84081641443098, -135.0, 79.17133464081945];
		for (a, b) in bbox.iter().zip(expected.iter()) {
			assert_abs_diff_eq!(a, b, epsilon = 1e-9);
		}
	}

	#[test]
	fn world_tile_is_mercator_world() {
		let bbox = TileCoord::new(0, 0, 0).unwrap().to_geo_bbox();
		assert_abs_diff_eq!(bbox.x_min, -180.0, epsilon = 1e-9);
		assert_abs_diff_eq!(bbox.y_max, MAX_MERCATOR_LAT, epsilon = 1e-9);
	}

	#[test]
	fn buffered_bbox_grows_and_clamps() {
		let coord = TileCoord::new(10, 515, 373).unwrap();
		let plain = coord.to_geo_bbox();
		let buffered = coord.to_geo_bbox_buffered(4.0, 256);
		let px_deg = 360.0 / 1024.0 / 256.0;
		assert_abs_diff_eq!(plain.x_min - buffered.x_min, 4.0 * px_deg, epsilon = 1e-12);
		assert!(buffered.y_max > plain.y_max);
		assert!(buffered.y_min < plain.y_min);

		let corner = TileCoord::new(1, 0, 0).unwrap().to_geo_bbox_buffered(64.0, 256);
		assert_eq!(corner.x_min, -180.0);
		assert_eq!(corner.y_max, MAX_MERCATOR_LAT);
	}

	#[test]
	fn display() {
		assert_eq!(TileCoord::new(10, 515, 373).unwrap().to_string(), "10/515/373");
		assert_eq!(format!("{:?}", TileCoord::new(2, 1, 3).unwrap()), "TileCoord(2, [1, 3])");
	}
}
