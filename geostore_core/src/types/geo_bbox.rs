use anyhow::{Result, ensure};
use std::fmt::Debug;

pub const MAX_MERCATOR_LAT: f64 = 85.051_128_779_806_59;
pub const MAX_MERCATOR_LNG: f64 = 180.0;
/// Earth radius used by Web Mercator, in metres.
pub const EARTH_RADIUS: f64 = 6_378_137.0;

/// A geographic bounding box in WGS84 degrees: `west, south, east, north`.
///
/// ```
/// use geostore_core::GeoBBox;
///
/// let mut bbox = GeoBBox::new(-10.0, -5.0, 10.0, 5.0).unwrap();
/// bbox.extend(&GeoBBox::new(-12.0, -3.0, 8.0, 6.0).unwrap());
/// assert_eq!(bbox.as_array(), [-12.0, -5.0, 10.0, 6.0]);
/// ```
#[derive(Clone, Copy, PartialEq)]
pub struct GeoBBox {
	pub x_min: f64,
	pub y_min: f64,
	pub x_max: f64,
	pub y_max: f64,
}

impl GeoBBox {
	pub fn new(x_min: f64, y_min: f64, x_max: f64, y_max: f64) -> Result<GeoBBox> {
		ensure!(x_min <= x_max, "x_min ({x_min}) must be <= x_max ({x_max})");
		ensure!(y_min <= y_max, "y_min ({y_min}) must be <= y_max ({y_max})");
		ensure!(
			x_min.is_finite() && y_min.is_finite() && x_max.is_finite() && y_max.is_finite(),
			"bounding box values must be finite"
		);
		Ok(GeoBBox {
			x_min,
			y_min,
			x_max,
			y_max,
		})
	}

	/// The whole area covered by Web Mercator tiles.
	#[must_use]
	pub fn world() -> GeoBBox {
		GeoBBox {
			x_min: -MAX_MERCATOR_LNG,
			y_min: -MAX_MERCATOR_LAT,
			x_max: MAX_MERCATOR_LNG,
			y_max: MAX_MERCATOR_LAT,
		}
	}

	/// A degenerate box around a single position.
	#[must_use]
	pub fn from_point(x: f64, y: f64) -> GeoBBox {
		GeoBBox {
			x_min: x,
			y_min: y,
			x_max: x,
			y_max: y,
		}
	}

	pub fn limit_to_mercator(&mut self) {
		self.x_min = self.x_min.max(-MAX_MERCATOR_LNG);
		self.y_min = self.y_min.max(-MAX_MERCATOR_LAT);
		self.x_max = self.x_max.min(MAX_MERCATOR_LNG);
		self.y_max = self.y_max.min(MAX_MERCATOR_LAT);
	}

	#[must_use]
	pub fn as_array(&self) -> [f64; 4] {
		[self.x_min, self.y_min, self.x_max, self.y_max]
	}

	pub fn extend(&mut self, other: &GeoBBox) {
		self.x_min = self.x_min.min(other.x_min);
		self.y_min = self.y_min.min(other.y_min);
		self.x_max = self.x_max.max(other.x_max);
		self.y_max = self.y_max.max(other.y_max);
	}

	#[must_use]
	pub fn extended(mut self, other: &GeoBBox) -> GeoBBox {
		self.extend(other);
		self
	}

	#[must_use]
	pub fn intersects(&self, other: &GeoBBox) -> bool {
		self.x_min <= other.x_max && other.x_min <= self.x_max && self.y_min <= other.y_max && other.y_min <= self.y_max
	}

	/// Projects the box into Web Mercator metres: `[x_min, y_min, x_max, y_max]`.
	#[must_use]
	pub fn to_mercator(&self) -> [f64; 4] {
		let [x0, y0] = lonlat_to_mercator(self.x_min, self.y_min);
		let [x1, y1] = lonlat_to_mercator(self.x_max, self.y_max);
		[x0, y0, x1, y1]
	}

	/// The larger side of the box, measured in Web Mercator metres.
	#[must_use]
	pub fn mercator_extent(&self) -> f64 {
		let [x0, y0, x1, y1] = self.to_mercator();
		(x1 - x0).abs().max((y1 - y0).abs())
	}
}

/// Projects WGS84 degrees to Web Mercator metres, clamping latitude to the mercator range.
#[must_use]
pub fn lonlat_to_mercator(lon: f64, lat: f64) -> [f64; 2] {
	let lat = lat.clamp(-MAX_MERCATOR_LAT, MAX_MERCATOR_LAT);
	[
		lon.to_radians() * EARTH_RADIUS,
		(lat.to_radians() / 2.0 + std::f64::consts::FRAC_PI_4).tan().ln() * EARTH_RADIUS,
	]
}

impl Debug for GeoBBox {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(f, "GeoBBox({}, {}, {}, {})", self.x_min, self.y_min, self.x_max, self.y_max)
	}
}

impl TryFrom<[f64; 4]> for GeoBBox {
	type Error = anyhow::Error;

	fn try_from(value: [f64; 4]) -> Result<Self> {
		GeoBBox::new(value[0], value[1], value[2], value[3])
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use approx::assert_relative_eq;

	#[test]
	fn new_rejects_inverted() {
		assert!(GeoBBox::new(10.0, 0.0, -10.0, 5.0).is_err());
		assert!(GeoBBox::new(0.0, 5.0, 1.0, 0.0).is_err());
		assert!(GeoBBox::new(0.0, f64::NAN, 1.0, 0.0).is_err());
	}

	#[test]
	fn extend_and_intersect() -> Result<()> {
		let a = GeoBBox::new(0.0, 0.0, 2.0, 2.0)?;
		let b = GeoBBox::new(1.0, 1.0, 3.0, 3.0)?;
		let c = GeoBBox::new(5.0, 5.0, 6.0, 6.0)?;
		assert!(a.intersects(&b));
		assert!(!a.intersects(&c));
		assert_eq!(a.extended(&c).as_array(), [0.0, 0.0, 6.0, 6.0]);
		Ok(())
	}

	#[test]
	fn limit_to_mercator() -> Result<()> {
		let mut bbox = GeoBBox::new(-190.0, -90.0, 190.0, 90.0)?;
		bbox.limit_to_mercator();
		assert_eq!(bbox, GeoBBox::world());
		Ok(())
	}

	#[test]
	fn point_has_no_extent() {
		assert_eq!(GeoBBox::from_point(1.0, 2.0).mercator_extent(), 0.0);
	}

	#[test]
	fn mercator() {
		let [x, y] = lonlat_to_mercator(180.0, MAX_MERCATOR_LAT);
		assert_relative_eq!(x, 20_037_508.342_789_244, epsilon = 1e-6);
		assert_relative_eq!(y, 20_037_508.342_789_244, epsilon = 1e-3);
		assert_relative_eq!(GeoBBox::world().mercator_extent(), 2.0 * 20_037_508.342_789_244, epsilon = 1e-3);
	}
}
