//! From stored WGS84 geometry to encodable tile-local geometry.
//!
//! [`TilePipeline::prepare`] runs project, clip, simplify and orient in that order.
//! Its output can be handed straight to [`crate::vector_tile::VectorTileLayer::from_features`].

mod clip;
mod project;
mod simplify;

pub use clip::{ClipRect, clip_geometry};
pub use project::TileTransform;
pub use simplify::simplify_geometry;

use anyhow::{Result, bail, ensure};
use geo::{CoordsIter, Geometry, GeometryCollection, MultiPolygon, orient::Direction, orient::Orient};
use geostore_core::TileCoord;

/// Per-tile geometry settings.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TilePipeline {
	transform: TileTransform,
	clip: ClipRect,
	tolerance: f64,
}

impl TilePipeline {
	/// `buffer_pixels` grows the clip square on every side, in 256 px tile pixels.
	/// Simplification tolerance is one pixel.
	#[must_use]
	pub fn new(coord: TileCoord, extent: u32, buffer_pixels: f64) -> TilePipeline {
		let transform = TileTransform::new(coord, extent);
		TilePipeline {
			clip: ClipRect::new(transform.extent(), buffer_pixels * transform.pixel()),
			tolerance: transform.pixel(),
			transform,
		}
	}

	#[must_use]
	pub fn with_tolerance(mut self, tolerance_pixels: f64) -> TilePipeline {
		self.tolerance = tolerance_pixels * self.transform.pixel();
		self
	}

	#[must_use]
	pub fn transform(&self) -> &TileTransform {
		&self.transform
	}

	/// Projects, clips, simplifies and orients one geometry.
	///
	/// `Ok(None)` means the geometry does not reach into this tile.
	/// Errors mean the input itself is malformed.
	pub fn prepare(&self, geometry: &Geometry<f64>) -> Result<Option<Geometry<f64>>> {
		validate_lonlat(geometry)?;

		let projected = self.transform.project(geometry);
		let Some(clipped) = clip_geometry(projected, &self.clip) else {
			return Ok(None);
		};
		let simplified = simplify_geometry(clipped, self.tolerance);
		Ok(Some(orient(simplified)))
	}
}

/// Rejects geometry that cannot be placed on the map.
pub fn validate_lonlat(geometry: &Geometry<f64>) -> Result<()> {
	for c in geometry.coords_iter() {
		ensure!(c.x.is_finite() && c.y.is_finite(), "non-finite coordinate ({}, {})", c.x, c.y);
		ensure!(
			(-180.0..=180.0).contains(&c.x) && (-90.0..=90.0).contains(&c.y),
			"coordinate ({}, {}) is outside WGS84 bounds",
			c.x,
			c.y
		);
	}

	match geometry {
		Geometry::LineString(ls) if ls.0.len() < 2 => bail!("line string needs at least 2 coordinates"),
		Geometry::MultiLineString(mls) if mls.0.iter().any(|l| l.0.len() < 2) => {
			bail!("line string needs at least 2 coordinates")
		}
		Geometry::Polygon(p) if p.exterior().0.len() < 4 => bail!("polygon ring needs at least 4 coordinates"),
		Geometry::MultiPolygon(mp) if mp.0.iter().any(|p| p.exterior().0.len() < 4) => {
			bail!("polygon ring needs at least 4 coordinates")
		}
		Geometry::GeometryCollection(gc) => gc.0.iter().try_for_each(validate_lonlat),
		_ => Ok(()),
	}
}

/// Exterior rings get positive shoelace area in y-down tile space, holes negative.
fn orient(geometry: Geometry<f64>) -> Geometry<f64> {
	match geometry {
		Geometry::Polygon(p) => Geometry::Polygon(p.orient(Direction::Default)),
		Geometry::MultiPolygon(mp) => Geometry::MultiPolygon(MultiPolygon::new(
			mp.0.into_iter().map(|p| p.orient(Direction::Default)).collect(),
		)),
		Geometry::GeometryCollection(gc) => {
			Geometry::GeometryCollection(GeometryCollection::new_from(gc.0.into_iter().map(orient).collect()))
		}
		other => other,
	}
}
