//! Default zoom ranges for layers that do not configure them.

use crate::source::{GeometrySource, LayerSummary};
use anyhow::Result;
use geostore_core::EARTH_RADIUS;
use std::{f64::consts::PI, ops::RangeInclusive};

pub const DEFAULT_MAXZOOM: u8 = 14;
pub const DEFAULT_MINZOOM: u8 = 0;
pub const MAX_GUESSED_ZOOM: u8 = 22;

/// Circumference of the Web Mercator world in metres, i.e. the width of the zoom 0 tile.
const WORLD_WIDTH: f64 = 2.0 * PI * EARTH_RADIUS;

/// The zoom at which an average feature spans about one tile.
///
/// Empty layers and layers of zero-size features (points) get [`DEFAULT_MAXZOOM`].
pub fn guess_maxzoom(summary: &LayerSummary) -> u8 {
	if summary.is_empty() || !summary.mean_extent.is_finite() || summary.mean_extent <= 0.0 {
		return DEFAULT_MAXZOOM;
	}

	let zoom = (WORLD_WIDTH / summary.mean_extent).log2().floor();
	if !zoom.is_finite() {
		return DEFAULT_MAXZOOM;
	}
	zoom.clamp(0.0, f64::from(MAX_GUESSED_ZOOM)) as u8
}

pub fn guess_minzoom(summary: &LayerSummary) -> u8 {
	DEFAULT_MINZOOM.min(guess_maxzoom(summary))
}

/// Summarises a layer and guesses both ends of its zoom range.
pub async fn guess_layer_zoom(source: &dyn GeometrySource, layer_id: &str) -> Result<RangeInclusive<u8>> {
	let summary = source.layer_summary(layer_id).await?;
	Ok(guess_minzoom(&summary)..=guess_maxzoom(&summary))
}
