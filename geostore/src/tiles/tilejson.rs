use super::zoom::{guess_maxzoom, guess_minzoom};
use crate::{
	GeostoreError,
	model::{Catalog, Layer, Target},
	source::{GeometrySource, LayerSummary},
};
use anyhow::Result;
use futures::future::try_join_all;
use geostore_core::{
	GeoBBox,
	tilejson::{TileJSON, VectorLayer},
};
use std::{collections::BTreeMap, sync::Arc};

/// Where a request came from, used when no tile hostnames are configured.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RequestHost {
	pub scheme: String,
	pub host: Option<String>,
}

impl RequestHost {
	pub fn new(scheme: &str, host: Option<&str>) -> RequestHost {
		RequestHost {
			scheme: scheme.to_string(),
			host: host.map(str::to_string),
		}
	}

	pub fn base_url(&self) -> Option<String> {
		self.host.as_ref().map(|host| format!("{}://{host}", self.scheme))
	}
}

#[derive(Clone, Debug)]
pub struct TileJsonGenerator {
	catalog: Arc<Catalog>,
	source: Arc<dyn GeometrySource>,
	hostnames: Vec<String>,
	max_tile_zoom: u8,
}

impl TileJsonGenerator {
	pub fn new(catalog: Arc<Catalog>, source: Arc<dyn GeometrySource>, max_tile_zoom: u8) -> TileJsonGenerator {
		TileJsonGenerator {
			catalog,
			source,
			hostnames: Vec::new(),
			max_tile_zoom,
		}
	}

	/// Absolute URL prefixes emitted in `tiles`, in this order, instead of the request host.
	pub fn with_hostnames(mut self, hostnames: Vec<String>) -> TileJsonGenerator {
		self.hostnames = hostnames;
		self
	}

	/// One prefix per configured hostname, or the request's own origin.
	///
	/// A hostname without a scheme inherits the request's scheme.
	pub fn base_urls(&self, host: &RequestHost) -> Result<Vec<String>> {
		if !self.hostnames.is_empty() {
			return Ok(self
				.hostnames
				.iter()
				.map(|h| {
					let h = h.trim_end_matches('/');
					if h.contains("://") {
						h.to_string()
					} else {
						format!("{}://{h}", host.scheme)
					}
				})
				.collect());
		}
		Ok(vec![host.base_url().ok_or(GeostoreError::MissingHost)?])
	}

	pub async fn build_tilejson(&self, target: &Target, host: &RequestHost) -> Result<TileJSON> {
		let layers = self.catalog.resolve(target)?;
		let base_urls = self.base_urls(host)?;

		let summaries = try_join_all(layers.iter().map(|layer| self.source.layer_summary(&layer.id))).await?;

		let mut tilejson = TileJSON::new(&self.catalog.name_of(target)?);
		tilejson.tiles = base_urls
			.iter()
			.map(|base| format!("{base}{}", target.tile_pattern()))
			.collect();
		tilejson.attribution = join_distinct(layers.iter().filter_map(|l| l.settings.attribution.as_deref()));
		tilejson.description = match target {
			Target::Layer(_) => layers.first().and_then(|l| l.settings.description.clone()),
			Target::Group(_) => None,
		};

		tilejson.vector_layers = layers
			.iter()
			.zip(&summaries)
			.map(|(layer, summary)| self.vector_layer(layer, summary))
			.collect();

		if let (Some(min), Some(max)) = (
			tilejson.vector_layers.iter().map(|l| l.minzoom).min(),
			tilejson.vector_layers.iter().map(|l| l.maxzoom).max(),
		) {
			tilejson.minzoom = min;
			tilejson.maxzoom = max;
		}

		let bounds = summaries
			.iter()
			.filter_map(|s| s.bbox)
			.reduce(|a, b| a.extended(&b))
			.unwrap_or_else(GeoBBox::world);
		tilejson.set_bounds(&bounds);

		tilejson.check()?;
		Ok(tilejson)
	}

	/// Configured zooms win over guessed ones; both are capped by the global ceiling.
	pub fn zoom_range(&self, layer: &Layer, summary: &LayerSummary) -> (u8, u8) {
		let maxzoom = layer
			.settings
			.maxzoom
			.unwrap_or_else(|| guess_maxzoom(summary))
			.min(self.max_tile_zoom);
		let minzoom = layer
			.settings
			.minzoom
			.unwrap_or_else(|| guess_minzoom(summary))
			.min(maxzoom);
		(minzoom, maxzoom)
	}

	fn vector_layer(&self, layer: &Layer, summary: &LayerSummary) -> VectorLayer {
		let (minzoom, maxzoom) = self.zoom_range(layer, summary);
		let fields: BTreeMap<String, String> = if layer.schema.is_empty() {
			summary.fields.clone()
		} else {
			layer
				.schema
				.iter()
				.filter_map(|p| Some((p.slug.clone(), p.kind.tilejson_type()?.to_string())))
				.collect()
		};

		VectorLayer {
			id: layer.id.clone(),
			fields,
			description: layer.settings.description.clone(),
			minzoom,
			maxzoom,
		}
	}
}

fn join_distinct<'a>(values: impl Iterator<Item = &'a str>) -> Option<String> {
	let mut seen: Vec<&str> = Vec::new();
	for value in values {
		if !value.is_empty() && !seen.contains(&value) {
			seen.push(value);
		}
	}
	(!seen.is_empty()).then(|| seen.join(", "))
}
