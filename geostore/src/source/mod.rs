//! Where tile features come from.
//!
//! [`GeometrySource`] is the only storage capability tile generation relies on:
//! a bounding-box query with a property predicate and a result cap.

mod memory;
mod summary;

pub use memory::InMemorySource;
pub use summary::LayerSummary;

use crate::model::FeatureFilter;
use anyhow::Result;
use async_trait::async_trait;
use geostore_core::GeoBBox;
use geostore_geometry::GeoFeature;
use std::fmt::Debug;

#[derive(Clone, Debug, PartialEq)]
pub struct FeatureQuery {
	pub layer_id: String,
	pub bbox: GeoBBox,
	pub filter: Option<FeatureFilter>,
	/// Keep at most this many features after ordering by id.
	pub limit: Option<usize>,
}

impl FeatureQuery {
	pub fn new(layer_id: &str, bbox: GeoBBox) -> FeatureQuery {
		FeatureQuery {
			layer_id: layer_id.to_string(),
			bbox,
			filter: None,
			limit: None,
		}
	}

	pub fn with_filter(mut self, filter: Option<FeatureFilter>) -> FeatureQuery {
		self.filter = filter;
		self
	}

	pub fn with_limit(mut self, limit: usize) -> FeatureQuery {
		self.limit = Some(limit);
		self
	}
}

#[async_trait]
pub trait GeometrySource: Debug + Send + Sync {
	/// Features of a layer whose envelope intersects `query.bbox` and that pass `query.filter`,
	/// ordered by ascending feature id and truncated to `query.limit`.
	async fn query_by_bbox(&self, query: &FeatureQuery) -> Result<Vec<GeoFeature>>;

	async fn layer_summary(&self, layer_id: &str) -> Result<LayerSummary>;

	/// Changes whenever the layer's features change.
	async fn layer_version(&self, layer_id: &str) -> Result<u64>;
}
