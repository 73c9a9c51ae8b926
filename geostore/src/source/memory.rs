use super::{FeatureQuery, GeometrySource, LayerSummary};
use crate::{
	GeostoreError,
	model::{Layer, SchemaProperty},
};
use anyhow::{Context, Result};
use async_trait::async_trait;
use geo::BoundingRect;
use geostore_core::GeoBBox;
use geostore_geometry::{GeoFeature, GeometryType, parse_geojson};
use rstar::{AABB, RTree, RTreeObject};
use std::{
	collections::{BTreeMap, HashMap},
	fmt::{self, Debug},
	path::Path,
	sync::{
		RwLock, RwLockReadGuard, RwLockWriteGuard,
		atomic::{AtomicU64, Ordering},
	},
};

/// R-tree entry: a feature id and its envelope.
#[derive(Clone, Debug, PartialEq)]
struct IndexedFeature {
	id: u64,
	bbox: GeoBBox,
}

impl RTreeObject for IndexedFeature {
	type Envelope = AABB<[f64; 2]>;

	fn envelope(&self) -> Self::Envelope {
		AABB::from_corners([self.bbox.x_min, self.bbox.y_min], [self.bbox.x_max, self.bbox.y_max])
	}
}

#[derive(Default)]
struct LayerStore {
	type_geom: Option<GeometryType>,
	schema: Vec<SchemaProperty>,
	index: RTree<IndexedFeature>,
	features: BTreeMap<u64, (GeoFeature, GeoBBox)>,
	version: u64,
}

impl LayerStore {
	fn validate(&self, feature: &GeoFeature) -> Result<GeoBBox> {
		if let Some(expected) = self.type_geom {
			let actual = GeometryType::of(&feature.geometry);
			if actual != Some(expected) {
				let actual = actual.map_or("unsupported geometry", |t| t.as_str());
				return Err(GeostoreError::ValidationFailure(format!("expected {expected} geometry, got {actual}")).into());
			}
		}

		for property in &self.schema {
			if let Some(value) = feature.properties.get(&property.slug) {
				if !property.kind.accepts(value) {
					return Err(GeostoreError::ValidationFailure(format!(
						"property '{}' must be of type {:?}, got {value:?}",
						property.slug, property.kind
					))
					.into());
				}
			}
		}

		let rect = feature
			.geometry
			.bounding_rect()
			.ok_or_else(|| GeostoreError::ValidationFailure(String::from("feature geometry is empty")))?;
		GeoBBox::new(rect.min().x, rect.min().y, rect.max().x, rect.max().y)
			.map_err(|err| GeostoreError::ValidationFailure(format!("feature geometry has invalid bounds: {err}")).into())
	}

	fn insert(&mut self, id: u64, mut feature: GeoFeature, bbox: GeoBBox) {
		feature.set_id(id);
		self.index.insert(IndexedFeature { id, bbox });
		self.features.insert(id, (feature, bbox));
	}
}

impl Debug for LayerStore {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("LayerStore")
			.field("type_geom", &self.type_geom)
			.field("features", &self.features.len())
			.field("version", &self.version)
			.finish()
	}
}

/// Keeps every layer's features in memory, indexed by an R-tree over their envelopes.
///
/// Feature ids are assigned sequentially across all layers, starting at 1.
#[derive(Debug, Default)]
pub struct InMemorySource {
	layers: RwLock<HashMap<String, LayerStore>>,
	next_id: AtomicU64,
	queries: AtomicU64,
}

impl InMemorySource {
	pub fn new() -> InMemorySource {
		InMemorySource::default()
	}

	/// Creates the stores of the layer and of its extra geometries, or updates their geometry type
	/// and schema if they exist.
	pub fn register_layer(&self, layer: &Layer) -> Result<()> {
		let extras = layer.extra_layers();
		let mut layers = self.write()?;
		for layer in std::iter::once(layer).chain(&extras) {
			let store = layers.entry(layer.id.clone()).or_default();
			store.type_geom = layer.type_geom;
			store.schema = layer.schema.clone();
		}
		Ok(())
	}

	pub fn insert_feature(&self, layer_id: &str, feature: GeoFeature) -> Result<u64> {
		Ok(self.insert_features(layer_id, vec![feature])?[0])
	}

	/// Inserts all features or none of them. Returns the assigned ids.
	pub fn insert_features(&self, layer_id: &str, features: Vec<GeoFeature>) -> Result<Vec<u64>> {
		let mut layers = self.write()?;
		let store = layers
			.get_mut(layer_id)
			.ok_or_else(|| GeostoreError::not_found("layer", layer_id))?;

		let bboxes = features
			.iter()
			.enumerate()
			.map(|(index, feature)| store.validate(feature).with_context(|| format!("feature {index} of layer '{layer_id}'")))
			.collect::<Result<Vec<GeoBBox>>>()?;

		let mut ids = Vec::with_capacity(features.len());
		for (feature, bbox) in features.into_iter().zip(bboxes) {
			let id = self.next_id.fetch_add(1, Ordering::Relaxed) + 1;
			store.insert(id, feature, bbox);
			ids.push(id);
		}
		store.version += 1;

		Ok(ids)
	}

	pub fn load_geojson(&self, layer_id: &str, json: &str) -> Result<usize> {
		let features = parse_geojson(json).with_context(|| format!("Failed to parse GeoJSON for layer '{layer_id}'"))?;
		Ok(self.insert_features(layer_id, features)?.len())
	}

	pub fn load_geojson_path(&self, layer_id: &str, path: &Path) -> Result<usize> {
		let json = std::fs::read_to_string(path).with_context(|| format!("Failed to read {path:?}"))?;
		let count = self.load_geojson(layer_id, &json)?;
		log::info!("loaded {count} features into layer '{layer_id}' from {path:?}");
		Ok(count)
	}

	pub fn remove_feature(&self, layer_id: &str, id: u64) -> Result<bool> {
		let mut layers = self.write()?;
		let store = layers
			.get_mut(layer_id)
			.ok_or_else(|| GeostoreError::not_found("layer", layer_id))?;

		let Some((_, bbox)) = store.features.remove(&id) else {
			return Ok(false);
		};
		store.index.remove(&IndexedFeature { id, bbox });
		store.version += 1;
		Ok(true)
	}

	/// Deletes all features of a layer and returns how many there were.
	pub fn clear_layer(&self, layer_id: &str) -> Result<usize> {
		let mut layers = self.write()?;
		let store = layers
			.get_mut(layer_id)
			.ok_or_else(|| GeostoreError::not_found("layer", layer_id))?;

		let count = store.features.len();
		store.features.clear();
		store.index = RTree::new();
		store.version += 1;
		Ok(count)
	}

	pub fn feature_count(&self, layer_id: &str) -> Result<usize> {
		let layers = self.read()?;
		Ok(Self::store(&layers, layer_id)?.features.len())
	}

	/// Number of bbox queries served so far.
	pub fn query_count(&self) -> u64 {
		self.queries.load(Ordering::Relaxed)
	}

	fn read(&self) -> Result<RwLockReadGuard<'_, HashMap<String, LayerStore>>> {
		self
			.layers
			.read()
			.map_err(|_| GeostoreError::StorageFailure(String::from("feature store lock is poisoned")).into())
	}

	fn write(&self) -> Result<RwLockWriteGuard<'_, HashMap<String, LayerStore>>> {
		self
			.layers
			.write()
			.map_err(|_| GeostoreError::StorageFailure(String::from("feature store lock is poisoned")).into())
	}

	fn store<'a>(layers: &'a HashMap<String, LayerStore>, layer_id: &str) -> Result<&'a LayerStore> {
		layers
			.get(layer_id)
			.ok_or_else(|| GeostoreError::not_found("layer", layer_id).into())
	}
}

#[async_trait]
impl GeometrySource for InMemorySource {
	async fn query_by_bbox(&self, query: &FeatureQuery) -> Result<Vec<GeoFeature>> {
		let layers = self.read()?;
		let store = Self::store(&layers, &query.layer_id)?;
		self.queries.fetch_add(1, Ordering::Relaxed);

		let bbox = &query.bbox;
		let envelope = AABB::from_corners([bbox.x_min, bbox.y_min], [bbox.x_max, bbox.y_max]);
		let mut ids: Vec<u64> = store
			.index
			.locate_in_envelope_intersecting(&envelope)
			.map(|entry| entry.id)
			.collect();
		ids.sort_unstable();

		let features: Vec<GeoFeature> = ids
			.iter()
			.filter_map(|id| store.features.get(id).map(|(feature, _)| feature))
			.filter(|feature| query.filter.as_ref().is_none_or(|filter| filter.matches(&feature.properties)))
			.take(query.limit.unwrap_or(usize::MAX))
			.cloned()
			.collect();

		log::trace!(
			"query on layer '{}' in {bbox:?} returned {} features",
			query.layer_id,
			features.len()
		);
		Ok(features)
	}

	async fn layer_summary(&self, layer_id: &str) -> Result<LayerSummary> {
		let layers = self.read()?;
		let store = Self::store(&layers, layer_id)?;
		Ok(LayerSummary::from_features(
			store.features.values().map(|(feature, bbox)| (feature, *bbox)),
		))
	}

	async fn layer_version(&self, layer_id: &str) -> Result<u64> {
		let layers = self.read()?;
		Ok(Self::store(&layers, layer_id)?.version)
	}
}
