use super::{Layer, LayerGroup, Target};
use crate::GeostoreError;
use anyhow::Result;
use std::collections::BTreeMap;

/// All configured layers and groups, addressable by id and slug.
///
/// Sub-layers of extra geometries are not addressable on their own. They follow their parent
/// layer wherever it is resolved.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Catalog {
	layers: BTreeMap<String, Layer>,
	extras: BTreeMap<String, Vec<Layer>>,
	groups: BTreeMap<String, LayerGroup>,
}

impl Catalog {
	pub fn new() -> Catalog {
		Catalog::default()
	}

	/// Layer ids and sub-layer ids share one namespace.
	pub fn add_layer(&mut self, layer: Layer) -> Result<()> {
		for property in &layer.schema {
			property.check()?;
		}

		let extras = layer.extra_layers();
		let ids: Vec<&str> = std::iter::once(layer.id.as_str())
			.chain(extras.iter().map(|l| l.id.as_str()))
			.collect();
		for (index, id) in ids.iter().enumerate() {
			if ids[..index].contains(id) || self.contains_id(id) {
				return Err(GeostoreError::ValidationFailure(format!("layer '{id}' is defined twice")).into());
			}
		}

		self.extras.insert(layer.id.clone(), extras);
		self.layers.insert(layer.id.clone(), layer);
		Ok(())
	}

	fn contains_id(&self, id: &str) -> bool {
		self.layers.contains_key(id) || self.extras.values().flatten().any(|l| l.id == id)
	}

	/// Every referenced layer must already be known.
	pub fn add_group(&mut self, group: LayerGroup) -> Result<()> {
		if self.groups.contains_key(&group.slug) {
			return Err(GeostoreError::ValidationFailure(format!("group '{}' is defined twice", group.slug)).into());
		}
		if let Some(missing) = group.layers.iter().find(|id| !self.layers.contains_key(*id)) {
			return Err(GeostoreError::ValidationFailure(format!(
				"group '{}' references unknown layer '{missing}'",
				group.slug
			))
			.into());
		}
		self.groups.insert(group.slug.clone(), group);
		Ok(())
	}

	pub fn layer(&self, id: &str) -> Result<&Layer> {
		self
			.layers
			.get(id)
			.ok_or_else(|| GeostoreError::not_found("layer", id).into())
	}

	pub fn group(&self, slug: &str) -> Result<&LayerGroup> {
		self
			.groups
			.get(slug)
			.ok_or_else(|| GeostoreError::not_found("group", slug).into())
	}

	pub fn layers(&self) -> impl Iterator<Item = &Layer> {
		self.layers.values()
	}

	pub fn groups(&self) -> impl Iterator<Item = &LayerGroup> {
		self.groups.values()
	}

	/// Constituent layers of `target`, in group order, each followed by its extra geometry sub-layers.
	pub fn resolve(&self, target: &Target) -> Result<Vec<&Layer>> {
		let ids: Vec<&str> = match target {
			Target::Layer(id) => vec![id.as_str()],
			Target::Group(slug) => self.group(slug)?.layers.iter().map(String::as_str).collect(),
		};

		let mut layers = Vec::with_capacity(ids.len());
		for id in ids {
			layers.push(self.layer(id)?);
			layers.extend(self.extras.get(id).into_iter().flatten());
		}
		Ok(layers)
	}

	/// Display name of `target`.
	pub fn name_of(&self, target: &Target) -> Result<String> {
		Ok(match target {
			Target::Layer(id) => self.layer(id)?.name.clone(),
			Target::Group(slug) => self.group(slug)?.display_name().to_string(),
		})
	}
}
