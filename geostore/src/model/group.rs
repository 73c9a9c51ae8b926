use serde::Deserialize;

/// An ordered set of layers served as one composite tile.
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct LayerGroup {
	pub slug: String,
	#[serde(default)]
	pub name: Option<String>,
	/// Layer ids, in drawing order.
	pub layers: Vec<String>,
}

impl LayerGroup {
	pub fn new(slug: &str, layers: &[&str]) -> LayerGroup {
		LayerGroup {
			slug: slug.to_string(),
			name: None,
			layers: layers.iter().map(|s| s.to_string()).collect(),
		}
	}

	/// `name`, falling back to `slug`.
	pub fn display_name(&self) -> &str {
		self.name.as_deref().unwrap_or(&self.slug)
	}
}
