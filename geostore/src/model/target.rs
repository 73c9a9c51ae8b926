use std::fmt::{self, Display};

/// What a tile or TileJSON request addresses.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Target {
	Layer(String),
	Group(String),
}

impl Target {
	/// Cache scope. Layer ids and group slugs live in separate namespaces.
	pub fn scope(&self) -> String {
		match self {
			Target::Layer(id) => format!("layer/{id}"),
			Target::Group(slug) => format!("group/{slug}"),
		}
	}

	/// URL template of the tiles, relative to the server root.
	pub fn tile_pattern(&self) -> String {
		format!("/{}/tile/{{z}}/{{x}}/{{y}}.pbf", self.scope())
	}

	pub fn tilejson_path(&self) -> String {
		format!("/{}/tilejson", self.scope())
	}
}

impl Display for Target {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.scope())
	}
}
