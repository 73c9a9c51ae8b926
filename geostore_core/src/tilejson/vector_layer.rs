use anyhow::{Result, ensure};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One entry of TileJSON `vector_layers`: a layer id and its attribute field types.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct VectorLayer {
	pub id: String,
	pub fields: BTreeMap<String, String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub description: Option<String>,
	pub minzoom: u8,
	pub maxzoom: u8,
}

impl VectorLayer {
	pub fn check(&self) -> Result<()> {
		ensure!(!self.id.is_empty(), "vector layer id must not be empty");
		ensure!(
			self.minzoom <= self.maxzoom,
			"vector layer '{}': minzoom ({}) must be <= maxzoom ({})",
			self.id,
			self.minzoom,
			self.maxzoom
		);
		Ok(())
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn check() {
		let mut layer = VectorLayer {
			id: String::from("water"),
			minzoom: 0,
			maxzoom: 14,
			..VectorLayer::default()
		};
		assert!(layer.check().is_ok());
		layer.minzoom = 20;
		assert!(layer.check().is_err());
		layer.minzoom = 0;
		layer.id = String::new();
		assert!(layer.check().is_err());
	}
}
