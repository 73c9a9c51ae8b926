use super::layer::VectorTileLayer;
use anyhow::{Context, Result};
use geostore_core::{
	Blob,
	io::{PbfReader, PbfWriter},
};

/// A whole tile: a sequence of layers (MVT field 3).
#[derive(Clone, Debug, Default, PartialEq)]
pub struct VectorTile {
	pub layers: Vec<VectorTileLayer>,
}

impl VectorTile {
	#[must_use]
	pub fn new(layers: Vec<VectorTileLayer>) -> VectorTile {
		VectorTile { layers }
	}

	pub fn from_blob(blob: &Blob) -> Result<VectorTile> {
		let mut reader = PbfReader::new(blob.as_slice());

		let mut tile = VectorTile::default();
		while reader.has_remaining() {
			match reader.read_pbf_key().context("Failed to read PBF key")? {
				(3, 2) => tile.layers.push(
					VectorTileLayer::read(&mut reader.get_pbf_sub_reader()?).context("Failed to read VectorTileLayer")?,
				),
				(_, w) => reader.skip_field(w).context("Failed to skip unknown tile field")?,
			}
		}

		Ok(tile)
	}

	pub fn to_blob(&self) -> Result<Blob> {
		let mut writer = PbfWriter::new();

		for layer in &self.layers {
			writer.write_pbf_key(3, 2)?;
			writer
				.write_pbf_blob(&layer.to_blob().context("Failed to convert VectorTileLayer to blob")?)
				.context("Failed to write PBF blob")?;
		}

		Ok(writer.into_blob())
	}

	#[must_use]
	pub fn find_layer(&self, name: &str) -> Option<&VectorTileLayer> {
		self.layers.iter().find(|layer| layer.name == name)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn concatenated_tiles_decode_as_one() -> Result<()> {
		let a = VectorTile::new(vec![VectorTileLayer::new_standard("a")]).to_blob()?;
		let b = VectorTile::new(vec![VectorTileLayer::new_standard("b")]).to_blob()?;
		let mut joined = a.clone();
		joined.append(&b);

		let tile = VectorTile::from_blob(&joined)?;
		assert_eq!(tile.layers.len(), 2);
		assert!(tile.find_layer("a").is_some());
		assert!(tile.find_layer("b").is_some());
		assert!(tile.find_layer("c").is_none());
		Ok(())
	}

	#[test]
	fn empty_blob_is_empty_tile() -> Result<()> {
		assert_eq!(VectorTile::from_blob(&Blob::new_empty())?, VectorTile::default());
		assert!(VectorTile::default().to_blob()?.is_empty());
		Ok(())
	}
}
