//! [`Blob`] wraps the bytes of one encoded tile or protobuf message.
//!
//! ```rust
//! use geostore_core::Blob;
//!
//! let blob = Blob::from(vec![0x1a, 0x00]);
//! assert_eq!(blob.len(), 2);
//! assert!(!blob.is_empty());
//! ```

use std::fmt::Debug;

#[derive(Clone, Default, PartialEq, Eq, Hash)]
pub struct Blob(Vec<u8>);

impl Blob {
	#[must_use]
	pub fn new_empty() -> Blob {
		Blob(Vec::new())
	}

	#[must_use]
	pub fn as_slice(&self) -> &[u8] {
		self.0.as_ref()
	}

	#[must_use]
	pub fn into_vec(self) -> Vec<u8> {
		self.0
	}

	/// Appends raw bytes. Two encoded MVT tiles concatenated are again a valid tile.
	pub fn append(&mut self, other: &Blob) {
		self.0.extend_from_slice(other.as_slice());
	}

	#[must_use]
	pub fn len(&self) -> usize {
		self.0.len()
	}

	#[must_use]
	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}
}

impl From<Vec<u8>> for Blob {
	fn from(item: Vec<u8>) -> Self {
		Blob(item)
	}
}

impl From<&[u8]> for Blob {
	fn from(item: &[u8]) -> Self {
		Blob(item.to_vec())
	}
}

impl From<&str> for Blob {
	fn from(item: &str) -> Self {
		Blob(item.as_bytes().to_vec())
	}
}

impl From<String> for Blob {
	fn from(item: String) -> Self {
		Blob(item.into_bytes())
	}
}

impl Debug for Blob {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		let head: Vec<String> = self.0.iter().take(16).map(|b| format!("{b:02x}")).collect();
		let ellipsis = if self.0.len() > 16 { " …" } else { "" };
		write!(f, "Blob({}): {}{ellipsis}", self.0.len(), head.join(" "))
	}
}
