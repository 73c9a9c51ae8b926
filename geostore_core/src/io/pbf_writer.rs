//! ```rust
//! use geostore_core::io::PbfWriter;
//!
//! let mut writer = PbfWriter::new();
//! writer.write_varint(300).unwrap();
//! assert_eq!(writer.into_blob().into_vec(), vec![0b1010_1100, 0b0000_0010]);
//! ```

use crate::Blob;
use anyhow::{Context, Result};
use byteorder::{LE, WriteBytesExt};
use std::io::Write;

#[derive(Default)]
pub struct PbfWriter {
	buffer: Vec<u8>,
}

impl PbfWriter {
	#[must_use]
	pub fn new() -> PbfWriter {
		PbfWriter { buffer: Vec::new() }
	}

	#[must_use]
	pub fn into_blob(self) -> Blob {
		Blob::from(self.buffer)
	}

	#[must_use]
	pub fn len(&self) -> usize {
		self.buffer.len()
	}

	#[must_use]
	pub fn is_empty(&self) -> bool {
		self.buffer.is_empty()
	}

	pub fn write_varint(&mut self, mut value: u64) -> Result<()> {
		while value >= 0x80 {
			self.buffer.write_u8(((value & 0x7F) as u8) | 0x80)?;
			value >>= 7;
		}
		self.buffer.write_u8(value as u8)?;
		Ok(())
	}

	/// Zigzag encoding: small negative numbers stay small.
	pub fn write_svarint(&mut self, value: i64) -> Result<()> {
		self.write_varint(((value << 1) ^ (value >> 63)) as u64)
	}

	pub fn write_f32(&mut self, value: f32) -> Result<()> {
		Ok(self.buffer.write_f32::<LE>(value)?)
	}

	pub fn write_f64(&mut self, value: f64) -> Result<()> {
		Ok(self.buffer.write_f64::<LE>(value)?)
	}

	pub fn write_pbf_key(&mut self, field_number: u32, wire_type: u8) -> Result<()> {
		self
			.write_varint((u64::from(field_number) << 3) | u64::from(wire_type))
			.context("Failed to write PBF key")
	}

	pub fn write_pbf_packed_uint32(&mut self, data: &[u32]) -> Result<()> {
		let mut writer = PbfWriter::new();
		for &value in data {
			writer
				.write_varint(u64::from(value))
				.context("Failed to write packed value")?;
		}
		self.write_pbf_blob(&writer.into_blob())
	}

	pub fn write_pbf_string(&mut self, text: &str) -> Result<()> {
		self.write_pbf_slice(text.as_bytes())
	}

	pub fn write_pbf_blob(&mut self, blob: &Blob) -> Result<()> {
		self.write_pbf_slice(blob.as_slice())
	}

	fn write_pbf_slice(&mut self, data: &[u8]) -> Result<()> {
		self
			.write_varint(data.len() as u64)
			.context("Failed to write length prefix")?;
		self.buffer.write_all(data)?;
		Ok(())
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn bytes(f: impl FnOnce(&mut PbfWriter) -> Result<()>) -> Vec<u8> {
		let mut writer = PbfWriter::new();
		f(&mut writer).unwrap();
		writer.into_blob().into_vec()
	}

	#[test]
	fn varint() {
		assert_eq!(bytes(|w| w.write_varint(0)), vec![0x00]);
		assert_eq!(bytes(|w| w.write_varint(127)), vec![0x7F]);
		assert_eq!(bytes(|w| w.write_varint(1025)), vec![0b1000_0001, 0b0000_1000]);
		assert_eq!(bytes(|w| w.write_varint(u64::MAX)).len(), 10);
	}

	#[test]
	fn svarint() {
		assert_eq!(bytes(|w| w.write_svarint(0)), vec![0]);
		assert_eq!(bytes(|w| w.write_svarint(-1)), vec![1]);
		assert_eq!(bytes(|w| w.write_svarint(1)), vec![2]);
		assert_eq!(bytes(|w| w.write_svarint(-2)), vec![3]);
	}

	#[test]
	fn pbf_key_and_string() {
		assert_eq!(bytes(|w| w.write_pbf_key(3, 2)), vec![0x1A]);
		assert_eq!(bytes(|w| w.write_pbf_key(15, 0)), vec![0x78]);
		assert_eq!(bytes(|w| w.write_pbf_string("abc")), vec![3, b'a', b'b', b'c']);
	}

	#[test]
	fn packed_uint32() {
		assert_eq!(bytes(|w| w.write_pbf_packed_uint32(&[1, 300])), vec![3, 1, 0xAC, 0x02]);
		assert_eq!(bytes(|w| w.write_pbf_packed_uint32(&[])), vec![0]);
	}

	#[test]
	fn floats_are_little_endian() {
		assert_eq!(bytes(|w| w.write_f32(1.0)), vec![0x00, 0x00, 0x80, 0x3F]);
		assert_eq!(bytes(|w| w.write_f64(1.0)), vec![0, 0, 0, 0, 0, 0, 0xF0, 0x3F]);
	}
}
