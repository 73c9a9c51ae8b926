use crate::Blob;
use anyhow::{Context, Result, bail, ensure};
use byteorder::{LE, ReadBytesExt};
use std::io::{Cursor, Read};

/// Reads protobuf fields from a borrowed byte slice.
pub struct PbfReader<'a> {
	cursor: Cursor<&'a [u8]>,
}

impl<'a> PbfReader<'a> {
	#[must_use]
	pub fn new(data: &'a [u8]) -> PbfReader<'a> {
		PbfReader {
			cursor: Cursor::new(data),
		}
	}

	#[must_use]
	pub fn len(&self) -> u64 {
		self.cursor.get_ref().len() as u64
	}

	#[must_use]
	pub fn is_empty(&self) -> bool {
		self.len() == 0
	}

	#[must_use]
	pub fn position(&self) -> u64 {
		self.cursor.position()
	}

	#[must_use]
	pub fn has_remaining(&self) -> bool {
		self.position() < self.len()
	}

	pub fn read_varint(&mut self) -> Result<u64> {
		let mut value = 0;
		let mut shift = 0;
		loop {
			let byte = self.cursor.read_u8()?;
			value |= (u64::from(byte) & 0x7F) << shift;
			if byte & 0x80 == 0 {
				break;
			}
			shift += 7;
			if shift >= 70 {
				bail!("Varint too long");
			}
		}
		Ok(value)
	}

	pub fn read_svarint(&mut self) -> Result<i64> {
		let value = self.read_varint()? as i64;
		Ok((value >> 1) ^ -(value & 1))
	}

	pub fn read_f32(&mut self) -> Result<f32> {
		Ok(self.cursor.read_f32::<LE>()?)
	}

	pub fn read_f64(&mut self) -> Result<f64> {
		Ok(self.cursor.read_f64::<LE>()?)
	}

	/// Returns `(field_number, wire_type)`.
	pub fn read_pbf_key(&mut self) -> Result<(u32, u8)> {
		let value = self.read_varint().context("Failed to read varint for PBF key")?;
		Ok(((value >> 3) as u32, (value & 0x07) as u8))
	}

	/// Reads a length prefix and returns a reader bounded to that many bytes.
	/// The parent reader skips past the embedded message.
	pub fn get_pbf_sub_reader(&mut self) -> Result<PbfReader<'a>> {
		let slice = self.read_pbf_slice().context("Failed to get sub-reader")?;
		Ok(PbfReader::new(slice))
	}

	pub fn read_pbf_packed_uint32(&mut self) -> Result<Vec<u32>> {
		let mut reader = self
			.get_pbf_sub_reader()
			.context("Failed to get PBF sub-reader for packed uint32")?;
		let mut values = Vec::new();
		while reader.has_remaining() {
			values.push(u32::try_from(
				reader.read_varint().context("Failed to read varint for packed uint32")?,
			)?);
		}
		Ok(values)
	}

	pub fn read_pbf_string(&mut self) -> Result<String> {
		let slice = self.read_pbf_slice().context("Failed to read PBF string")?;
		Ok(String::from_utf8(slice.to_vec())?)
	}

	pub fn read_pbf_blob(&mut self) -> Result<Blob> {
		Ok(Blob::from(self.read_pbf_slice().context("Failed to read PBF blob")?))
	}

	fn read_pbf_slice(&mut self) -> Result<&'a [u8]> {
		let length = self.read_varint().context("Failed to read varint for length")?;
		let start = self.position();
		let end = start.checked_add(length).context("length overflow")?;
		ensure!(end <= self.len(), "Requested length exceeds remaining data");
		let data: &'a [u8] = *self.cursor.get_ref();
		self.cursor.set_position(end);
		Ok(&data[start as usize..end as usize])
	}

	/// Skips one field value of the given wire type.
	pub fn skip_field(&mut self, wire_type: u8) -> Result<()> {
		match wire_type {
			0 => {
				self.read_varint()?;
			}
			1 => {
				let mut buf = [0u8; 8];
				self.cursor.read_exact(&mut buf)?;
			}
			2 => {
				self.read_pbf_slice()?;
			}
			5 => {
				let mut buf = [0u8; 4];
				self.cursor.read_exact(&mut buf)?;
			}
			w => bail!("Unsupported wire type {w}"),
		}
		Ok(())
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::io::PbfWriter;

	#[test]
	fn read_varint() -> Result<()> {
		let mut reader = PbfReader::new(&[0b1010_1100, 0b0000_0010]);
		assert_eq!(reader.read_varint()?, 300);
		assert!(!reader.has_remaining());
		Ok(())
	}

	#[test]
	fn read_varint_too_long() {
		let data = [0x80; 11];
		let mut reader = PbfReader::new(&data);
		assert!(reader.read_varint().is_err());
	}

	#[test]
	fn read_svarint() -> Result<()> {
		let mut reader = PbfReader::new(&[1, 2, 3]);
		assert_eq!(reader.read_svarint()?, -1);
		assert_eq!(reader.read_svarint()?, 1);
		assert_eq!(reader.read_svarint()?, -2);
		Ok(())
	}

	#[test]
	fn sub_reader_is_bounded() -> Result<()> {
		let mut reader = PbfReader::new(&[3, 1, 2, 3, 9]);
		let mut sub = reader.get_pbf_sub_reader()?;
		assert_eq!(sub.len(), 3);
		assert_eq!(sub.read_varint()?, 1);
		assert_eq!(sub.read_varint()?, 2);
		assert_eq!(sub.read_varint()?, 3);
		assert!(sub.read_varint().is_err());
		assert_eq!(reader.read_varint()?, 9);
		Ok(())
	}

	#[test]
	fn sub_reader_out_of_bounds() {
		let mut reader = PbfReader::new(&[5, 1, 2]);
		assert!(reader.get_pbf_sub_reader().is_err());
	}

	#[test]
	fn writer_output_reads_back() -> Result<()> {
		let mut writer = PbfWriter::new();
		writer.write_pbf_key(1, 2)?;
		writer.write_pbf_string("layer")?;
		writer.write_pbf_key(2, 2)?;
		writer.write_pbf_packed_uint32(&[0, 1, 70_000])?;
		writer.write_pbf_key(3, 1)?;
		writer.write_f64(2.5)?;
		let blob = writer.into_blob();

		let mut reader = PbfReader::new(blob.as_slice());
		assert_eq!(reader.read_pbf_key()?, (1, 2));
		assert_eq!(reader.read_pbf_string()?, "layer");
		assert_eq!(reader.read_pbf_key()?, (2, 2));
		assert_eq!(reader.read_pbf_packed_uint32()?, vec![0, 1, 70_000]);
		assert_eq!(reader.read_pbf_key()?, (3, 1));
		assert_eq!(reader.read_f64()?, 2.5);
		assert!(!reader.has_remaining());
		Ok(())
	}

	#[test]
	fn skip_field() -> Result<()> {
		let mut reader = PbfReader::new(&[0x96, 0x01, 2, 7, 7, 0, 0, 0x80, 0x3F, 42]);
		reader.skip_field(0)?;
		reader.skip_field(2)?;
		reader.skip_field(5)?;
		assert_eq!(reader.read_varint()?, 42);
		assert!(reader.skip_field(3).is_err());
		Ok(())
	}
}
