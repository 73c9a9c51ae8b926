use crate::geo::GeoValue;
use anyhow::{Context, Result, anyhow, bail};
use geostore_core::{
	Blob,
	io::{PbfReader, PbfWriter},
};

/// Protobuf encoding of MVT `Value` messages.
pub trait GeoValuePBF {
	fn read(reader: &mut PbfReader<'_>) -> Result<GeoValue>;
	fn to_blob(&self) -> Result<Blob>;
}

impl GeoValuePBF for GeoValue {
	fn read(reader: &mut PbfReader<'_>) -> Result<GeoValue> {
		use GeoValue::*;
		let mut value: Option<GeoValue> = None;

		while reader.has_remaining() {
			value = Some(match reader.read_pbf_key().context("Failed to read PBF key")? {
				(1, 2) => String(reader.read_pbf_string().context("Failed to read string value")?),
				(2, 5) => Float(reader.read_f32().context("Failed to read f32 value")?),
				(3, 1) => Double(reader.read_f64().context("Failed to read f64 value")?),
				(4, 0) => Int(reader.read_varint().context("Failed to read int value")? as i64),
				(5, 0) => UInt(reader.read_varint().context("Failed to read uint value")?),
				(6, 0) => Int(reader.read_svarint().context("Failed to read sint value")?),
				(7, 0) => Bool(reader.read_varint().context("Failed to read bool value")? != 0),
				(f, w) => bail!("Unexpected combination of field number ({f}) and wire type ({w})"),
			});
		}
		value.ok_or_else(|| anyhow!("No value found"))
	}

	fn to_blob(&self) -> Result<Blob> {
		let mut writer = PbfWriter::new();

		match self {
			GeoValue::String(s) => {
				writer.write_pbf_key(1, 2)?;
				writer.write_pbf_string(s).context("Failed to write string value")?;
			}
			GeoValue::Float(f) => {
				writer.write_pbf_key(2, 5)?;
				writer.write_f32(*f).context("Failed to write float value")?;
			}
			GeoValue::Double(f) => {
				writer.write_pbf_key(3, 1)?;
				writer.write_f64(*f).context("Failed to write double value")?;
			}
			GeoValue::UInt(u) => {
				writer.write_pbf_key(5, 0)?;
				writer.write_varint(*u).context("Failed to write uint value")?;
			}
			GeoValue::Int(i) => {
				writer.write_pbf_key(6, 0)?;
				writer.write_svarint(*i).context("Failed to write sint value")?;
			}
			GeoValue::Bool(b) => {
				writer.write_pbf_key(7, 0)?;
				writer.write_varint(u64::from(*b)).context("Failed to write bool value")?;
			}
			GeoValue::Null => bail!("null values cannot be encoded in a vector tile"),
		}

		Ok(writer.into_blob())
	}
}
