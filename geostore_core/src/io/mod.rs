//! Protocol Buffers primitives used by the MVT encoder.
//!
//! [`PbfWriter`] appends varints, keys and length-delimited fields to an in-memory buffer.
//! [`PbfReader`] walks a byte slice and hands out bounded sub-readers for embedded messages.

mod pbf_reader;
mod pbf_writer;

pub use pbf_reader::*;
pub use pbf_writer::*;

/// Wire type of a varint field.
pub const WIRE_VARINT: u8 = 0;
/// Wire type of a 64-bit fixed field.
pub const WIRE_FIXED64: u8 = 1;
/// Wire type of a length-delimited field.
pub const WIRE_LEN: u8 = 2;
/// Wire type of a 32-bit fixed field.
pub const WIRE_FIXED32: u8 = 5;
