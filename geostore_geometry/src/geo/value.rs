use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Number, Value as JsonValue};
use std::{
	cmp::Ordering,
	fmt::{Debug, Display},
	hash::Hash,
};

/// A scalar feature property value.
#[derive(Clone, PartialEq)]
pub enum GeoValue {
	Bool(bool),
	Double(f64),
	Float(f32),
	Int(i64),
	Null,
	String(String),
	UInt(u64),
}

impl GeoValue {
	/// Converts a JSON scalar. Arrays and objects have no tile representation and yield `None`.
	#[must_use]
	pub fn from_json(value: &JsonValue) -> Option<GeoValue> {
		match value {
			JsonValue::Null => Some(GeoValue::Null),
			JsonValue::Bool(b) => Some(GeoValue::Bool(*b)),
			JsonValue::Number(n) => Some(GeoValue::from_number(n)),
			JsonValue::String(s) => Some(GeoValue::String(s.clone())),
			JsonValue::Array(_) | JsonValue::Object(_) => None,
		}
	}

	fn from_number(n: &Number) -> GeoValue {
		if let Some(u) = n.as_u64() {
			GeoValue::UInt(u)
		} else if let Some(i) = n.as_i64() {
			GeoValue::Int(i)
		} else {
			GeoValue::Double(n.as_f64().unwrap_or(f64::NAN))
		}
	}

	#[must_use]
	pub fn to_json(&self) -> JsonValue {
		match self {
			GeoValue::Bool(v) => JsonValue::Bool(*v),
			GeoValue::Double(v) => Number::from_f64(*v).map_or(JsonValue::Null, JsonValue::Number),
			GeoValue::Float(v) => Number::from_f64(f64::from(*v)).map_or(JsonValue::Null, JsonValue::Number),
			GeoValue::Int(v) => JsonValue::from(*v),
			GeoValue::Null => JsonValue::Null,
			GeoValue::String(v) => JsonValue::String(v.clone()),
			GeoValue::UInt(v) => JsonValue::from(*v),
		}
	}

	/// The TileJSON field type name of this value.
	#[must_use]
	pub fn type_name(&self) -> &'static str {
		match self {
			GeoValue::Bool(_) => "Boolean",
			GeoValue::Double(_) | GeoValue::Float(_) | GeoValue::Int(_) | GeoValue::UInt(_) => "Number",
			GeoValue::Null => "Null",
			GeoValue::String(_) => "String",
		}
	}

	#[must_use]
	pub fn as_f64(&self) -> Option<f64> {
		match self {
			GeoValue::Double(v) => Some(*v),
			GeoValue::Float(v) => Some(f64::from(*v)),
			GeoValue::Int(v) => Some(*v as f64),
			GeoValue::UInt(v) => Some(*v as f64),
			_ => None,
		}
	}

	/// Equality that treats all numeric variants as one number type.
	#[must_use]
	pub fn loose_eq(&self, other: &GeoValue) -> bool {
		match (self.as_f64(), other.as_f64()) {
			(Some(a), Some(b)) => a == b,
			_ => self == other,
		}
	}

	fn variant_order(&self) -> u8 {
		match self {
			GeoValue::String(_) => 0,
			GeoValue::Float(_) => 1,
			GeoValue::Double(_) => 2,
			GeoValue::Int(_) => 3,
			GeoValue::UInt(_) => 4,
			GeoValue::Bool(_) => 5,
			GeoValue::Null => 6,
		}
	}
}

impl Debug for GeoValue {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			Self::String(v) => f.debug_tuple("String").field(v).finish(),
			Self::Float(v) => f.debug_tuple("Float").field(v).finish(),
			Self::Double(v) => f.debug_tuple("Double").field(v).finish(),
			Self::Int(v) => f.debug_tuple("Int").field(v).finish(),
			Self::UInt(v) => f.debug_tuple("UInt").field(v).finish(),
			Self::Bool(v) => f.debug_tuple("Bool").field(v).finish(),
			Self::Null => f.debug_tuple("Null").finish(),
		}
	}
}

impl Display for GeoValue {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			GeoValue::Bool(v) => write!(f, "{v}"),
			GeoValue::Double(v) => write!(f, "{v}"),
			GeoValue::Float(v) => write!(f, "{v}"),
			GeoValue::Int(v) => write!(f, "{v}"),
			GeoValue::Null => write!(f, "null"),
			GeoValue::String(v) => write!(f, "{v}"),
			GeoValue::UInt(v) => write!(f, "{v}"),
		}
	}
}

impl Eq for GeoValue {}

impl Hash for GeoValue {
	fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
		core::mem::discriminant(self).hash(state);
		match self {
			GeoValue::Bool(v) => v.hash(state),
			GeoValue::Double(v) => v.to_bits().hash(state),
			GeoValue::Float(v) => v.to_bits().hash(state),
			GeoValue::Int(v) => v.hash(state),
			GeoValue::Null => (),
			GeoValue::String(v) => v.hash(state),
			GeoValue::UInt(v) => v.hash(state),
		}
	}
}

impl PartialOrd for GeoValue {
	fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
		Some(self.cmp(other))
	}
}

impl Ord for GeoValue {
	fn cmp(&self, other: &Self) -> Ordering {
		use GeoValue::*;
		match (self, other) {
			(String(a), String(b)) => a.cmp(b),
			(Float(a), Float(b)) => a.total_cmp(b),
			(Double(a), Double(b)) => a.total_cmp(b),
			(Int(a), Int(b)) => a.cmp(b),
			(UInt(a), UInt(b)) => a.cmp(b),
			(Bool(a), Bool(b)) => a.cmp(b),
			_ => self.variant_order().cmp(&other.variant_order()),
		}
	}
}

impl Serialize for GeoValue {
	fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
		self.to_json().serialize(serializer)
	}
}

impl<'de> Deserialize<'de> for GeoValue {
	fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
		let json = JsonValue::deserialize(deserializer)?;
		GeoValue::from_json(&json).ok_or_else(|| serde::de::Error::custom("property values must be scalars"))
	}
}

impl From<&str> for GeoValue {
	fn from(value: &str) -> Self {
		GeoValue::String(value.to_string())
	}
}

impl From<String> for GeoValue {
	fn from(value: String) -> Self {
		GeoValue::String(value)
	}
}

impl From<i32> for GeoValue {
	fn from(value: i32) -> Self {
		if value < 0 {
			GeoValue::Int(i64::from(value))
		} else {
			GeoValue::UInt(value as u64)
		}
	}
}

impl From<i64> for GeoValue {
	fn from(value: i64) -> Self {
		GeoValue::Int(value)
	}
}

impl From<u64> for GeoValue {
	fn from(value: u64) -> Self {
		GeoValue::UInt(value)
	}
}

impl From<f32> for GeoValue {
	fn from(value: f32) -> Self {
		GeoValue::Float(value)
	}
}

impl From<f64> for GeoValue {
	fn from(value: f64) -> Self {
		GeoValue::Double(value)
	}
}

impl From<bool> for GeoValue {
	fn from(value: bool) -> Self {
		GeoValue::Bool(value)
	}
}
