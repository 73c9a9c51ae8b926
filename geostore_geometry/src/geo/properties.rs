use super::GeoValue;
use std::{
	collections::{BTreeMap, btree_map},
	fmt::Debug,
};

/// Property map of one feature. Keys iterate in sorted order, so encoding is deterministic.
#[derive(Clone, Default, PartialEq)]
pub struct GeoProperties {
	properties: BTreeMap<String, GeoValue>,
}

impl GeoProperties {
	#[must_use]
	pub fn new() -> GeoProperties {
		GeoProperties {
			properties: BTreeMap::new(),
		}
	}

	pub fn insert(&mut self, key: String, value: GeoValue) {
		self.properties.insert(key, value);
	}

	pub fn remove(&mut self, key: &str) {
		self.properties.remove(key);
	}

	#[must_use]
	pub fn get(&self, key: &str) -> Option<&GeoValue> {
		self.properties.get(key)
	}

	#[must_use]
	pub fn contains_key(&self, key: &str) -> bool {
		self.properties.contains_key(key)
	}

	pub fn iter(&self) -> btree_map::Iter<'_, String, GeoValue> {
		self.properties.iter()
	}

	#[must_use]
	pub fn len(&self) -> usize {
		self.properties.len()
	}

	#[must_use]
	pub fn is_empty(&self) -> bool {
		self.properties.is_empty()
	}

	/// Keeps only the keys contained in `allowed`.
	pub fn retain_keys(&mut self, allowed: &[String]) {
		self.properties.retain(|key, _| allowed.iter().any(|a| a == key));
	}

	/// Builds properties from a JSON object, dropping nested arrays and objects.
	#[must_use]
	pub fn from_json_object(object: &serde_json::Map<String, serde_json::Value>) -> GeoProperties {
		let mut properties = GeoProperties::new();
		for (key, value) in object {
			match GeoValue::from_json(value) {
				Some(v) => properties.insert(key.clone(), v),
				None => log::trace!("skip non-scalar property '{key}'"),
			}
		}
		properties
	}
}

impl IntoIterator for GeoProperties {
	type Item = (String, GeoValue);
	type IntoIter = btree_map::IntoIter<String, GeoValue>;
	fn into_iter(self) -> Self::IntoIter {
		self.properties.into_iter()
	}
}

impl From<Vec<(&str, GeoValue)>> for GeoProperties {
	fn from(value: Vec<(&str, GeoValue)>) -> Self {
		GeoProperties {
			properties: value.into_iter().map(|(k, v)| (k.to_string(), v)).collect(),
		}
	}
}

impl Debug for GeoProperties {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_map().entries(self.properties.iter()).finish()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use serde_json::json;

	#[test]
	fn retain_keys() {
		let mut properties = GeoProperties::from(vec![
			("foo", GeoValue::from("bar")),
			("baba", GeoValue::from("fifi")),
			("n", GeoValue::from(3)),
		]);
		properties.retain_keys(&[String::from("foo"), String::from("n"), String::from("missing")]);
		assert_eq!(properties.len(), 2);
		assert!(properties.contains_key("foo"));
		assert!(!properties.contains_key("baba"));

		properties.retain_keys(&[]);
		assert!(properties.is_empty());
	}

	#[test]
	fn from_json_object_drops_nested_values() {
		let json = json!({"name": "A", "tags": ["x"], "meta": {"a": 1}, "n": 2});
		let properties = GeoProperties::from_json_object(json.as_object().unwrap());
		assert_eq!(
			format!("{properties:?}"),
			r#"{"n": UInt(2), "name": String("A")}"#
		);
	}
}
