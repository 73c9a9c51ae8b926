use crate::geo::{GeoProperties, GeoValue};
use anyhow::{Context, Result, anyhow, ensure};
use std::{collections::HashMap, fmt::Debug, hash::Hash};

/// An indexed table: insertion order is the wire order, lookup goes through the map.
#[derive(Clone, PartialEq)]
pub struct IndexedTable<T>
where
	T: Clone + Eq + Hash,
{
	list: Vec<T>,
	map: HashMap<T, u32>,
}

impl<T> IndexedTable<T>
where
	T: Clone + Debug + Eq + Hash,
{
	pub fn new(list: Vec<T>) -> IndexedTable<T> {
		let map = list.iter().enumerate().map(|(i, e)| (e.clone(), i as u32)).collect();
		IndexedTable { list, map }
	}

	pub fn add(&mut self, entry: T) -> u32 {
		if let Some(index) = self.map.get(&entry) {
			return *index;
		}
		let index = self.list.len() as u32;
		self.map.insert(entry.clone(), index);
		self.list.push(entry);
		index
	}

	pub fn iter(&self) -> impl Iterator<Item = &T> + '_ {
		self.list.iter()
	}

	pub fn len(&self) -> usize {
		self.list.len()
	}

	pub fn get(&self, id: u32) -> Result<&T> {
		self.list.get(id as usize).ok_or_else(|| anyhow!("id '{id}' not found"))
	}
}

impl<T: Clone + Debug + Eq + Hash> Default for IndexedTable<T> {
	fn default() -> IndexedTable<T> {
		IndexedTable::new(vec![])
	}
}

impl<T> Debug for IndexedTable<T>
where
	T: Clone + Debug + Eq + Hash,
{
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_list().entries(&self.list).finish()
	}
}

/// The key and value tables of one layer. Features reference them through `tag_ids`.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PropertyManager {
	pub key: IndexedTable<String>,
	pub val: IndexedTable<GeoValue>,
}

impl PropertyManager {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn add_key(&mut self, key: String) -> u32 {
		self.key.add(key)
	}

	pub fn add_val(&mut self, value: GeoValue) -> u32 {
		self.val.add(value)
	}

	pub fn iter_key(&self) -> impl Iterator<Item = &String> + '_ {
		self.key.iter()
	}

	pub fn iter_val(&self) -> impl Iterator<Item = &GeoValue> + '_ {
		self.val.iter()
	}

	/// Builds tables ordered by descending frequency so the most common entries get the smallest ids.
	/// Ties are broken by natural order, which keeps the output deterministic.
	pub fn from_iter<'a, I>(geo_property_iter: I) -> Self
	where
		I: IntoIterator<Item = &'a GeoProperties>,
	{
		let mut key_map: HashMap<String, u32> = HashMap::new();
		let mut val_map: HashMap<GeoValue, u32> = HashMap::new();

		for properties in geo_property_iter {
			for (k, v) in properties.iter() {
				if *v == GeoValue::Null {
					continue;
				}
				*key_map.entry(k.clone()).or_insert(0) += 1;
				*val_map.entry(v.clone()).or_insert(0) += 1;
			}
		}

		fn make_lookup<T>(map: HashMap<T, u32>) -> IndexedTable<T>
		where
			T: Clone + Debug + Eq + Hash + Ord,
		{
			let mut vec: Vec<(T, u32)> = map.into_iter().collect();
			vec.sort_unstable_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
			IndexedTable::new(vec.into_iter().map(|(v, _)| v).collect())
		}

		Self {
			key: make_lookup(key_map),
			val: make_lookup(val_map),
		}
	}

	/// Null values are dropped, MVT has no encoding for them.
	pub fn encode_tag_ids(&mut self, properties: GeoProperties) -> Vec<u32> {
		let mut tag_ids: Vec<u32> = Vec::new();

		for (key, val) in properties {
			if val == GeoValue::Null {
				continue;
			}
			tag_ids.push(self.key.add(key));
			tag_ids.push(self.val.add(val));
		}

		tag_ids
	}

	pub fn decode_tag_ids(&self, tag_ids: &[u32]) -> Result<GeoProperties> {
		ensure!(tag_ids.len() % 2 == 0, "Tag IDs must be even");
		let mut properties = GeoProperties::new();

		for pair in tag_ids.chunks_exact(2) {
			properties.insert(
				self.key.get(pair[0]).context("Failed to get property key")?.to_owned(),
				self.val.get(pair[1]).context("Failed to get property value")?.clone(),
			);
		}
		Ok(properties)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn props(list: &[(&str, GeoValue)]) -> GeoProperties {
		GeoProperties::from(list.to_vec())
	}

	#[test]
	fn frequency_ordering() {
		let a = props(&[("kind", GeoValue::from("road")), ("name", GeoValue::from("A"))]);
		let b = props(&[("kind", GeoValue::from("road"))]);
		let c = props(&[("kind", GeoValue::from("path")), ("lanes", GeoValue::Null)]);
		let manager = PropertyManager::from_iter([&a, &b, &c]);

		assert_eq!(manager.iter_key().collect::<Vec<_>>(), vec!["kind", "name"]);
		assert_eq!(
			manager.iter_val().cloned().collect::<Vec<_>>(),
			vec![GeoValue::from("road"), GeoValue::from("A"), GeoValue::from("path")]
		);
	}

	#[test]
	fn encode_decode_tag_ids() -> Result<()> {
		let mut manager = PropertyManager::new();
		let properties = props(&[("foo", GeoValue::from("bar")), ("n", GeoValue::UInt(3)), ("x", GeoValue::Null)]);
		let tag_ids = manager.encode_tag_ids(properties);
		assert_eq!(tag_ids, vec![0, 0, 1, 1]);

		let decoded = manager.decode_tag_ids(&tag_ids)?;
		assert_eq!(decoded, props(&[("foo", GeoValue::from("bar")), ("n", GeoValue::UInt(3))]));

		assert!(manager.decode_tag_ids(&[0]).is_err());
		assert!(manager.decode_tag_ids(&[0, 9]).is_err());
		Ok(())
	}

	#[test]
	fn indexed_table_reuses_entries() {
		let mut table: IndexedTable<String> = IndexedTable::default();
		assert_eq!(table.add(String::from("a")), 0);
		assert_eq!(table.add(String::from("b")), 1);
		assert_eq!(table.add(String::from("a")), 0);
		assert_eq!(table.len(), 2);
		assert_eq!(format!("{table:?}"), r#"["a", "b"]"#);
	}
}
