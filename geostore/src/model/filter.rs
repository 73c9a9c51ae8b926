use geostore_geometry::{GeoProperties, GeoValue};
use serde::{Deserialize, Serialize};

/// A predicate over feature properties.
///
/// In YAML:
/// ```yaml
/// features_filter:
///   op: all
///   filters:
///     - { op: eq, key: kind, value: road }
///     - { op: not, filter: { op: has, key: closed } }
/// ```
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
#[serde(tag = "op", rename_all = "lowercase", deny_unknown_fields)]
pub enum FeatureFilter {
	/// Property present and equal. Numbers compare by value regardless of integer/float storage.
	Eq { key: String, value: GeoValue },
	/// Negation of `eq`, so a missing property matches.
	Ne { key: String, value: GeoValue },
	In { key: String, values: Vec<GeoValue> },
	Has { key: String },
	Not { filter: Box<FeatureFilter> },
	All { filters: Vec<FeatureFilter> },
	Any { filters: Vec<FeatureFilter> },
}

impl FeatureFilter {
	pub fn matches(&self, properties: &GeoProperties) -> bool {
		use FeatureFilter::*;
		match self {
			Eq { key, value } => properties.get(key).is_some_and(|v| v.loose_eq(value)),
			Ne { key, value } => !properties.get(key).is_some_and(|v| v.loose_eq(value)),
			In { key, values } => properties
				.get(key)
				.is_some_and(|v| values.iter().any(|candidate| v.loose_eq(candidate))),
			Has { key } => properties.contains_key(key),
			Not { filter } => !filter.matches(properties),
			All { filters } => filters.iter().all(|f| f.matches(properties)),
			Any { filters } => filters.iter().any(|f| f.matches(properties)),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use pretty_assertions::assert_eq;
	use rstest::rstest;

	fn props() -> GeoProperties {
		GeoProperties::from(vec![
			("kind", GeoValue::from("road")),
			("lanes", GeoValue::from(2)),
			("oneway", GeoValue::from(false)),
		])
	}

	fn parse(yaml: &str) -> FeatureFilter {
		serde_yaml_ng::from_str(yaml).unwrap()
	}

	#[rstest]
	#[case("{op: eq, key: kind, value: road}", true)]
	#[case("{op: eq, key: kind, value: path}", false)]
	#[case("{op: eq, key: lanes, value: 2.0}", true)]
	#[case("{op: ne, key: kind, value: path}", true)]
	#[case("{op: ne, key: missing, value: 1}", true)]
	#[case("{op: in, key: lanes, values: [1, 2, 3]}", true)]
	#[case("{op: in, key: kind, values: [path, track]}", false)]
	#[case("{op: has, key: oneway}", true)]
	#[case("{op: has, key: name}", false)]
	#[case("{op: not, filter: {op: has, key: name}}", true)]
	#[case("{op: all, filters: [{op: has, key: kind}, {op: eq, key: oneway, value: false}]}", true)]
	#[case("{op: all, filters: [{op: has, key: kind}, {op: eq, key: oneway, value: true}]}", false)]
	#[case("{op: any, filters: [{op: has, key: name}, {op: eq, key: kind, value: road}]}", true)]
	#[case("{op: any, filters: []}", false)]
	#[case("{op: all, filters: []}", true)]
	fn evaluates(#[case] yaml: &str, #[case] expected: bool) {
		assert_eq!(parse(yaml).matches(&props()), expected, "{yaml}");
	}

	#[test]
	fn parses_tagged_form() {
		assert_eq!(
			parse("op: eq\nkey: kind\nvalue: road"),
			FeatureFilter::Eq {
				key: String::from("kind"),
				value: GeoValue::from("road")
			}
		);
	}

	#[test]
	fn rejects_unknown_operator() {
		assert!(serde_yaml_ng::from_str::<FeatureFilter>("{op: like, key: kind}").is_err());
	}
}
