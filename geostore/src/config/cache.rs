use geostore_core::cache::{CacheBackend, MemoryCache, NoCache};
use serde::Deserialize;
use std::{sync::Arc, time::Duration};

pub const DEFAULT_MAX_ENTRIES: u64 = 10_000;

#[derive(Debug, Default, Clone, Copy, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum CacheBackendKind {
	#[default]
	Memory,
	None,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct CacheConfig {
	pub backend: CacheBackendKind,

	/// Lifetime of an entry. Absent means entries live until evicted.
	pub ttl_seconds: Option<u64>,

	/// Capacity of the in-memory backend.
	pub max_entries: u64,
}

impl Default for CacheConfig {
	fn default() -> Self {
		CacheConfig {
			backend: CacheBackendKind::Memory,
			ttl_seconds: None,
			max_entries: DEFAULT_MAX_ENTRIES,
		}
	}
}

impl CacheConfig {
	pub fn ttl(&self) -> Option<Duration> {
		self.ttl_seconds.map(Duration::from_secs)
	}

	pub fn build_backend(&self) -> Arc<dyn CacheBackend> {
		match self.backend {
			CacheBackendKind::Memory => Arc::new(MemoryCache::new(self.max_entries)),
			CacheBackendKind::None => Arc::new(NoCache),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use pretty_assertions::assert_eq;

	#[test]
	fn parse() {
		let config: CacheConfig = serde_yaml_ng::from_str("{backend: none, ttl_seconds: 60}").unwrap();
		assert_eq!(config.backend, CacheBackendKind::None);
		assert_eq!(config.ttl(), Some(Duration::from_secs(60)));
		assert_eq!(config.max_entries, 10_000);
		assert!(format!("{:?}", config.build_backend()).contains("NoCache"));

		let config: CacheConfig = serde_yaml_ng::from_str("{}").unwrap();
		assert_eq!(config, CacheConfig::default());
		assert_eq!(config.ttl(), None);

		assert!(serde_yaml_ng::from_str::<CacheConfig>("backend: redis").is_err());
	}
}
