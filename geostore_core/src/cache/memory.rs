use super::CacheBackend;
use crate::Blob;
use anyhow::Result;
use async_trait::async_trait;
use moka::{Expiry, future::Cache};
use std::{
	fmt::Debug,
	time::{Duration, Instant},
};

#[derive(Clone)]
struct Entry {
	blob: Blob,
	ttl: Option<Duration>,
}

struct EntryExpiry;

impl Expiry<String, Entry> for EntryExpiry {
	fn expire_after_create(&self, _key: &String, value: &Entry, _created_at: Instant) -> Option<Duration> {
		value.ttl
	}

	fn expire_after_update(
		&self,
		_key: &String,
		value: &Entry,
		_updated_at: Instant,
		_duration_until_expiry: Option<Duration>,
	) -> Option<Duration> {
		value.ttl
	}
}

/// In-process LRU cache backed by `moka`, with a TTL per entry.
pub struct MemoryCache {
	cache: Cache<String, Entry>,
}

impl MemoryCache {
	#[must_use]
	pub fn new(max_entries: u64) -> MemoryCache {
		MemoryCache {
			cache: Cache::builder()
				.max_capacity(max_entries)
				.expire_after(EntryExpiry)
				.build(),
		}
	}

	/// Number of live entries, after pending maintenance has run.
	pub async fn entry_count(&self) -> u64 {
		self.cache.run_pending_tasks().await;
		self.cache.entry_count()
	}
}

impl Debug for MemoryCache {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("MemoryCache")
			.field("max_capacity", &self.cache.policy().max_capacity())
			.finish()
	}
}

#[async_trait]
impl CacheBackend for MemoryCache {
	async fn get(&self, key: &str) -> Result<Option<Blob>> {
		Ok(self.cache.get(key).await.map(|entry| entry.blob))
	}

	async fn set(&self, key: &str, value: Blob, ttl: Option<Duration>) -> Result<()> {
		self.cache.insert(key.to_string(), Entry { blob: value, ttl }).await;
		Ok(())
	}
}
