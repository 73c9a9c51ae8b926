//! Key-value cache port for derived tile and TileJSON bytes.
//!
//! Entries are always safely regenerable, so backends may evict at will.
//! Concurrent writers to the same key are last-writer-wins.

mod memory;
mod no_cache;

pub use memory::MemoryCache;
pub use no_cache::NoCache;

use crate::Blob;
use anyhow::Result;
use async_trait::async_trait;
use std::{fmt::Debug, time::Duration};

#[async_trait]
pub trait CacheBackend: Debug + Send + Sync {
	/// Returns the cached bytes, or `None` on a miss.
	async fn get(&self, key: &str) -> Result<Option<Blob>>;

	/// Stores `value` under `key`. `ttl = None` keeps the entry until it is evicted.
	async fn set(&self, key: &str, value: Blob, ttl: Option<Duration>) -> Result<()>;
}
