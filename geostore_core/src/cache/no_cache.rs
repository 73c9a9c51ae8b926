use super::CacheBackend;
use crate::Blob;
use anyhow::Result;
use async_trait::async_trait;
use std::time::Duration;

/// A backend that never stores anything. Every lookup is a miss.
#[derive(Debug, Default)]
pub struct NoCache;

#[async_trait]
impl CacheBackend for NoCache {
	async fn get(&self, _key: &str) -> Result<Option<Blob>> {
		Ok(None)
	}

	async fn set(&self, key: &str, _value: Blob, _ttl: Option<Duration>) -> Result<()> {
		log::trace!("discard cache entry {key}");
		Ok(())
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[tokio::test]
	async fn always_misses() -> Result<()> {
		let cache = NoCache;
		cache.set("a", Blob::from("x"), None).await?;
		assert_eq!(cache.get("a").await?, None);
		Ok(())
	}
}
