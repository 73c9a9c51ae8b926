use anyhow::Result;
use geostore_core::{Blob, TileCoord, cache::CacheBackend, tilejson::TileJSON};
use std::{fmt, future::Future, sync::Arc, time::Duration};

/// Cache key of a tile or TileJSON document.
///
/// The key contains the data version of every constituent layer, so edits invalidate entries
/// without waiting for the TTL. An optional client token forces a fresh key on demand.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct TileCacheKey(String);

impl TileCacheKey {
	pub fn tile(scope: &str, versions: &[u64], token: Option<&str>, coord: &TileCoord) -> TileCacheKey {
		TileCacheKey(format!(
			"tile:{scope}:{}:{}:{}:{}:{}",
			join_versions(versions),
			token.unwrap_or_default(),
			coord.level,
			coord.x,
			coord.y
		))
	}

	/// `base_urls` are part of the key because they end up in the document.
	pub fn tilejson(scope: &str, versions: &[u64], token: Option<&str>, base_urls: &[String]) -> TileCacheKey {
		TileCacheKey(format!(
			"tilejson:{scope}:{}:{}:{}",
			join_versions(versions),
			token.unwrap_or_default(),
			base_urls.join(",")
		))
	}

	pub fn as_str(&self) -> &str {
		&self.0
	}
}

impl fmt::Display for TileCacheKey {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.0)
	}
}

fn join_versions(versions: &[u64]) -> String {
	versions.iter().map(u64::to_string).collect::<Vec<_>>().join(".")
}

/// Read-through cache in front of the tile and TileJSON builders.
///
/// Only successful builds are stored. A failing backend degrades to a miss.
#[derive(Clone, Debug)]
pub struct TileCache {
	backend: Arc<dyn CacheBackend>,
	ttl: Option<Duration>,
}

impl TileCache {
	pub fn new(backend: Arc<dyn CacheBackend>, ttl: Option<Duration>) -> TileCache {
		TileCache { backend, ttl }
	}

	pub async fn get_or_build<F>(&self, key: &TileCacheKey, build: F) -> Result<Blob>
	where
		F: Future<Output = Result<Blob>>,
	{
		if let Some(blob) = self.lookup(key).await {
			return Ok(blob);
		}

		let blob = build.await?;
		self.store(key, blob.clone()).await;
		Ok(blob)
	}

	pub async fn get_or_build_json<F>(&self, key: &TileCacheKey, build: F) -> Result<TileJSON>
	where
		F: Future<Output = Result<TileJSON>>,
	{
		if let Some(blob) = self.lookup(key).await {
			match TileJSON::from_blob(&blob) {
				Ok(tilejson) => return Ok(tilejson),
				Err(err) => log::warn!("discarding unreadable cache entry {key}: {err:#}"),
			}
		}

		let tilejson = build.await?;
		self.store(key, tilejson.to_blob()?).await;
		Ok(tilejson)
	}

	async fn lookup(&self, key: &TileCacheKey) -> Option<Blob> {
		match self.backend.get(key.as_str()).await {
			Ok(Some(blob)) => {
				log::debug!("cache hit {key}");
				Some(blob)
			}
			Ok(None) => {
				log::debug!("cache miss {key}");
				None
			}
			Err(err) => {
				log::warn!("cache read failed for {key}: {err:#}");
				None
			}
		}
	}

	async fn store(&self, key: &TileCacheKey, blob: Blob) {
		if let Err(err) = self.backend.set(key.as_str(), blob, self.ttl).await {
			log::warn!("cache write failed for {key}: {err:#}");
		}
	}
}
