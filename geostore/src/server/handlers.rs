//! HTTP handlers and small response helpers.
//!
//! Tile paths are parsed by hand so that malformed coordinates become 404 instead of a
//! rejection, and `{y}` may carry a `.pbf` suffix.

use crate::{
	GeostoreError,
	model::Target,
	tiles::{RequestHost, TileService},
};
use axum::{
	body::Body,
	extract::{Path, Query, State},
	http::{HeaderMap, header},
	response::Response,
};
use geostore_core::{Blob, TileCoord};
use serde::Deserialize;
use std::sync::Arc;

pub const MVT_MIME: &str = "application/vnd.mapbox-vector-tile";
pub const JSON_MIME: &str = "application/json";
const CACHE_CONTROL: &str = "public, max-age=3600, no-transform";

/// Optional cache-busting token.
#[derive(Debug, Default, Deserialize)]
pub struct TokenQuery {
	pub key: Option<String>,
}

pub async fn serve_layer_tile(
	State(service): State<Arc<TileService>>,
	Path((layer_id, z, x, y)): Path<(String, String, String, String)>,
	Query(query): Query<TokenQuery>,
) -> Response<Body> {
	serve_tile(&service, Target::Layer(layer_id), (&z, &x, &y), query.key.as_deref()).await
}

pub async fn serve_group_tile(
	State(service): State<Arc<TileService>>,
	Path((slug, z, x, y)): Path<(String, String, String, String)>,
	Query(query): Query<TokenQuery>,
) -> Response<Body> {
	serve_tile(&service, Target::Group(slug), (&z, &x, &y), query.key.as_deref()).await
}

pub async fn serve_layer_tilejson(
	State(service): State<Arc<TileService>>,
	Path(layer_id): Path<String>,
	Query(query): Query<TokenQuery>,
	headers: HeaderMap,
) -> Response<Body> {
	serve_tilejson(&service, Target::Layer(layer_id), &headers, query.key.as_deref()).await
}

pub async fn serve_group_tilejson(
	State(service): State<Arc<TileService>>,
	Path(slug): Path<String>,
	Query(query): Query<TokenQuery>,
	headers: HeaderMap,
) -> Response<Body> {
	serve_tilejson(&service, Target::Group(slug), &headers, query.key.as_deref()).await
}

async fn serve_tile(service: &TileService, target: Target, zxy: (&str, &str, &str), token: Option<&str>) -> Response<Body> {
	let Some(coord) = parse_coord(zxy.0, zxy.1, zxy.2) else {
		if let Some(level) = parse_deep_level(zxy.0, zxy.1, zxy.2)
			&& level > u64::from(service.max_tile_zoom())
		{
			return match service.tile_above_ceiling(&target, level) {
				Ok(blob) => ok_data(blob, MVT_MIME),
				Err(err) => error_from(&err, &format!("tile {target} at level {level}")),
			};
		}
		log::debug!("send 404 for malformed tile coordinate {target} {}/{}/{}", zxy.0, zxy.1, zxy.2);
		return error_404();
	};

	match service.tile(&target, coord, token).await {
		Ok(blob) => ok_data(blob, MVT_MIME),
		Err(err) => error_from(&err, &format!("tile {target} {coord}")),
	}
}

async fn serve_tilejson(service: &TileService, target: Target, headers: &HeaderMap, token: Option<&str>) -> Response<Body> {
	let host = request_host(headers);
	match service
		.tilejson(&target, &host, token)
		.await
		.and_then(|tilejson| tilejson.to_blob())
	{
		Ok(blob) => ok_data(blob, JSON_MIME),
		Err(err) => error_from(&err, &format!("tilejson {target}")),
	}
}

/// `None` for anything that is not a valid tile of the slippy-map grid.
pub fn parse_coord(z: &str, x: &str, y: &str) -> Option<TileCoord> {
	let y = y.strip_suffix(".pbf").unwrap_or(y);
	TileCoord::new(z.parse().ok()?, x.parse().ok()?, y.parse().ok()?).ok()
}

/// Level of a well-formed request too deep for the tile grid (`z` above 31).
///
/// `x` and `y` only need to be non-negative integers, since no grid exists to check them against.
pub fn parse_deep_level(z: &str, x: &str, y: &str) -> Option<u64> {
	let y = y.strip_suffix(".pbf").unwrap_or(y);
	let level: u64 = z.parse().ok()?;
	x.parse::<u64>().ok()?;
	y.parse::<u64>().ok()?;
	(level > 31).then_some(level)
}

/// Scheme from `X-Forwarded-Proto` (default `http`), host from `Host`.
pub fn request_host(headers: &HeaderMap) -> RequestHost {
	let header_str = |name: &str| {
		headers
			.get(name)
			.and_then(|value| value.to_str().ok())
			.and_then(|value| value.split(',').next())
			.map(str::trim)
			.filter(|value| !value.is_empty())
	};

	RequestHost::new(
		header_str("x-forwarded-proto").unwrap_or("http"),
		header_str(header::HOST.as_str()),
	)
}

// --- small helpers -----------------------------------------------------------

pub fn format_error_chain(err: &anyhow::Error) -> String {
	let mut result = err.to_string();

	for (i, cause) in err.chain().skip(1).enumerate() {
		if i == 0 {
			result.push_str("\n  Caused by:");
		}
		result.push_str(&format!("\n    {cause}"));
	}

	result
}

fn error_with(status: u16, message: &str) -> Response<Body> {
	Response::builder()
		.status(status)
		.header(header::CONTENT_TYPE, "text/plain; charset=utf-8")
		.body(Body::from(message.as_bytes().to_vec()))
		.expect("failed to build error response")
}

pub fn error_404() -> Response<Body> {
	error_with(404, "Not Found")
}

pub fn error_500() -> Response<Body> {
	error_with(500, "Internal Server Error")
}

/// Client errors carry their message. Everything else is logged and hidden behind a 500.
fn error_from(err: &anyhow::Error, what: &str) -> Response<Body> {
	match GeostoreError::find(err) {
		Some(GeostoreError::NotFound { .. }) => {
			log::debug!("send 404 for {what}: {err}");
			error_404()
		}
		Some(known) if known.status_code() < 500 => {
			log::debug!("send {} for {what}: {err}", known.status_code());
			error_with(known.status_code(), &known.to_string())
		}
		_ => {
			log::warn!("send 500 for {what}. Error:\n{}", format_error_chain(err));
			error_500()
		}
	}
}

fn ok_data(blob: Blob, mime: &str) -> Response<Body> {
	Response::builder()
		.status(200)
		.header(header::CONTENT_TYPE, mime)
		.header(header::CACHE_CONTROL, CACHE_CONTROL)
		.body(Body::from(blob.into_vec()))
		.expect("failed to build OK response")
}
