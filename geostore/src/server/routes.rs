//! Router composition: wires the handlers into an Axum `Router` without any server lifecycle.

use super::handlers::{error_404, serve_group_tile, serve_group_tilejson, serve_layer_tile, serve_layer_tilejson};
use crate::tiles::TileService;
use axum::{Router, routing::get};
use std::sync::Arc;

pub fn build_router(service: Arc<TileService>) -> Router {
	Router::new()
		.route("/status", get(|| async { "ready!" }))
		.route("/layer/{layer_id}/tile/{z}/{x}/{y}", get(serve_layer_tile))
		.route("/layer/{layer_id}/tilejson", get(serve_layer_tilejson))
		.route("/group/{slug}/tile/{z}/{x}/{y}", get(serve_group_tile))
		.route("/group/{slug}/tilejson", get(serve_group_tilejson))
		.fallback(|| async { error_404() })
		.with_state(service)
}
