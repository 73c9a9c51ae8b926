//! HTTP server for tiles and TileJSON documents.

mod handlers;
mod routes;
mod tile_server;

pub use routes::build_router;
pub use tile_server::TileServer;
