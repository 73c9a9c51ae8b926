use super::build_router;
use crate::{config::Config, model::Target, tiles::TileService};
use anyhow::{Context, Result};
use std::sync::Arc;
use tokio::sync::oneshot::Sender;

pub struct TileServer {
	ip: String,
	port: u16,
	service: Arc<TileService>,
	exit_signal: Option<Sender<()>>,
}

impl TileServer {
	pub fn new(ip: &str, port: u16, service: TileService) -> TileServer {
		TileServer {
			ip: ip.to_owned(),
			port,
			service: Arc::new(service),
			exit_signal: None,
		}
	}

	/// Loads every layer's data and builds the tile service.
	pub fn from_config(config: &Config) -> Result<TileServer> {
		let service = config.build_service()?;
		Ok(TileServer::new(config.server.ip(), config.server.port(), service))
	}

	/// The bound port once started. Port 0 asks the OS for a free one.
	pub fn port(&self) -> u16 {
		self.port
	}

	pub async fn start(&mut self) -> Result<()> {
		if self.exit_signal.is_some() {
			self.stop().await;
		}

		log::info!("starting server");

		let router = build_router(self.service.clone());

		let addr = format!("{}:{}", self.ip, self.port);
		let listener = tokio::net::TcpListener::bind(&addr)
			.await
			.with_context(|| format!("Failed to bind {addr}"))?;
		self.port = listener.local_addr()?.port();
		log::info!("server listens on {}:{}", self.ip, self.port);

		let catalog = self.service.catalog();
		let targets = catalog
			.layers()
			.map(|layer| Target::Layer(layer.id.clone()))
			.chain(catalog.groups().map(|group| Target::Group(group.slug.clone())));
		for target in targets {
			log::info!("   {}", target.tilejson_path());
		}

		let (tx, rx) = tokio::sync::oneshot::channel::<()>();

		tokio::spawn(async move {
			let result = axum::serve(listener, router.into_make_service())
				.with_graceful_shutdown(async {
					rx.await.ok();
				})
				.await;
			if let Err(err) = result {
				log::error!("server stopped with error: {err}");
			}
		});

		self.exit_signal = Some(tx);

		Ok(())
	}

	pub async fn stop(&mut self) {
		let Some(exit_signal) = self.exit_signal.take() else {
			return;
		};

		log::info!("stopping server");
		exit_signal.send(()).ok();
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::{model::Catalog, source::InMemorySource, tiles::TileServiceOptions};
	use geostore_core::cache::NoCache;
	use tokio::io::{AsyncReadExt, AsyncWriteExt};

	async fn get(port: u16, path: &str) -> Result<String> {
		let mut stream = tokio::net::TcpStream::connect(("127.0.0.1", port)).await?;
		stream
			.write_all(format!("GET {path} HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\r\n").as_bytes())
			.await?;
		let mut response = String::new();
		stream.read_to_string(&mut response).await?;
		Ok(response)
	}

	#[tokio::test]
	async fn start_serve_stop() -> Result<()> {
		let service = TileService::new(
			Catalog::new(),
			Arc::new(InMemorySource::new()),
			Arc::new(NoCache),
			TileServiceOptions::default(),
		);
		let mut server = TileServer::new("127.0.0.1", 0, service);
		server.start().await?;
		assert_ne!(server.port(), 0);

		let response = get(server.port(), "/status").await?;
		assert!(response.starts_with("HTTP/1.1 200 OK"));
		assert!(response.ends_with("ready!"));

		let response = get(server.port(), "/layer/missing/tilejson").await?;
		assert!(response.starts_with("HTTP/1.1 404"));

		server.stop().await;
		server.stop().await;
		Ok(())
	}

	#[tokio::test]
	async fn from_example_config() -> Result<()> {
		let mut config = Config::from_path(std::path::Path::new("../testdata/config.yml"))?;
		config.server.override_optional_port(&Some(0));
		let mut server = TileServer::from_config(&config)?;
		server.start().await?;

		let response = get(server.port(), "/group/mygroup/tilejson").await?;
		assert!(response.starts_with("HTTP/1.1 200 OK"));
		assert!(response.contains("application/json"));

		server.stop().await;
		Ok(())
	}
}
