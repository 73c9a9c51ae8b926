use anyhow::Result;
use geostore::{config::Config, server::TileServer};
use std::path::PathBuf;
use tokio::time::{Duration, sleep};

#[derive(clap::Args, Debug)]
#[command(arg_required_else_help = true, disable_version_flag = true, verbatim_doc_comment)]
pub struct Subcommand {
	/// Path to a YAML configuration file with server, tile, cache, layer and group settings.
	/// `data` paths of layers are resolved relative to this file.
	/// The environment variables MAX_TILE_ZOOM and TILE_HOSTNAMES override the file.
	/// Command line arguments override both.
	#[arg(short = 'c', long, value_name = "FILE", display_order = 0, verbatim_doc_comment)]
	pub config: PathBuf,

	/// Serve via socket ip. Default: 0.0.0.0
	#[arg(short = 'i', long, display_order = 0)]
	pub ip: Option<String>,

	/// Serve via port. Default: 8080
	#[arg(short, long, display_order = 0)]
	pub port: Option<u16>,

	/// Shutdown server automatically after x milliseconds.
	#[arg(long, display_order = 4)]
	pub auto_shutdown: Option<u64>,
}

#[tokio::main]
pub async fn run(arguments: &Subcommand) -> Result<()> {
	let mut config = Config::from_path(&arguments.config)?;
	config.apply_env()?;
	config.server.override_optional_ip(&arguments.ip);
	config.server.override_optional_port(&arguments.port);

	let mut server = TileServer::from_config(&config)?;
	server.start().await?;
	eprintln!("server listens on port {}", server.port());

	if let Some(milliseconds) = arguments.auto_shutdown {
		sleep(Duration::from_millis(milliseconds)).await;
		server.stop().await;
	} else {
		loop {
			sleep(Duration::from_secs(60)).await;
		}
	}

	Ok(())
}
