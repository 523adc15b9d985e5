pub mod routes;
pub mod state;
pub mod views;

use std::{
	net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr},
	path::PathBuf,
};

use clap::Parser;
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

use crate::state::AppState;

#[derive(Debug, Parser)]
#[command(
	version = disco_cli::VERSION,
	rename_all = "kebab",
	styles = disco_cli::styles(),
)]
pub struct Args {
	#[arg(long, short = 'c', value_name = "FILE")]
	pub config: PathBuf,
}

pub async fn run(args: Args) -> color_eyre::Result<()> {
	let config = disco_config::load(&args.config)?;
	init_tracing(&config)?;
	let http_addr: SocketAddr = config.service.http_bind.parse()?;
	let mut state = AppState::new(&config).await.inspect_err(|err| {
		tracing::error!(error = %err, "Startup failed; the HTTP server was not started.");
	})?;

	let http_listener = TcpListener::bind(http_addr).await?;
	let local_addr = http_listener.local_addr()?;

	if state.public_base_url.is_none() {
		state.public_base_url = Some(local_base_url(local_addr));
	}

	tracing::info!(%local_addr, public_base_url = ?state.public_base_url, "HTTP server listening.");

	let app = routes::router(state);

	axum::serve(http_listener, app).await?;

	Ok(())
}

/// Base URL the page routes use to reach this server's own API when `service.public_base_url` is
/// unset. Wildcard bind addresses are reached through loopback.
pub fn local_base_url(addr: SocketAddr) -> String {
	let ip = match addr.ip() {
		IpAddr::V4(ip) if ip.is_unspecified() => IpAddr::V4(Ipv4Addr::LOCALHOST),
		IpAddr::V6(ip) if ip.is_unspecified() => IpAddr::V6(Ipv6Addr::LOCALHOST),
		ip => ip,
	};

	format!("http://{}", SocketAddr::new(ip, addr.port()))
}

fn init_tracing(config: &disco_config::Config) -> color_eyre::Result<()> {
	let filter =
		EnvFilter::try_new(&config.service.log_level).unwrap_or_else(|_| EnvFilter::new("info"));
	tracing_subscriber::fmt().with_env_filter(filter).init();
	Ok(())
}
