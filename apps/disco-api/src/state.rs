use std::sync::Arc;

use serde_json::Value;

use disco_providers::DiscoveryClient;
use disco_service::{Bootstrap, DiscoveryProvider, DiscoveryService};

use crate::views::Views;

#[derive(Clone)]
pub struct AppState {
	pub service: Arc<DiscoveryService>,
	/// Seed result from startup; the landing page always renders it.
	pub seed: Arc<Value>,
	pub views: Arc<Views>,
	/// Client for the page routes' calls back into `/api/search`.
	pub http: reqwest::Client,
	pub public_base_url: Option<String>,
}
impl AppState {
	pub async fn new(config: &disco_config::Config) -> color_eyre::Result<Self> {
		let client = DiscoveryClient::new(&config.discovery)?;

		Self::with_provider(config, Arc::new(client)).await
	}

	pub async fn with_provider(
		config: &disco_config::Config,
		provider: Arc<dyn DiscoveryProvider>,
	) -> color_eyre::Result<Self> {
		let views = Views::load(&config.views)?;
		let Bootstrap { service, seed } = disco_service::bootstrap(config, provider).await?;

		Ok(Self {
			service: Arc::new(service),
			seed: Arc::new(seed),
			views: Arc::new(views),
			http: reqwest::Client::new(),
			public_base_url: config.service.public_base_url.clone(),
		})
	}
}
