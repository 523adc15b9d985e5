use std::sync::Arc;

use serde_json::Value;

use crate::{DiscoveryProvider, DiscoveryService, Error, QueryBuilder, Result, SearchOptions};

/// Outcome of a successful startup: the ready service plus the seed result shown on the landing
/// page.
pub struct Bootstrap {
	pub service: DiscoveryService,
	pub seed: Value,
}

pub async fn bootstrap(
	cfg: &disco_config::Config,
	provider: Arc<dyn DiscoveryProvider>,
) -> Result<Bootstrap> {
	let environments = check_credentials(provider.as_ref()).await?;
	let mut builder = QueryBuilder::new(&cfg.search);
	let environment_id = resolve_environment_id(&cfg.discovery, &environments)?;
	let collection_id =
		resolve_collection_id(&cfg.discovery, provider.as_ref(), &environment_id).await?;

	tracing::info!(%environment_id, %collection_id, "Resolved discovery collection.");

	builder.set_environment_id(environment_id);
	builder.set_collection_id(collection_id);

	let seed = seed_query(&builder, provider.as_ref(), cfg.seed.count).await?;

	Ok(Bootstrap { service: DiscoveryService::new(builder, provider), seed })
}

async fn check_credentials(provider: &dyn DiscoveryProvider) -> Result<Value> {
	provider.environments().await.map_err(|err| failed("environments", err.to_string()))
}

fn resolve_environment_id(cfg: &disco_config::Discovery, environments: &Value) -> Result<String> {
	if let Some(id) = cfg.environment_id.as_ref() {
		return Ok(id.clone());
	}

	first_id(environments, "environments", "environment_id")
		.ok_or_else(|| failed("environments", "No discovery environment is available.".to_string()))
}

async fn resolve_collection_id(
	cfg: &disco_config::Discovery,
	provider: &dyn DiscoveryProvider,
	environment_id: &str,
) -> Result<String> {
	if let Some(id) = cfg.collection_id.as_ref() {
		return Ok(id.clone());
	}

	let collections = provider
		.collections(environment_id)
		.await
		.map_err(|err| failed("collections", err.to_string()))?;

	first_id(&collections, "collections", "collection_id").ok_or_else(|| {
		failed("collections", format!("Environment {environment_id} has no collections."))
	})
}

async fn seed_query(
	builder: &QueryBuilder,
	provider: &dyn DiscoveryProvider,
	count: u32,
) -> Result<Value> {
	let params = builder.search(SearchOptions {
		natural_language_query: Some(String::new()),
		count: Some(count),
		..Default::default()
	});
	let seed = provider.query(&params).await.map_err(|err| failed("seed", err.to_string()))?;

	tracing::info!(
		matching_results = ?seed.get("matching_results"),
		"Seed query completed."
	);

	Ok(seed)
}

fn first_id(listing: &Value, list_key: &str, id_key: &str) -> Option<String> {
	listing
		.get(list_key)
		.and_then(Value::as_array)
		.and_then(|items| items.iter().find_map(|item| item.get(id_key).and_then(Value::as_str)))
		.map(str::to_string)
}

fn failed(stage: &'static str, message: String) -> Error {
	tracing::error!(stage, %message, "Discovery startup failed.");

	Error::Startup { stage, message }
}
