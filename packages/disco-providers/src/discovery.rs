use std::time::Duration;

use reqwest::{Client, RequestBuilder, StatusCode, Url};
use serde::Serialize;
use serde_json::Value;

use crate::{Error, Result};

/// Query-string shape accepted by the collection query endpoint. Only populated fields are sent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DiscoveryParams {
	#[serde(skip)]
	pub environment_id: String,
	#[serde(skip)]
	pub collection_id: String,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub query: Option<String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub natural_language_query: Option<String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub filter: Option<String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub count: Option<u32>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub aggregation: Option<String>,
	#[serde(rename = "return", skip_serializing_if = "Option::is_none")]
	pub return_fields: Option<String>,
}

#[derive(Debug, Clone)]
enum Credentials {
	ApiKey(String),
	Basic { username: String, password: String },
}

#[derive(Debug, Clone)]
pub struct DiscoveryClient {
	client: Client,
	api_base: Url,
	version: String,
	credentials: Credentials,
}
impl DiscoveryClient {
	pub fn new(cfg: &disco_config::Discovery) -> Result<Self> {
		let client = Client::builder()
			.timeout(Duration::from_millis(cfg.timeout_ms))
			.default_headers(crate::default_headers(&cfg.default_headers)?)
			.build()?;
		let api_base = Url::parse(&cfg.api_base).map_err(|err| Error::InvalidConfig {
			message: format!("discovery.api_base is not a valid URL: {err}."),
		})?;

		if api_base.cannot_be_a_base() {
			return Err(Error::InvalidConfig {
				message: "discovery.api_base cannot be used as a base URL.".to_string(),
			});
		}

		let credentials = match (&cfg.api_key, &cfg.username, &cfg.password) {
			(Some(key), None, _) => Credentials::ApiKey(key.clone()),
			(None, Some(username), Some(password)) =>
				Credentials::Basic { username: username.clone(), password: password.clone() },
			_ =>
				return Err(Error::InvalidConfig {
					message: "Discovery credentials require either api_key or username and password."
						.to_string(),
				}),
		};

		Ok(Self { client, api_base, version: cfg.version.clone(), credentials })
	}

	/// Lists environments. Used at startup to check that the credentials are accepted.
	pub async fn environments(&self) -> Result<Value> {
		let url = self.endpoint(&["v1", "environments"]);

		send(self.request(url)).await
	}

	pub async fn collections(&self, environment_id: &str) -> Result<Value> {
		let url = self.endpoint(&["v1", "environments", environment_id, "collections"]);

		send(self.request(url)).await
	}

	pub async fn query(&self, params: &DiscoveryParams) -> Result<Value> {
		let url = self.endpoint(&[
			"v1",
			"environments",
			&params.environment_id,
			"collections",
			&params.collection_id,
			"query",
		]);

		tracing::debug!(
			environment_id = %params.environment_id,
			collection_id = %params.collection_id,
			natural_language = params.natural_language_query.is_some(),
			count = ?params.count,
			"Querying discovery collection."
		);

		send(self.request(url).query(params)).await
	}

	fn endpoint(&self, segments: &[&str]) -> Url {
		let mut url = self.api_base.clone();

		// `new` rejects cannot-be-a-base URLs, so the segments are always writable.
		if let Ok(mut path) = url.path_segments_mut() {
			path.pop_if_empty().extend(segments);
		}

		url
	}

	fn request(&self, url: Url) -> RequestBuilder {
		let builder = self.client.get(url).query(&[("version", self.version.as_str())]);

		match &self.credentials {
			Credentials::ApiKey(key) => builder.basic_auth("apikey", Some(key)),
			Credentials::Basic { username, password } => builder.basic_auth(username, Some(password)),
		}
	}
}

async fn send(builder: RequestBuilder) -> Result<Value> {
	let res = builder.send().await?;
	let status = res.status();

	if !status.is_success() {
		let raw = res.bytes().await?;

		return Err(upstream_error(status, &raw));
	}

	Ok(res.json().await?)
}

fn upstream_error(status: StatusCode, raw: &[u8]) -> Error {
	let body: Value = serde_json::from_slice(raw).unwrap_or(Value::Null);
	let message = body
		.get("error")
		.or_else(|| body.get("message"))
		.and_then(Value::as_str)
		.map(str::to_string)
		.or_else(|| status.canonical_reason().map(str::to_string))
		.unwrap_or_else(|| "Unknown discovery error.".to_string());

	Error::Upstream { status: status.as_u16(), message, body }
}
