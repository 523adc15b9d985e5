//! Test helpers shared by the workspace: a mock discovery service and a ready-to-use config.

use serde_json::{Map, Value};
use wiremock::{
	Mock, MockServer, Request, ResponseTemplate,
	matchers::{method, path, query_param, query_param_is_missing},
};

use disco_config::{Config, Discovery, Search, Seed, Service, Views};

pub const ENVIRONMENT_ID: &str = "system";
pub const COLLECTION_ID: &str = "news-en";

pub struct MockDiscovery {
	server: MockServer,
}
impl MockDiscovery {
	pub async fn start() -> Self {
		Self { server: MockServer::start().await }
	}

	pub fn uri(&self) -> String {
		self.server.uri()
	}

	/// Mounts a healthy environment listing and an empty natural-language seed query returning
	/// `seed`.
	pub async fn mount_ready(&self, seed: Value) {
		self.mount_environments(serde_json::json!({
			"environments": [{ "environment_id": ENVIRONMENT_ID, "read_only": true }]
		}))
		.await;

		Mock::given(method("GET"))
			.and(path(query_path()))
			.and(query_param("natural_language_query", ""))
			.respond_with(ResponseTemplate::new(200).set_body_json(seed))
			.mount(&self.server)
			.await;
	}

	pub async fn mount_environments(&self, body: Value) {
		Mock::given(method("GET"))
			.and(path("/v1/environments"))
			.respond_with(ResponseTemplate::new(200).set_body_json(body))
			.mount(&self.server)
			.await;
	}

	pub async fn fail_environments(&self, status: u16, message: &str) {
		Mock::given(method("GET"))
			.and(path("/v1/environments"))
			.respond_with(error_response(status, message))
			.mount(&self.server)
			.await;
	}

	pub async fn mount_collections(&self, environment_id: &str, body: Value) {
		Mock::given(method("GET"))
			.and(path(format!("/v1/environments/{environment_id}/collections")))
			.respond_with(ResponseTemplate::new(200).set_body_json(body))
			.mount(&self.server)
			.await;
	}

	/// Answers plain queries for `query` with `body`.
	pub async fn mount_query(&self, query: &str, body: Value) {
		Mock::given(method("GET"))
			.and(path(query_path()))
			.and(query_param("query", query))
			.respond_with(ResponseTemplate::new(200).set_body_json(body))
			.mount(&self.server)
			.await;
	}

	/// Answers natural-language queries for `query` with `body`.
	pub async fn mount_natural_language_query(&self, query: &str, body: Value) {
		Mock::given(method("GET"))
			.and(path(query_path()))
			.and(query_param("natural_language_query", query))
			.respond_with(ResponseTemplate::new(200).set_body_json(body))
			.mount(&self.server)
			.await;
	}

	/// Fails plain queries for `query` with a discovery-style error body.
	pub async fn fail_query(&self, query: &str, status: u16, message: &str) {
		Mock::given(method("GET"))
			.and(path(query_path()))
			.and(query_param("query", query))
			.respond_with(error_response(status, message))
			.mount(&self.server)
			.await;
	}

	/// Fails plain queries for `query` with an arbitrary JSON body.
	pub async fn fail_query_with_body(&self, query: &str, status: u16, body: Value) {
		Mock::given(method("GET"))
			.and(path(query_path()))
			.and(query_param("query", query))
			.respond_with(ResponseTemplate::new(status).set_body_json(body))
			.mount(&self.server)
			.await;
	}

	/// Answers queries that carry neither `query` nor `natural_language_query`.
	pub async fn mount_textless_query(&self, body: Value) {
		Mock::given(method("GET"))
			.and(path(query_path()))
			.and(query_param_is_missing("query"))
			.and(query_param_is_missing("natural_language_query"))
			.respond_with(ResponseTemplate::new(200).set_body_json(body))
			.mount(&self.server)
			.await;
	}

	/// Fails every collection query, including the seed query.
	pub async fn fail_all_queries(&self, status: u16, message: &str) {
		Mock::given(method("GET"))
			.and(path(query_path()))
			.respond_with(error_response(status, message))
			.mount(&self.server)
			.await;
	}

	/// Collection query requests received so far.
	pub async fn received_queries(&self) -> Vec<Request> {
		let query_path = query_path();

		self.server
			.received_requests()
			.await
			.unwrap_or_default()
			.into_iter()
			.filter(|request| request.url.path() == query_path)
			.collect()
	}
}

pub fn query_path() -> String {
	format!("/v1/environments/{ENVIRONMENT_ID}/collections/{COLLECTION_ID}/query")
}

pub fn error_response(status: u16, message: &str) -> ResponseTemplate {
	ResponseTemplate::new(status).set_body_json(serde_json::json!({
		"code": status,
		"error": message,
	}))
}

/// A discovery result carrying the fields the landing page reads.
pub fn discovery_result(matching_results: u64, title: &str) -> Value {
	serde_json::json!({
		"matching_results": matching_results,
		"results": [{ "id": "doc-1", "title": title }],
		"aggregations": [{
			"type": "term",
			"field": "enriched_text.entities.text",
			"results": [{ "key": "IBM", "matching_results": matching_results }]
		}]
	})
}

pub fn test_config(api_base: String) -> Config {
	Config {
		service: Service {
			http_bind: "127.0.0.1:0".to_string(),
			log_level: "info".to_string(),
			public_base_url: None,
		},
		discovery: Discovery {
			api_base,
			version: "2017-11-07".to_string(),
			api_key: Some("test-key".to_string()),
			username: None,
			password: None,
			environment_id: None,
			collection_id: Some(COLLECTION_ID.to_string()),
			timeout_ms: 2_000,
			default_headers: Map::new(),
		},
		search: Search::default(),
		seed: Seed::default(),
		views: Views::default(),
	}
}
