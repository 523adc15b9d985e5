use std::path::PathBuf;

use serde::Deserialize;
use serde_json::{Map, Value};

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
	pub service: Service,
	pub discovery: Discovery,
	#[serde(default)]
	pub search: Search,
	#[serde(default)]
	pub seed: Seed,
	#[serde(default)]
	pub views: Views,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Service {
	pub http_bind: String,
	#[serde(default = "default_log_level")]
	pub log_level: String,
	/// Optional. Base URL the page routes use to reach `/api/search` on this server. When unset,
	/// the bound listener address is used.
	pub public_base_url: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Discovery {
	pub api_base: String,
	pub version: String,
	pub api_key: Option<String>,
	pub username: Option<String>,
	pub password: Option<String>,
	/// Optional. Falls back to the first environment the service lists.
	pub environment_id: Option<String>,
	/// Optional. Falls back to the first collection of the resolved environment.
	pub collection_id: Option<String>,
	#[serde(default = "default_timeout_ms")]
	pub timeout_ms: u64,
	#[serde(default)]
	pub default_headers: Map<String, Value>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Search {
	/// Aggregation expression appended to every query, e.g. term counts over enriched entities.
	pub aggregation: Option<String>,
	/// Comma-separated list of result fields to return.
	pub return_fields: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Seed {
	#[serde(default = "default_seed_count")]
	pub count: u32,
}
impl Default for Seed {
	fn default() -> Self {
		Self { count: default_seed_count() }
	}
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Views {
	pub index_path: Option<PathBuf>,
}

fn default_log_level() -> String {
	"info".to_string()
}

fn default_timeout_ms() -> u64 {
	10_000
}

fn default_seed_count() -> u32 {
	1_000
}
