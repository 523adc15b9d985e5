mod error;
mod types;

pub use error::{Error, Result};
pub use types::{Config, Discovery, Search, Seed, Service, Views};

use std::{fs, path::Path};

pub fn load(path: &Path) -> Result<Config> {
	let raw = fs::read_to_string(path)
		.map_err(|err| Error::ReadConfig { path: path.to_path_buf(), source: err })?;

	let mut cfg: Config = toml::from_str(&raw)
		.map_err(|err| Error::ParseConfig { path: path.to_path_buf(), source: err })?;

	normalize(&mut cfg);

	validate(&cfg)?;

	Ok(cfg)
}

pub fn validate(cfg: &Config) -> Result<()> {
	if cfg.service.http_bind.trim().is_empty() {
		return Err(Error::Validation {
			message: "service.http_bind must be non-empty.".to_string(),
		});
	}
	if let Some(base) = cfg.service.public_base_url.as_deref()
		&& !is_http_url(base)
	{
		return Err(Error::Validation {
			message: "service.public_base_url must start with http:// or https://.".to_string(),
		});
	}
	if !is_http_url(&cfg.discovery.api_base) {
		return Err(Error::Validation {
			message: "discovery.api_base must start with http:// or https://.".to_string(),
		});
	}
	if cfg.discovery.version.trim().is_empty() {
		return Err(Error::Validation {
			message: "discovery.version must be non-empty.".to_string(),
		});
	}

	match (&cfg.discovery.api_key, &cfg.discovery.username) {
		(Some(_), Some(_)) => {
			return Err(Error::Validation {
				message: "discovery.api_key and discovery.username are mutually exclusive."
					.to_string(),
			});
		},
		(None, None) => {
			return Err(Error::Validation {
				message: "Either discovery.api_key or discovery.username must be set.".to_string(),
			});
		},
		(None, Some(_)) if cfg.discovery.password.is_none() => {
			return Err(Error::Validation {
				message: "discovery.password must be set when discovery.username is set."
					.to_string(),
			});
		},
		_ => {},
	}

	if cfg.discovery.timeout_ms == 0 {
		return Err(Error::Validation {
			message: "discovery.timeout_ms must be greater than zero.".to_string(),
		});
	}

	for (key, value) in &cfg.discovery.default_headers {
		if !value.is_string() {
			return Err(Error::Validation {
				message: format!("discovery.default_headers.{key} must be a string."),
			});
		}
	}

	if cfg.seed.count == 0 {
		return Err(Error::Validation {
			message: "seed.count must be greater than zero.".to_string(),
		});
	}

	Ok(())
}

fn normalize(cfg: &mut Config) {
	for slot in [
		&mut cfg.service.public_base_url,
		&mut cfg.discovery.api_key,
		&mut cfg.discovery.username,
		&mut cfg.discovery.password,
		&mut cfg.discovery.environment_id,
		&mut cfg.discovery.collection_id,
		&mut cfg.search.aggregation,
		&mut cfg.search.return_fields,
	] {
		if slot.as_deref().map(|value| value.trim().is_empty()).unwrap_or(false) {
			*slot = None;
		}
	}

	let api_base = cfg.discovery.api_base.trim().trim_end_matches('/').to_string();

	cfg.discovery.api_base = api_base;

	if let Some(base) = cfg.service.public_base_url.as_mut() {
		*base = base.trim().trim_end_matches('/').to_string();
	}
}

fn is_http_url(value: &str) -> bool {
	value.starts_with("http://") || value.starts_with("https://")
}
