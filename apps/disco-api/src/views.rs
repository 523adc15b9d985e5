use std::fs;

use axum::{
	http::StatusCode,
	response::{Html, IntoResponse, Response},
};
use color_eyre::eyre;
use handlebars::Handlebars;
use serde::Serialize;
use serde_json::Value;

const INDEX: &str = "index";
const DEFAULT_INDEX_TEMPLATE: &str = include_str!("../views/index.hbs");

/// Context handed to the `index` template. Absent fields serialize as `null`.
#[derive(Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexView<'a> {
	pub entities: Option<&'a Value>,
	pub categories: Option<&'a Value>,
	pub concepts: Option<&'a Value>,
	pub data: Option<&'a Value>,
	pub search_query: Option<&'a str>,
	pub num_matches: Option<&'a Value>,
	pub error: Option<&'a str>,
}
impl<'a> IndexView<'a> {
	pub fn results(payload: &'a Value, search_query: Option<&'a str>) -> Self {
		Self {
			entities: Some(payload),
			categories: Some(payload),
			concepts: Some(payload),
			data: Some(payload),
			search_query,
			num_matches: payload.get("matching_results"),
			error: None,
		}
	}

	pub fn error(message: &'a str) -> Self {
		Self { error: Some(message), ..Default::default() }
	}
}

pub struct Views {
	registry: Handlebars<'static>,
}
impl Views {
	pub fn load(cfg: &disco_config::Views) -> color_eyre::Result<Self> {
		let source = match cfg.index_path.as_ref() {
			Some(path) => fs::read_to_string(path).map_err(|err| {
				eyre::eyre!("Failed to read index template at {}: {err}.", path.display())
			})?,
			None => DEFAULT_INDEX_TEMPLATE.to_string(),
		};

		Self::from_source(&source)
	}

	pub fn from_source(source: &str) -> color_eyre::Result<Self> {
		let mut registry = Handlebars::new();

		registry
			.register_template_string(INDEX, source)
			.map_err(|err| eyre::eyre!("Failed to compile index template: {err}."))?;

		Ok(Self { registry })
	}

	pub fn render_index(&self, status: StatusCode, view: &IndexView<'_>) -> Response {
		match self.registry.render(INDEX, view) {
			Ok(html) => (status, Html(html)).into_response(),
			Err(err) => {
				tracing::error!(error = %err, "Failed to render index view.");

				(StatusCode::INTERNAL_SERVER_ERROR, "Failed to render page.").into_response()
			},
		}
	}
}
