use axum::{
	Json, Router,
	extract::{Path, Query, State},
	http::{Method, StatusCode},
	response::{IntoResponse, Response},
	routing::get,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use disco_service::{QUOTA_EXCEEDED_MESSAGE, QueryMode, SearchRequest};

use crate::{state::AppState, views::IndexView};

const FETCH_ERROR_MESSAGE: &str = "Error fetching data";

pub fn router(state: AppState) -> Router {
	Router::new()
		.route("/api/search", get(api_search))
		.route("/{search_query}", get(search_page))
		.fallback(landing)
		.with_state(state)
}

/// Query-string parameters accepted by `/api/search`.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchParams {
	pub query: Option<String>,
	pub filters: Option<String>,
	pub count: Option<String>,
	pub return_passages: Option<String>,
	pub query_type: Option<String>,
}
impl SearchParams {
	pub fn into_request(self) -> SearchRequest {
		SearchRequest {
			mode: QueryMode::from_query_type(self.query_type.as_deref()),
			text: self.query,
			filter: self.filters,
			count: self.count.and_then(|count| count.trim().parse().ok()),
		}
	}
}

async fn api_search(
	State(state): State<AppState>,
	Query(params): Query<SearchParams>,
) -> Result<Json<Value>, ApiError> {
	// Passages are not requested upstream.
	tracing::debug!(
		query = ?params.query,
		query_type = ?params.query_type,
		return_passages = ?params.return_passages,
		"Handling API search."
	);

	let request = params.into_request();
	let response = state.service.search(&request).await?;
	Ok(Json(response))
}

async fn search_page(
	State(state): State<AppState>,
	Path(search_query): Path<String>,
) -> Response {
	let search_query = search_query.replace('+', " ");

	tracing::info!(%search_query, "Handling path search.");

	match fetch_search(&state, &search_query).await {
		Ok(payload) => {
			let view = IndexView::results(&payload, Some(search_query.as_str()));

			state.views.render_index(StatusCode::OK, &view)
		},
		Err(status) => {
			let message = if status == StatusCode::TOO_MANY_REQUESTS {
				QUOTA_EXCEEDED_MESSAGE
			} else {
				FETCH_ERROR_MESSAGE
			};

			state.views.render_index(status, &IndexView::error(message))
		},
	}
}

async fn landing(State(state): State<AppState>, method: Method) -> Response {
	if method != Method::GET && method != Method::HEAD {
		return StatusCode::NOT_FOUND.into_response();
	}

	tracing::debug!("Rendering landing page from seed result.");

	state.views.render_index(StatusCode::OK, &IndexView::results(&state.seed, None))
}

/// Calls this server's own `/api/search` and returns the JSON payload, or the status to render the
/// error page with.
///
/// The target is always `AppState::public_base_url`; request headers never pick the host.
async fn fetch_search(state: &AppState, search_query: &str) -> Result<Value, StatusCode> {
	let Some(base) = state.public_base_url.as_deref() else {
		tracing::error!("No base URL for internal search requests.");

		return Err(StatusCode::INTERNAL_SERVER_ERROR);
	};
	let response = state
		.http
		.get(format!("{base}/api/search"))
		.query(&[("query", search_query)])
		.send()
		.await
		.map_err(|err| {
			tracing::warn!(error = %err, "Internal search request failed.");

			StatusCode::INTERNAL_SERVER_ERROR
		})?;
	let status = StatusCode::from_u16(response.status().as_u16())
		.unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

	if !status.is_success() {
		return Err(status);
	}

	response.json::<Value>().await.map_err(|err| {
		tracing::warn!(error = %err, "Internal search response was not JSON.");

		StatusCode::INTERNAL_SERVER_ERROR
	})
}

/// Error body returned by `/api/search` when the upstream sent none.
#[derive(Debug, Serialize)]
struct ErrorBody {
	code: u16,
	error: String,
}

#[derive(Debug)]
pub struct ApiError {
	status: StatusCode,
	message: String,
	body: Option<Value>,
}

impl From<disco_service::Error> for ApiError {
	fn from(err: disco_service::Error) -> Self {
		let status = StatusCode::from_u16(err.status())
			.ok()
			.filter(|status| status.is_client_error() || status.is_server_error())
			.unwrap_or(StatusCode::BAD_GATEWAY);

		Self { status, message: err.message(), body: err.body().cloned() }
	}
}

impl IntoResponse for ApiError {
	fn into_response(self) -> Response {
		match self.body {
			Some(body) => (self.status, Json(body)).into_response(),
			None => {
				let body = ErrorBody { code: self.status.as_u16(), error: self.message };
				(self.status, Json(body)).into_response()
			},
		}
	}
}
