use axum::{
	Router,
	body::{self, Body},
	http::{Request, StatusCode},
};
use tokio::net::TcpListener;
use tower::util::ServiceExt;

use disco_api::{routes, state::AppState};
use disco_service::QUOTA_EXCEEDED_MESSAGE;
use disco_testkit::{MockDiscovery, discovery_result, test_config};

async fn ready_state(mock: &MockDiscovery) -> AppState {
	mock.mount_ready(discovery_result(1_000, "Seed headline")).await;

	AppState::new(&test_config(mock.uri())).await.expect("Failed to initialize app state.")
}

async fn get(app: Router, uri: &str) -> (StatusCode, String) {
	let response = app
		.oneshot(Request::builder().uri(uri).body(Body::empty()).expect("Failed to build request."))
		.await
		.expect("Failed to call router.");
	let status = response.status();
	let body = body::to_bytes(response.into_body(), usize::MAX)
		.await
		.expect("Failed to read response body.");

	(status, String::from_utf8(body.to_vec()).expect("Response body must be UTF-8."))
}

async fn get_json(app: Router, uri: &str) -> (StatusCode, serde_json::Value) {
	let (status, body) = get(app, uri).await;
	let json = serde_json::from_str(&body).expect("Failed to parse response.");

	(status, json)
}

async fn serve(mut state: AppState) -> String {
	let listener = TcpListener::bind("127.0.0.1:0").await.expect("Failed to bind listener.");
	let addr = listener.local_addr().expect("Failed to read listener address.");

	state.public_base_url = Some(disco_api::local_base_url(addr));

	tokio::spawn(async move {
		axum::serve(listener, routes::router(state)).await.expect("Server failed.");
	});

	format!("http://{addr}")
}

#[tokio::test]
async fn api_search_returns_upstream_json() {
	let mock = MockDiscovery::start().await;
	let state = ready_state(&mock).await;

	mock.mount_query("test", discovery_result(5, "Test headline")).await;

	let (status, json) = get_json(routes::router(state), "/api/search?query=test&count=5").await;

	assert_eq!(status, StatusCode::OK);
	assert_eq!(json["matching_results"], 5);
	assert_eq!(json["results"][0]["title"], "Test headline");

	let queries = mock.received_queries().await;
	let search = queries.last().expect("Missing upstream query.");
	let pairs: Vec<(String, String)> = search.url.query_pairs().into_owned().collect();

	assert!(pairs.contains(&("count".to_string(), "5".to_string())));
	assert!(pairs.iter().all(|(key, _)| key != "natural_language_query"));
}

#[tokio::test]
async fn api_search_uses_natural_language_slot() {
	let mock = MockDiscovery::start().await;
	let state = ready_state(&mock).await;

	mock.mount_natural_language_query("who acquired red hat", discovery_result(7, "NL headline"))
		.await;

	let (status, json) = get_json(
		routes::router(state),
		"/api/search?query=who%20acquired%20red%20hat&queryType=natural_language_query&returnPassages=true",
	)
	.await;

	assert_eq!(status, StatusCode::OK);
	assert_eq!(json["matching_results"], 7);

	let queries = mock.received_queries().await;
	let search = queries.last().expect("Missing upstream query.");

	assert!(search.url.query_pairs().all(|(key, _)| key != "query" && key != "passages"));
}

#[tokio::test]
async fn api_search_maps_quota_exhaustion_to_429() {
	let mock = MockDiscovery::start().await;
	let state = ready_state(&mock).await;

	mock.fail_query("quota", 400, QUOTA_EXCEEDED_MESSAGE).await;

	let (status, json) = get_json(routes::router(state), "/api/search?query=quota").await;

	assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
	// The upstream payload is returned as sent; only the HTTP status changes.
	assert_eq!(json["code"], 400);
	assert_eq!(json["error"], QUOTA_EXCEEDED_MESSAGE);
}

#[tokio::test]
async fn api_search_propagates_upstream_status() {
	let mock = MockDiscovery::start().await;
	let state = ready_state(&mock).await;

	mock.fail_query("outage", 503, "Service is temporarily unavailable").await;

	let (status, json) = get_json(routes::router(state), "/api/search?query=outage").await;

	assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
	assert_eq!(json["code"], 503);
	assert_eq!(json["error"], "Service is temporarily unavailable");
}

#[tokio::test]
async fn api_search_passes_upstream_error_body_through() {
	let mock = MockDiscovery::start().await;
	let state = ready_state(&mock).await;

	mock.fail_query_with_body(
		"outage",
		503,
		serde_json::json!({
			"code": 503,
			"error": "Service is temporarily unavailable",
			"description": "maintenance window"
		}),
	)
	.await;

	let (status, json) = get_json(routes::router(state), "/api/search?query=outage").await;

	assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
	assert_eq!(json["code"], 503);
	assert_eq!(json["error"], "Service is temporarily unavailable");
	assert_eq!(json["description"], "maintenance window");
}

#[tokio::test]
async fn api_search_without_query_sends_no_text() {
	let mock = MockDiscovery::start().await;
	let state = ready_state(&mock).await;

	mock.mount_textless_query(discovery_result(42, "Unfiltered headline")).await;

	let (status, json) = get_json(routes::router(state), "/api/search").await;

	assert_eq!(status, StatusCode::OK);
	assert_eq!(json["matching_results"], 42);

	let queries = mock.received_queries().await;
	let search = queries.last().expect("Missing upstream query.");

	assert!(
		search.url.query_pairs().all(|(key, _)| key != "query" && key != "natural_language_query"),
		"unexpected text parameter in {}",
		search.url
	);
}

#[tokio::test]
async fn catch_all_renders_seed_without_querying() {
	let mock = MockDiscovery::start().await;
	let state = ready_state(&mock).await;
	let app = routes::router(state);

	for uri in ["/", "/news/today", "/api/search/extra"] {
		let (status, html) = get(app.clone(), uri).await;

		assert_eq!(status, StatusCode::OK, "uri {uri}");
		assert!(html.contains("Seed headline"), "uri {uri}");
		assert!(html.contains("1000 matching results"), "uri {uri}");
	}

	assert_eq!(mock.received_queries().await.len(), 1);
}

#[tokio::test]
async fn path_search_decodes_plus_and_renders_results() {
	let mock = MockDiscovery::start().await;
	let state = ready_state(&mock).await;

	mock.mount_query("ibm watson", discovery_result(12, "Watson headline")).await;

	let base = serve(state).await;
	let response =
		reqwest::get(format!("{base}/ibm+watson")).await.expect("Failed to call path search.");

	assert_eq!(response.status().as_u16(), 200);

	let html = response.text().await.expect("Failed to read page.");

	assert!(html.contains("Watson headline"));
	assert!(html.contains("12 matching results"));
	assert!(html.contains("ibm watson"));
	assert!(!html.contains("Seed headline"));
}

#[tokio::test]
async fn path_search_renders_quota_message_with_429() {
	let mock = MockDiscovery::start().await;
	let state = ready_state(&mock).await;

	mock.fail_query("quota", 400, QUOTA_EXCEEDED_MESSAGE).await;

	let base = serve(state).await;
	let response = reqwest::get(format!("{base}/quota")).await.expect("Failed to call path search.");

	assert_eq!(response.status().as_u16(), 429);

	let html = response.text().await.expect("Failed to read page.");

	assert!(html.contains(QUOTA_EXCEEDED_MESSAGE));
}

#[tokio::test]
async fn path_search_renders_generic_error_with_upstream_status() {
	let mock = MockDiscovery::start().await;
	let state = ready_state(&mock).await;

	mock.fail_query("outage", 503, "Service is temporarily unavailable").await;

	let base = serve(state).await;
	let response =
		reqwest::get(format!("{base}/outage")).await.expect("Failed to call path search.");

	assert_eq!(response.status().as_u16(), 503);

	let html = response.text().await.expect("Failed to read page.");

	assert!(html.contains("Error fetching data"));
	assert!(!html.contains("Service is temporarily unavailable"));
}

#[tokio::test]
async fn path_search_ignores_client_host_header() {
	let mock = MockDiscovery::start().await;
	let state = ready_state(&mock).await;

	mock.mount_query("ibm", discovery_result(4, "Own API headline")).await;

	let base = serve(state).await;
	let response = reqwest::Client::new()
		.get(format!("{base}/ibm"))
		.header(reqwest::header::HOST, "attacker.invalid:9")
		.send()
		.await
		.expect("Failed to call path search.");

	assert_eq!(response.status().as_u16(), 200);

	let html = response.text().await.expect("Failed to read page.");

	assert!(html.contains("Own API headline"));
}

#[tokio::test]
async fn path_search_without_base_url_renders_error() {
	let mock = MockDiscovery::start().await;
	let mut state = ready_state(&mock).await;

	state.public_base_url = None;

	let response = routes::router(state)
		.oneshot(
			Request::builder()
				.uri("/ibm")
				.header("host", "attacker.invalid:9")
				.body(Body::empty())
				.expect("Failed to build request."),
		)
		.await
		.expect("Failed to call router.");

	assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

	let body = body::to_bytes(response.into_body(), usize::MAX)
		.await
		.expect("Failed to read response body.");
	let html = String::from_utf8(body.to_vec()).expect("Response body must be UTF-8.");

	assert!(html.contains("Error fetching data"));
	assert_eq!(mock.received_queries().await.len(), 1);
}

#[tokio::test]
async fn startup_failure_builds_no_state() {
	let mock = MockDiscovery::start().await;

	mock.fail_environments(401, "Unauthorized").await;

	let Err(err) = AppState::new(&test_config(mock.uri())).await else {
		panic!("Expected startup to fail.");
	};

	assert!(err.to_string().contains("environments"));
	assert!(mock.received_queries().await.is_empty());
}

#[tokio::test]
async fn seed_failure_builds_no_state() {
	let mock = MockDiscovery::start().await;

	mock.mount_environments(serde_json::json!({
		"environments": [{ "environment_id": disco_testkit::ENVIRONMENT_ID }]
	}))
	.await;
	mock.fail_all_queries(500, "Internal error").await;

	let Err(err) = AppState::new(&test_config(mock.uri())).await else {
		panic!("Expected startup to fail.");
	};

	assert!(err.to_string().contains("seed"));
	assert_eq!(mock.received_queries().await.len(), 1);
}

#[tokio::test]
async fn startup_resolves_collection_from_listing() {
	let mock = MockDiscovery::start().await;

	mock.mount_ready(discovery_result(3, "Seed headline")).await;
	mock.mount_collections(
		disco_testkit::ENVIRONMENT_ID,
		serde_json::json!({ "collections": [{ "collection_id": disco_testkit::COLLECTION_ID }] }),
	)
	.await;

	let mut cfg = test_config(mock.uri());

	cfg.discovery.collection_id = None;

	let state = AppState::new(&cfg).await.expect("Failed to initialize app state.");

	assert_eq!(state.service.context().environment_id, disco_testkit::ENVIRONMENT_ID);
	assert_eq!(state.service.context().collection_id, disco_testkit::COLLECTION_ID);
	assert_eq!(state.seed["matching_results"], 3);
}
