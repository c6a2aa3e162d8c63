//! Requests against a live mock server

use formwork_http::{
	Method, RequestConfig, RequestError, Requests, ReqwestTransport, UrlResolver,
};
use rstest::rstest;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn requests_for(server: &MockServer) -> Requests {
	let base = server.uri();
	let transport = ReqwestTransport::builder()
		.timeout(Duration::from_secs(5))
		.build()
		.unwrap();
	Requests::new(Arc::new(transport))
		.with_url_resolver(UrlResolver::custom(move |p| Ok(format!("{}{}", base, p))))
}

#[rstest]
#[tokio::test]
async fn test_post_sends_headers_and_json_body() {
	// Arrange
	let server = MockServer::start().await;
	Mock::given(method("POST"))
		.and(path("/items/"))
		.and(header("Accept", "application/json"))
		.and(header("Content-Type", "application/json"))
		.and(body_json(json!({"name": "widget", "count": 3})))
		.respond_with(ResponseTemplate::new(201).set_body_json(json!({"id": 11})))
		.expect(1)
		.mount(&server)
		.await;
	let requests = requests_for(&server);

	// Act
	let response = requests
		.post("/items/", json!({"name": "widget", "count": 3}))
		.await
		.unwrap();

	// Assert
	assert_eq!(response.status, 201);
	assert_eq!(response.data, json!({"id": 11}));
}

#[rstest]
#[tokio::test]
async fn test_get_repeats_list_arguments() {
	let server = MockServer::start().await;
	Mock::given(method("GET"))
		.and(path("/search/"))
		.and(query_param("q", "red shoes"))
		.and(query_param("tag", "a"))
		.and(query_param("tag", "b"))
		.respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
		.expect(1)
		.mount(&server)
		.await;
	let requests = requests_for(&server);

	let response = requests
		.get(
			"/search/",
			RequestConfig::new()
				.arg("q", json!("red shoes"))
				.arg("tag", json!(["a", "b"])),
		)
		.await
		.unwrap();

	assert_eq!(response.data, json!([]));
}

#[rstest]
#[tokio::test]
async fn test_validation_failure_is_returned_as_response() {
	let server = MockServer::start().await;
	let details = json!({"details": [{"loc": ["email"], "msg": "invalid format"}]});
	Mock::given(method("POST"))
		.and(path("/signup/"))
		.respond_with(ResponseTemplate::new(422).set_body_json(details.clone()))
		.mount(&server)
		.await;
	let requests = requests_for(&server);

	let response = requests.post("/signup/", json!({"email": "x"})).await.unwrap();

	assert_eq!(response.status, 422);
	assert_eq!(response.data, details);
}

#[rstest]
#[case(ResponseTemplate::new(500).set_body_json(json!({"message": "database unavailable"})), "database unavailable")]
#[case(ResponseTemplate::new(500).set_body_string("<h1>Server Error</h1>"), "Unexpected response 500")]
#[tokio::test]
async fn test_server_error_message(#[case] template: ResponseTemplate, #[case] message: &str) {
	let server = MockServer::start().await;
	Mock::given(method("DELETE"))
		.and(path("/items/1/"))
		.respond_with(template)
		.mount(&server)
		.await;
	let requests = requests_for(&server);

	let err = requests.delete("/items/1/").await.unwrap_err();

	assert_eq!(err.status(), Some(500));
	assert_eq!(err.to_string(), message);
	assert!(err.context().unwrap().url.ends_with("/items/1/"));
}

#[rstest]
#[tokio::test]
async fn test_expected_status_override() {
	let server = MockServer::start().await;
	Mock::given(method("PUT"))
		.and(path("/items/1/"))
		.respond_with(ResponseTemplate::new(204))
		.mount(&server)
		.await;
	let requests = requests_for(&server);

	let response = requests
		.request(
			Method::PUT,
			"/items/1/",
			RequestConfig::new()
				.send_data(json!({"a": 1}))
				.expected_status([204]),
		)
		.await
		.unwrap();

	assert_eq!(response.status, 204);
	assert!(response.data.is_null());
}

#[rstest]
#[tokio::test]
async fn test_connection_refused_is_transport_error() {
	// Arrange: bind then drop a server so the port refuses connections
	let server = MockServer::start().await;
	let requests = requests_for(&server);
	drop(server);

	// Act
	let err = requests
		.post("/items/", json!({"name": "widget"}))
		.await
		.unwrap_err();

	// Assert
	match &err {
		RequestError::Transport { context, .. } => {
			assert_eq!(context.method, "POST");
			assert!(context.url.ends_with("/items/"));
			assert_eq!(context.body.as_deref(), Some(r#"{"name":"widget"}"#));
		}
		other => panic!("expected transport error, got {:?}", other),
	}
	assert_eq!(err.status(), None);
}
