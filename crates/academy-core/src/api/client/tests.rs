//! Tests for the API client against a mock backend

use crate::api::{ApiClient, MockTokenSource, RequestDescriptor};
use crate::config::ApiConfig;
use crate::error::{ApiErrorKind, AuthError, AuthErrorKind};
use crate::events::{Notification, NotificationBus, RETRY_NOTIFICATION_ID, drain};
use serde_json::{Value, json};
use std::sync::Arc;
use std::time::{Duration, Instant};
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn fast_config(server: &MockServer) -> ApiConfig {
    ApiConfig::new(format!("{}/api", server.uri())).with_max_retry_delay(Duration::from_millis(10))
}

fn client_with_bus(config: ApiConfig) -> (ApiClient, NotificationBus) {
    let bus = NotificationBus::new(32);
    let client = ApiClient::new(config)
        .expect("client should build")
        .with_notifier(Arc::new(bus.clone()));
    (client, bus)
}

fn tokens(result: Result<Option<String>, AuthError>) -> Arc<MockTokenSource> {
    let mut source = MockTokenSource::new();
    source
        .expect_current_token()
        .returning(move || result.clone());
    Arc::new(source)
}

fn warming_up(retry_after: u64) -> ResponseTemplate {
    ResponseTemplate::new(503).set_body_json(json!({
        "message": "Database is connecting",
        "retryAfter": retry_after,
    }))
}

async fn request_count(server: &MockServer) -> usize {
    server.received_requests().await.map(|r| r.len()).unwrap_or(0)
}

#[tokio::test]
async fn test_get_decodes_json_and_sends_params() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/courses"))
        .and(query_param("search", "rust"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "courses": [] })))
        .expect(1)
        .mount(&server)
        .await;

    let (client, _bus) = client_with_bus(fast_config(&server));
    let body: Value = client
        .get("/courses", &[("category", ""), ("search", "rust")])
        .await
        .unwrap();

    assert_eq!(body, json!({ "courses": [] }));
}

#[tokio::test]
async fn test_post_sends_json_body() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/enrollments"))
        .and(body_json(json!({ "courseId": "c1" })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({ "_id": "e1" })))
        .expect(1)
        .mount(&server)
        .await;

    let (client, _bus) = client_with_bus(fast_config(&server));
    let created: Value = client
        .post("/enrollments", &json!({ "courseId": "c1" }))
        .await
        .unwrap();
    assert_eq!(created["_id"], "e1");
}

#[tokio::test]
async fn test_empty_body_decodes_as_unit() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/api/courses/c1"))
        .respond_with(ResponseTemplate::new(204))
        .mount(&server)
        .await;

    let (client, _bus) = client_with_bus(fast_config(&server));
    let result: Result<(), _> = client.delete("/courses/c1").await;
    assert!(result.is_ok());
}

#[tokio::test]
async fn test_attaches_bearer_token_when_authenticated() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/enrollments/mine"))
        .and(header("authorization", "Bearer id-token-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&server)
        .await;

    let (client, _bus) = client_with_bus(fast_config(&server));
    let client = client.with_token_source(tokens(Ok(Some("id-token-1".to_string()))));

    let body: Value = client.get("/enrollments/mine", &[]).await.unwrap();
    assert_eq!(body, json!([]));
}

#[tokio::test]
async fn test_no_authorization_header_when_anonymous() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "courses": [] })))
        .mount(&server)
        .await;

    let (client, _bus) = client_with_bus(fast_config(&server));
    let client = client.with_token_source(tokens(Ok(None)));
    let _: Value = client.get("/courses", &[]).await.unwrap();

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);
    assert!(!requests[0].headers.contains_key("authorization"));
}

#[tokio::test]
async fn test_token_failure_sends_request_unauthenticated() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "ok": true })))
        .mount(&server)
        .await;

    let (client, _bus) = client_with_bus(fast_config(&server));
    let client = client.with_token_source(tokens(Err(AuthError::new(AuthErrorKind::Unknown)
        .with_message("token refresh failed"))));

    let body: Value = client.get("/courses", &[]).await.unwrap();
    assert_eq!(body["ok"], true);

    let requests = server.received_requests().await.unwrap();
    assert!(!requests[0].headers.contains_key("authorization"));
}

#[tokio::test]
async fn test_retries_service_unavailable_then_succeeds() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/courses"))
        .respond_with(warming_up(2))
        .up_to_n_times(2)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/courses"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "courses": ["a"] })))
        .mount(&server)
        .await;

    let (client, bus) = client_with_bus(fast_config(&server));
    let mut notifications = bus.subscribe();

    let body: Value = client.get("/courses", &[]).await.unwrap();

    assert_eq!(body["courses"][0], "a");
    assert_eq!(request_count(&server).await, 3);
    assert_eq!(
        drain(&mut notifications),
        vec![
            Notification::progress(RETRY_NOTIFICATION_ID, "Database connecting... Retrying (1/3)"),
            Notification::progress(RETRY_NOTIFICATION_ID, "Database connecting... Retrying (2/3)"),
            Notification::dismiss(RETRY_NOTIFICATION_ID),
        ]
    );
}

#[tokio::test]
async fn test_exhausted_retries_fail_with_service_unavailable() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(warming_up(1))
        .mount(&server)
        .await;

    let (client, bus) = client_with_bus(fast_config(&server));
    let mut notifications = bus.subscribe();

    let error = client.get::<Value>("/courses", &[]).await.unwrap_err();

    assert_eq!(error.kind, ApiErrorKind::ServiceUnavailable);
    assert_eq!(error.message.as_deref(), Some("Database is connecting"));
    // one original attempt plus three retries
    assert_eq!(request_count(&server).await, 4);

    let errors: Vec<_> = drain(&mut notifications)
        .into_iter()
        .filter(|n| matches!(n, Notification::Error { .. }))
        .collect();
    assert_eq!(
        errors,
        vec![Notification::api_error(
            ApiErrorKind::ServiceUnavailable,
            "Database is connecting"
        )]
    );
}

#[tokio::test]
async fn test_retry_waits_advertised_delay() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(warming_up(1))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .mount(&server)
        .await;

    let config = ApiConfig::new(format!("{}/api", server.uri()));
    let (client, _bus) = client_with_bus(config);

    let started = Instant::now();
    let _: Value = client.get("/courses", &[]).await.unwrap();

    assert!(started.elapsed() >= Duration::from_millis(950));
    assert_eq!(request_count(&server).await, 2);
}

#[tokio::test]
async fn test_503_without_retry_after_is_not_retried() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503).set_body_json(json!({ "message": "down" })))
        .mount(&server)
        .await;

    let (client, _bus) = client_with_bus(fast_config(&server));
    let error = client.get::<Value>("/courses", &[]).await.unwrap_err();

    assert_eq!(error.kind, ApiErrorKind::ServiceUnavailable);
    assert_eq!(request_count(&server).await, 1);
}

#[tokio::test]
async fn test_other_errors_are_not_retried() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({ "retryAfter": 1 })))
        .mount(&server)
        .await;

    let (client, _bus) = client_with_bus(fast_config(&server));
    let error = client.get::<Value>("/courses", &[]).await.unwrap_err();

    assert_eq!(error.kind, ApiErrorKind::Server);
    assert_eq!(request_count(&server).await, 1);
}

#[tokio::test]
async fn test_status_classification_and_single_notification() {
    let cases = [
        (401, json!({}), ApiErrorKind::Unauthorized),
        (403, json!({}), ApiErrorKind::Forbidden),
        (404, json!({}), ApiErrorKind::NotFound),
        (409, json!({ "message": "Already enrolled" }), ApiErrorKind::Application),
        (422, json!({}), ApiErrorKind::Unknown),
    ];

    for (status, body, expected) in cases {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(status).set_body_json(body))
            .mount(&server)
            .await;

        let (client, bus) = client_with_bus(fast_config(&server));
        let mut notifications = bus.subscribe();
        let error = client.get::<Value>("/courses", &[]).await.unwrap_err();

        assert_eq!(error.kind, expected, "status {}", status);
        assert_eq!(error.status, Some(status));
        let received = drain(&mut notifications);
        assert_eq!(received.len(), 1, "status {}", status);
        assert_eq!(received[0], Notification::api_error(expected, error.user_message()));
    }
}

#[tokio::test]
async fn test_timeout_is_distinct_from_network_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({}))
                .set_delay(Duration::from_secs(2)),
        )
        .mount(&server)
        .await;

    let config = fast_config(&server).with_request_timeout(Duration::from_millis(200));
    let (client, _bus) = client_with_bus(config);

    let error = client.get::<Value>("/courses", &[]).await.unwrap_err();
    assert_eq!(error.kind, ApiErrorKind::Timeout);
}

#[tokio::test]
async fn test_connection_refused_is_network_error() {
    let port = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().port()
    };

    let config = ApiConfig::new(format!("http://127.0.0.1:{}/api", port));
    let (client, bus) = client_with_bus(config);
    let mut notifications = bus.subscribe();

    let error = client.get::<Value>("/courses", &[]).await.unwrap_err();

    assert_eq!(error.kind, ApiErrorKind::Network);
    assert_eq!(error.status, None);
    assert_eq!(drain(&mut notifications).len(), 1);
}

#[tokio::test]
async fn test_invalid_success_body_is_unknown_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>"))
        .mount(&server)
        .await;

    let (client, _bus) = client_with_bus(fast_config(&server));
    let error = client.get::<Value>("/courses", &[]).await.unwrap_err();
    assert_eq!(error.kind, ApiErrorKind::Unknown);
}

#[tokio::test]
async fn test_custom_descriptor_headers() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(header("x-request-source", "cli"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!(1)))
        .expect(1)
        .mount(&server)
        .await;

    let (client, _bus) = client_with_bus(fast_config(&server));
    let request = RequestDescriptor::get("/health").with_header("x-request-source", "cli");
    let value: u32 = client.send(request).await.unwrap();
    assert_eq!(value, 1);
}

#[tokio::test]
async fn test_retries_reuse_request_id() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/courses"))
        .respond_with(warming_up(1))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/courses"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "courses": [] })))
        .mount(&server)
        .await;

    let (client, _bus) = client_with_bus(fast_config(&server));
    let _: Value = client.get("/courses", &[]).await.unwrap();
    let _: Value = client.get("/courses", &[]).await.unwrap();

    let ids: Vec<String> = server
        .received_requests()
        .await
        .unwrap()
        .iter()
        .map(|r| r.headers["x-request-id"].to_str().unwrap().to_string())
        .collect();
    assert_eq!(ids.len(), 3);
    assert_eq!(ids[0], ids[1]);
    assert_ne!(ids[1], ids[2]);
}

#[tokio::test]
async fn test_oversized_retry_after_waits_capped_delay() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503).set_body_json(json!({
            "message": "Database is connecting",
            "retryAfter": 1e30,
        })))
        .mount(&server)
        .await;

    let (client, _bus) = client_with_bus(fast_config(&server));
    let started = Instant::now();
    let error = client.get::<Value>("/courses", &[]).await.unwrap_err();

    assert_eq!(error.kind, ApiErrorKind::ServiceUnavailable);
    assert_eq!(request_count(&server).await, 4);
    assert!(started.elapsed() < Duration::from_secs(5));
}
