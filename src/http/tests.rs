//! Tests for the HTTP client module

use super::*;
use crate::error::Error;
use crate::types::BackoffType;
use pretty_assertions::assert_eq;
use reqwest::Method;
use std::time::Duration;
use test_case::test_case;
use wiremock::matchers::{body_string, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn test_client(base_url: &str) -> HttpClient {
    let config = HttpClientConfig::builder()
        .base_url(base_url)
        .backoff(
            BackoffType::Constant,
            Duration::from_millis(10),
            Duration::from_secs(1),
        )
        .no_rate_limit()
        .build();
    HttpClient::with_config(config).unwrap()
}

fn backoff_client(backoff_type: BackoffType) -> HttpClient {
    let config = HttpClientConfig::builder()
        .backoff(
            backoff_type,
            Duration::from_millis(100),
            Duration::from_millis(500),
        )
        .no_rate_limit()
        .build();
    HttpClient::with_config(config).unwrap()
}

// ============================================================================
// Configuration
// ============================================================================

#[test]
fn test_http_client_config_default() {
    let config = HttpClientConfig::default();
    assert_eq!(config.timeout, Duration::from_secs(30));
    assert_eq!(config.max_retries, 3);
    assert!(config.base_url.is_none());
    assert!(config.rate_limit.is_some());
    assert_eq!(config.user_agent, format!("elastibee/{}", crate::VERSION));
}

#[test]
fn test_http_client_config_builder() {
    let config = HttpClientConfig::builder()
        .base_url("https://api.ecobee.com")
        .timeout(Duration::from_secs(90))
        .max_retries(5)
        .header("Content-Type", "application/json;charset=UTF-8")
        .rate_limit(RateLimiterConfig::new(2, 1))
        .build();

    assert_eq!(config.base_url.as_deref(), Some("https://api.ecobee.com"));
    assert_eq!(config.timeout, Duration::from_secs(90));
    assert_eq!(config.max_retries, 5);
    assert_eq!(
        config.default_headers.get("Content-Type").map(String::as_str),
        Some("application/json;charset=UTF-8")
    );
    assert_eq!(config.rate_limit.map(|r| r.burst_size), Some(1));
}

#[test]
fn test_request_config_builder() {
    let config = RequestConfig::new()
        .query("format", "json")
        .query("body", "{}")
        .bearer("access-1")
        .raw("{}", "application/json")
        .timeout(Duration::from_secs(10))
        .retries(2)
        .passthrough_status();

    assert_eq!(
        config.query,
        vec![
            ("format".to_string(), "json".to_string()),
            ("body".to_string(), "{}".to_string())
        ]
    );
    assert_eq!(config.bearer.as_deref(), Some("access-1"));
    assert_eq!(
        config.body.map(|b| b.content_type),
        Some("application/json".to_string())
    );
    assert_eq!(config.timeout, Some(Duration::from_secs(10)));
    assert_eq!(config.max_retries, Some(2));
    assert!(config.passthrough_status);
}

#[test]
fn test_http_client_default_has_rate_limiter() {
    let client = HttpClient::new().unwrap();
    assert!(client.has_rate_limiter());
    assert!(format!("{client:?}").contains("has_rate_limiter: true"));
}

// ============================================================================
// Requests
// ============================================================================

#[tokio::test]
async fn test_query_params_and_bearer() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/1/runtimeReport"))
        .and(query_param("format", "json"))
        .and(header("Authorization", "Bearer access-1"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = test_client(&mock_server.uri());
    let response = client
        .get_with_config(
            "/1/runtimeReport",
            RequestConfig::new().query("format", "json").bearer("access-1"),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), 200);
}

#[tokio::test]
async fn test_raw_body_and_default_headers() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/eco/_bulk"))
        .and(header("Content-Type", "application/x-ndjson"))
        .and(header("X-Opaque-Id", "elastibee"))
        .and(body_string("{\"index\":{}}\n{}\n"))
        .respond_with(ResponseTemplate::new(200).set_body_string("{\"took\":1}"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let config = HttpClientConfig::builder()
        .base_url(format!("{}/", mock_server.uri()))
        .header("X-Opaque-Id", "elastibee")
        .no_rate_limit()
        .build();
    let client = HttpClient::with_config(config).unwrap();

    let body = client
        .request_bytes(
            Method::POST,
            "/eco/_bulk",
            RequestConfig::new().raw("{\"index\":{}}\n{}\n", "application/x-ndjson"),
        )
        .await
        .unwrap();

    assert_eq!(body.as_ref(), b"{\"took\":1}");
}

#[tokio::test]
async fn test_absolute_url_ignores_base() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/eco"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&mock_server)
        .await;

    let client = test_client("http://unused.invalid");
    let response = client
        .get_with_config(&format!("{}/eco", mock_server.uri()), RequestConfig::new())
        .await
        .unwrap();
    assert_eq!(response.status(), 200);
}

// ============================================================================
// Status handling and retries
// ============================================================================

#[tokio::test]
async fn test_client_error_is_not_retried() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/eco/_bulk"))
        .respond_with(ResponseTemplate::new(413).set_body_string("too large"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = test_client(&mock_server.uri());
    let err = client
        .request(Method::POST, "/eco/_bulk", RequestConfig::new())
        .await
        .unwrap_err();

    match err {
        Error::HttpStatus { status, body } => {
            assert_eq!(status, 413);
            assert_eq!(body, "too large");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn test_passthrough_returns_error_status() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/1/thermostat"))
        .respond_with(ResponseTemplate::new(500).set_body_json(serde_json::json!({
            "status": {"code": 14, "message": "Authentication token has expired."}
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = test_client(&mock_server.uri());
    let response = client
        .get_with_config("/1/thermostat", RequestConfig::new().passthrough_status())
        .await
        .unwrap();

    assert_eq!(response.status(), 500);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["status"]["code"], 14);
}

#[tokio::test]
async fn test_retry_on_503() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/eco"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(2)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/eco"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&mock_server)
        .await;

    let client = test_client(&mock_server.uri());
    let response = client
        .get_with_config("/eco", RequestConfig::new())
        .await
        .unwrap();

    assert_eq!(response.status(), 200);
    assert_eq!(mock_server.received_requests().await.unwrap().len(), 3);
}

#[tokio::test]
async fn test_rate_limited_waits_for_retry_after() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/eco"))
        .respond_with(ResponseTemplate::new(429).insert_header("retry-after", "1"))
        .up_to_n_times(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/eco"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&mock_server)
        .await;

    let client = test_client(&mock_server.uri());
    let started = std::time::Instant::now();
    let response = client
        .get_with_config("/eco", RequestConfig::new())
        .await
        .unwrap();

    assert_eq!(response.status(), 200);
    assert!(started.elapsed() >= Duration::from_secs(1));
}

#[tokio::test]
async fn test_rate_limited_without_retries() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/eco"))
        .respond_with(ResponseTemplate::new(429).insert_header("retry-after", "7"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = test_client(&mock_server.uri());
    let err = client
        .get_with_config("/eco", RequestConfig::new().retries(0))
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        Error::RateLimited {
            retry_after_seconds: 7
        }
    ));
}

#[tokio::test]
async fn test_last_error_after_retries_exhausted() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/eco"))
        .respond_with(ResponseTemplate::new(502).set_body_string("bad gateway"))
        .expect(3)
        .mount(&mock_server)
        .await;

    let client = test_client(&mock_server.uri());
    let err = client
        .get_with_config("/eco", RequestConfig::new().retries(2))
        .await
        .unwrap_err();

    assert!(matches!(err, Error::HttpStatus { status: 502, .. }));
}

#[tokio::test]
async fn test_connection_refused_is_http_error() {
    let client = test_client("http://127.0.0.1:1");
    let err = client
        .get_with_config("/eco", RequestConfig::new().retries(1))
        .await
        .unwrap_err();

    assert!(matches!(err, Error::Http(_)));
}

// ============================================================================
// Backoff
// ============================================================================

#[test_case(BackoffType::Constant, 0, 100 ; "constant first")]
#[test_case(BackoffType::Constant, 5, 100 ; "constant later")]
#[test_case(BackoffType::Linear, 0, 100 ; "linear first")]
#[test_case(BackoffType::Linear, 2, 300 ; "linear third")]
#[test_case(BackoffType::Linear, 9, 500 ; "linear capped")]
#[test_case(BackoffType::Exponential, 1, 200 ; "exponential second")]
#[test_case(BackoffType::Exponential, 2, 400 ; "exponential third")]
#[test_case(BackoffType::Exponential, 40, 500 ; "exponential capped")]
fn test_calculate_backoff(backoff_type: BackoffType, attempt: u32, expected_ms: u64) {
    let client = backoff_client(backoff_type);
    assert_eq!(
        client.calculate_backoff(attempt),
        Duration::from_millis(expected_ms)
    );
}
