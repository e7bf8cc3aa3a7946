//! Router-level tests for the HTTP surface, driven with `tower::ServiceExt::oneshot`.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::body::Body;
use axum::extract::ConnectInfo;
use axum::http::{Request, StatusCode};
use axum::Router;
use reqwest::Client;
use serde_json::json;
use tower::ServiceExt;
use weather_assistant::http::{router, AppState};
use weather_assistant::retry::RetryPolicy;
use weather_assistant::{Assistant, Observation, OllamaClient, RateLimiter, WeatherSource};
use wiremock::matchers::{body_string_contains, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const KEY: &str = "test-secret";

/// Weather source that never touches the network
struct FixedWeather;

#[async_trait]
impl WeatherSource for FixedWeather {
    async fn fetch(&self, _location: &str) -> weather_assistant::Result<Observation> {
        Ok(Observation {
            temperature: 78.8,
            conditions: "Sunny".to_string(),
            humidity: 55,
            timestamp: "2024-05-01T12:53:00+00:00".to_string(),
            ..Default::default()
        })
    }
}

fn app(ollama_base: &str) -> Router {
    app_with_key(ollama_base, KEY)
}

fn app_with_key(ollama_base: &str, api_key: &str) -> Router {
    let ai = OllamaClient::new(
        Client::new(),
        ollama_base,
        "phi4",
        RetryPolicy::new(0).with_base_delay(Duration::from_millis(1)),
    );
    let assistant = Assistant::new(ai, Arc::new(FixedWeather));
    router(AppState::new(assistant, RateLimiter::new(0.001), api_key))
}

fn request(uri: &str, key: Option<&str>, peer: &str) -> Request<Body> {
    let addr: SocketAddr = peer.parse().unwrap();
    let mut builder = Request::builder().uri(uri).extension(ConnectInfo(addr));
    if let Some(key) = key {
        builder = builder.header("X-API-Key", key);
    }
    builder.body(Body::empty()).unwrap()
}

async fn body_text(response: axum::response::Response) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

#[tokio::test]
async fn test_health_needs_no_key() {
    let response = app("http://127.0.0.1:9")
        .oneshot(request("/health", None, "10.0.0.1:5000"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_text(response).await, "ok");
}

#[tokio::test]
async fn test_wrong_key_is_unauthorized() {
    let response = app("http://127.0.0.1:9")
        .oneshot(request("/api/weather?q=Miami", Some("nope"), "10.0.0.1:5000"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(body_text(response).await, "unauthorized");
}

#[tokio::test]
async fn test_missing_key_is_unauthorized() {
    let response = app("http://127.0.0.1:9")
        .oneshot(request("/api/weather?q=Miami", None, "10.0.0.1:5000"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_empty_server_key_rejects_requests_without_header() {
    let app = app_with_key("http://127.0.0.1:9", "");

    let response = app
        .clone()
        .oneshot(request("/api/weather?q=Miami", None, "10.0.0.8:5000"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = app
        .oneshot(request("/api/weather?q=Miami", Some(""), "10.0.0.8:5001"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_fourth_request_from_same_ip_is_rate_limited() {
    let app = app("http://127.0.0.1:9");

    // Different source ports, same client IP
    for port in 5000..5003 {
        let peer = format!("10.0.0.2:{port}");
        let response = app
            .clone()
            .oneshot(request("/api/weather?q=Miami", Some("nope"), &peer))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    let response = app
        .clone()
        .oneshot(request("/api/weather?q=Miami", Some(KEY), "10.0.0.2:6000"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(body_text(response).await, "rate limit exceeded");

    let response = app
        .oneshot(request("/api/weather?q=Miami", Some("nope"), "10.0.0.3:5000"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_blank_query_is_bad_request() {
    let response = app("http://127.0.0.1:9")
        .oneshot(request("/api/weather?q=%20%20", Some(KEY), "10.0.0.4:5000"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_successful_query_returns_report_json() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat"))
        .and(body_string_contains("location extractor"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "message": { "role": "assistant", "content": "Miami, FL" },
            "done": true
        })))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/chat"))
        .and(body_string_contains("weather assistant"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "message": { "role": "assistant", "content": "Sunny and pleasant at 79°F." },
            "done": true
        })))
        .mount(&server)
        .await;

    let response = app(&server.uri())
        .oneshot(request(
            "/api/weather?q=What%27s%20the%20weather%20in%20Miami%3F",
            Some(KEY),
            "10.0.0.5:5000",
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body: serde_json::Value = serde_json::from_str(&body_text(response).await).unwrap();
    assert_eq!(body["weather"]["conditions"], "Sunny");
    assert_eq!(body["weather"]["humidity"], 55);
    assert_eq!(body["description"], "Sunny and pleasant at 79°F.");
}

#[tokio::test]
async fn test_no_location_maps_to_unprocessable() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "message": { "role": "assistant", "content": "no location" },
            "done": true
        })))
        .mount(&server)
        .await;

    let response = app(&server.uri())
        .oneshot(request("/api/weather?q=hello", Some(KEY), "10.0.0.6:5000"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body_text(response).await, "no location found in query");
}

#[tokio::test]
async fn test_dead_ai_backend_maps_to_service_unavailable() {
    let port = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().port()
    };
    let response = app(&format!("http://127.0.0.1:{port}/api"))
        .oneshot(request("/api/weather?q=Miami", Some(KEY), "10.0.0.7:5000"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
}
