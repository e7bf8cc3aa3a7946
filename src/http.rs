use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::{ConnectInfo, Query, Request, State};
use axum::http::{header, HeaderName, Method, StatusCode};
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde::Deserialize;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::assistant::Assistant;
use crate::error::Error;
use crate::rate_limit::RateLimiter;

pub const API_KEY_HEADER: &str = "x-api-key";

/// Shared state for every request
#[derive(Clone)]
pub struct AppState {
    pub assistant: Arc<Assistant>,
    pub limiter: Arc<RateLimiter>,
    pub api_key: Arc<str>,
}

impl AppState {
    pub fn new(assistant: Assistant, limiter: RateLimiter, api_key: impl Into<Arc<str>>) -> Self {
        Self {
            assistant: Arc::new(assistant),
            limiter: Arc::new(limiter),
            api_key: api_key.into(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct WeatherQuery {
    #[serde(default)]
    q: Option<String>,
}

/// Error wrapper that renders as `status` + plain-text message
pub struct ApiError(Error);

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status =
            StatusCode::from_u16(self.0.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        if status.is_server_error() {
            tracing::error!("Request failed: {}", self.0);
        }
        (status, self.0.to_string()).into_response()
    }
}

/// Build the application router
pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, HeaderName::from_static(API_KEY_HEADER)]);

    let api = Router::new()
        .route("/weather", get(get_weather))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_api_key))
        .route_layer(middleware::from_fn_with_state(state.clone(), rate_limit))
        .with_state(state);

    Router::new()
        .route("/health", get(health))
        .nest("/api", api)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

/// Bind and serve until the process exits
pub async fn serve(state: AppState, port: u16) -> anyhow::Result<()> {
    let app = router(state);

    let addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Web server running at http://localhost:{}", port);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;
    Ok(())
}

async fn health() -> &'static str {
    "ok"
}

async fn get_weather(
    State(state): State<AppState>,
    Query(params): Query<WeatherQuery>,
) -> Result<Response, ApiError> {
    let query = params.q.unwrap_or_default();
    let query = query.trim();
    if query.is_empty() {
        return Ok((StatusCode::BAD_REQUEST, "missing query parameter 'q'").into_response());
    }

    let report = state.assistant.ask(query).await?;
    Ok(Json(report).into_response())
}

/// Client key for rate limiting: the peer IP, port ignored
fn client_key(req: &Request) -> String {
    req.extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip().to_string())
        .unwrap_or_else(|| "unknown".to_string())
}

async fn rate_limit(State(state): State<AppState>, req: Request, next: Next) -> Response {
    let key = client_key(&req);
    if !state.limiter.allow(&key) {
        tracing::warn!("Rate limit exceeded for {}", key);
        return ApiError(Error::RateLimitExceeded).into_response();
    }
    next.run(req).await
}

async fn require_api_key(State(state): State<AppState>, req: Request, next: Next) -> Response {
    let provided = req
        .headers()
        .get(API_KEY_HEADER)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default();

    if state.api_key.is_empty() || provided != &*state.api_key {
        return ApiError(Error::Unauthorized).into_response();
    }
    next.run(req).await
}
