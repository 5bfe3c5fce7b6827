//! HTTP request handlers.

use std::sync::Arc;

use axum::{
    extract::{Extension, Json, State},
    http::{header, HeaderMap, HeaderValue, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Router,
};
use bytes::Bytes;
use serde::Serialize;
use tower_http::trace::TraceLayer;

use super::state::AppState;
use crate::middleware::{with_request_decompression, DecodedBody, StatsSummary};

/// Length of the body the echo handler received
pub const X_BODY_LENGTH: &str = "x-body-length";

/// `Content-Length` the echo handler saw on the request
pub const X_REQUEST_CONTENT_LENGTH: &str = "x-request-content-length";

/// Token of the encoding the middleware removed, if any
pub const X_DECODED_FROM: &str = "x-decoded-from";

/// Create the API router
///
/// Only `/echo` sits behind the decompression middleware.
pub fn create_router(state: Arc<AppState>) -> Router {
    let ingest: Router<Arc<AppState>> = with_request_decompression(
        Router::new().route("/echo", post(echo)),
        Arc::clone(&state.decompressor),
    );

    let router = Router::new()
        // Health and status
        .route("/health", get(health_check))
        .route("/stats", get(stats))
        .route("/stats/reset", post(reset_stats))
        // Body-consuming routes
        .merge(ingest)
        .with_state(Arc::clone(&state));

    if state.config.logging {
        router.layer(TraceLayer::new_for_http())
    } else {
        router
    }
}

/// Health check response
#[derive(Serialize)]
pub struct HealthResponse {
    /// Always `"ok"` while the server is serving
    pub status: &'static str,
    /// Crate version
    pub version: &'static str,
}

/// Health check endpoint
pub async fn health_check() -> impl IntoResponse {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// Stats response
#[derive(Serialize)]
pub struct StatsResponse {
    /// Crate version
    pub version: &'static str,
    /// Seconds since the server started
    pub uptime_secs: u64,
    /// Tokens the decompressor accepts
    pub enabled_encodings: Vec<&'static str>,
    /// Decompression counters
    pub decompression: StatsSummary,
}

/// Decompression statistics
async fn stats(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(StatsResponse {
        version: env!("CARGO_PKG_VERSION"),
        uptime_secs: state.uptime().as_secs(),
        enabled_encodings: state.enabled_encodings(),
        decompression: state.decompressor.stats().summary(),
    })
}

/// Zero the decompression statistics
async fn reset_stats(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    state.decompressor.stats().reset();
    tracing::info!("Decompression statistics reset");
    StatusCode::NO_CONTENT
}

/// Return the (decoded) request body as the response body
async fn echo(
    headers: HeaderMap,
    decoded: Option<Extension<DecodedBody>>,
    body: Bytes,
) -> impl IntoResponse {
    let mut response_headers = HeaderMap::new();

    if let Some(content_type) = headers.get(header::CONTENT_TYPE) {
        response_headers.insert(header::CONTENT_TYPE, content_type.clone());
    }
    if let Some(content_length) = headers.get(header::CONTENT_LENGTH) {
        response_headers.insert(X_REQUEST_CONTENT_LENGTH, content_length.clone());
    }
    if let Some(Extension(info)) = decoded {
        response_headers.insert(
            X_DECODED_FROM,
            HeaderValue::from_static(info.encoding.token()),
        );
    }
    response_headers.insert(X_BODY_LENGTH, HeaderValue::from(body.len()));

    (response_headers, body)
}
