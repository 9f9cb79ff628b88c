use axum::{
    extract::State,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use http::{HeaderMap, StatusCode};
use std::sync::Arc;
use std::time::Instant;
use tower_http::trace::TraceLayer;
use uuid::Uuid;

use crate::config::ProxyConfig;
use crate::metrics::Metrics;
use crate::models::{ApiEnvelope, ProxyRequest};
use crate::proxy;
use crate::util::cors_layer_from_env;

/// Header carrying the client credential.
pub const CLIENT_KEY_HEADER: &str = "x-api-key";

/// Shared application state: immutable configuration, the pooled upstream
/// client, and the metrics recorder.
pub struct AppState {
    pub config: ProxyConfig,
    pub http: reqwest::Client,
    pub metrics: Metrics,
}

impl AppState {
    pub fn new(config: ProxyConfig, http: reqwest::Client) -> Self {
        Self {
            config,
            http,
            metrics: Metrics::new(),
        }
    }
}

/// Build the axum router with `/gemini-proxy`, `/health` and `/metrics`.
pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/gemini-proxy", post(gemini_proxy))
        .route("/health", get(health))
        .route("/metrics", get(metrics))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer_from_env())
}

/// Liveness probe.
async fn health() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "healthy",
        "service": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

/// Prometheus text exposition of the request counters and latency histogram.
async fn metrics(State(state): State<Arc<AppState>>) -> Response {
    match state.metrics.render() {
        Ok(text) => (
            StatusCode::OK,
            [(http::header::CONTENT_TYPE, "text/plain; version=0.0.4")],
            text,
        )
            .into_response(),
        Err(e) => {
            tracing::error!(error = %e, "metrics exposition failed");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

/// Forwarding endpoint. Extracts the client credential, runs the proxy
/// pipeline, records one outcome observation, and renders the envelope.
///
/// A missing or non-JSON body is treated as an empty request so it fails
/// prompt validation with the normalized envelope instead of an axum
/// rejection.
async fn gemini_proxy(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Option<Json<ProxyRequest>>,
) -> Response {
    let started = Instant::now();
    let request_id = Uuid::new_v4();

    let credential = headers
        .get(CLIENT_KEY_HEADER)
        .and_then(|v| v.to_str().ok());
    let request = body.map(|Json(r)| r).unwrap_or_default();

    let result = proxy::handle(&state.config, &state.http, &request, credential).await;
    let elapsed = started.elapsed();

    match result {
        Ok(success) => {
            state.metrics.record("gemini-proxy", "success", elapsed);
            tracing::info!(
                request_id = %request_id,
                model = %success.model,
                elapsed_ms = success.elapsed_ms,
                "request completed"
            );
            (StatusCode::OK, Json(ApiEnvelope::from(success))).into_response()
        }
        Err(err) => {
            // Auth rejections are counted against the auth gate, everything
            // else against the proxy endpoint.
            let endpoint = if err.code() == "UNAUTHORIZED" {
                "auth"
            } else {
                "gemini-proxy"
            };
            state.metrics.record(endpoint, "error", elapsed);
            tracing::warn!(
                request_id = %request_id,
                code = err.code(),
                error = %err,
                elapsed_ms = elapsed.as_millis() as u64,
                "request failed"
            );
            err.into_response()
        }
    }
}
