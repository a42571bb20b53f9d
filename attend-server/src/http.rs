//! Attend HTTP API
//!
//! Axum-based HTTP server that exposes sentence translation over HTTP.
//! Runs alongside the Unix socket IPC server on port 5001 (configurable).
//!
//! Each endpoint has a thin axum handler that delegates to a pure inner
//! function, so the inner functions can be tested without axum dispatch.
//!
//! Endpoints:
//! - POST /translate - sentence → SQL + structured query
//! - GET  /health    - extractor status
//! - GET  /version   - server version info

use std::sync::Arc;

use anyhow::Result;
use attend_core::AttendConfig;
use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::router::TranslationService;

/// Shared state for all HTTP handlers
#[derive(Clone)]
pub struct HttpState {
    pub service: Arc<TranslationService>,
}

/// Build the Axum router with all endpoints
pub fn build_router(state: Arc<HttpState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/translate", post(translate_handler))
        .route("/health", get(health_handler))
        .route("/version", get(version_handler))
        .layer(CatchPanicLayer::custom(panic_response))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Start the HTTP server on the configured address.
/// Gracefully shuts down when the broadcast shutdown signal fires.
pub async fn start_http_server(
    service: Arc<TranslationService>,
    config: AttendConfig,
    mut shutdown: broadcast::Receiver<()>,
) -> Result<()> {
    let addr = format!("{}:{}", config.http.host, config.http.port);
    let state = Arc::new(HttpState { service });

    let app = build_router(state);
    let listener = TcpListener::bind(&addr).await?;
    tracing::info!("Attend HTTP API listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            let _ = shutdown.recv().await;
            tracing::info!("HTTP server shutting down...");
        })
        .await?;

    Ok(())
}

// ============================================================================
// Request / Response DTOs
// ============================================================================

#[derive(Debug, Deserialize, Default)]
pub struct TranslateRequest {
    #[serde(default)]
    pub query: Option<String>,
}

/// Standard HTTP error response
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub status: String,
}

impl ErrorResponse {
    pub fn new(msg: impl Into<String>) -> Self {
        Self {
            error: msg.into(),
            status: "error".to_string(),
        }
    }
}

// ============================================================================
// Inner (directly testable) functions
// ============================================================================

/// Inner translate - missing `query` is an empty sentence, not an error.
pub fn translate_inner(
    service: &TranslationService,
    req: TranslateRequest,
) -> (StatusCode, serde_json::Value) {
    let sentence = req.query.unwrap_or_default();

    match service.translate(&sentence) {
        Ok(body) => (StatusCode::OK, body),
        Err(e) => (StatusCode::BAD_REQUEST, error_body(e.to_string())),
    }
}

/// Inner health - 503 while the extractor is unavailable.
pub fn health_inner(service: &TranslationService) -> (StatusCode, serde_json::Value) {
    let status = if service.translator().is_available() {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    (status, service.health())
}

/// Inner version - returns version info (pure, no IO).
pub fn version_inner() -> serde_json::Value {
    serde_json::json!({
        "version": env!("CARGO_PKG_VERSION"),
        "protocol": "attend/1",
    })
}

// ============================================================================
// Axum handler wrappers (thin - delegate to inner functions)
// ============================================================================

pub async fn translate_handler(
    State(state): State<Arc<HttpState>>,
    payload: std::result::Result<Json<TranslateRequest>, JsonRejection>,
) -> impl IntoResponse {
    let req = match payload {
        Ok(Json(req)) => req,
        Err(rejection) => {
            tracing::warn!(error = %rejection.body_text(), "Rejected translate body");
            return (StatusCode::BAD_REQUEST, Json(error_body(rejection.body_text())));
        }
    };

    let (status, body) = translate_inner(&state.service, req);
    (status, Json(body))
}

pub async fn health_handler(State(state): State<Arc<HttpState>>) -> impl IntoResponse {
    let (status, body) = health_inner(&state.service);
    (status, Json(body))
}

pub async fn version_handler() -> impl IntoResponse {
    (StatusCode::OK, Json(version_inner()))
}

// ============================================================================
// Helpers
// ============================================================================

fn error_body(msg: impl Into<String>) -> serde_json::Value {
    serde_json::to_value(ErrorResponse::new(msg)).unwrap_or_else(|_| serde_json::json!({}))
}

fn panic_response(err: Box<dyn std::any::Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = err.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "unknown panic".to_string()
    };
    tracing::error!(panic = %detail, "Handler panicked");

    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(error_body(format!("Internal error: {}", detail))),
    )
        .into_response()
}

// ============================================================================
// Unit Tests - call inner functions directly
// ============================================================================
