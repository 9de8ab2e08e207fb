//! HTTP API handlers.

use std::sync::Arc;

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use chrono::Utc;
use metrics_exporter_prometheus::PrometheusHandle;
use serde::Serialize;
use tracing::error;

use crate::tips::TipService;

/// Application state shared with handlers.
#[derive(Clone)]
pub struct AppState {
    /// Tip pipeline, immutable after start-up.
    pub service: Arc<TipService>,
    /// Prometheus handle, when a recorder is installed.
    pub metrics: Option<PrometheusHandle>,
}

impl AppState {
    /// Create new app state without a metrics recorder.
    pub fn new(service: Arc<TipService>) -> Self {
        Self {
            service,
            metrics: None,
        }
    }

    /// Attach a Prometheus handle for `/metrics`.
    pub fn with_metrics(mut self, handle: PrometheusHandle) -> Self {
        self.metrics = Some(handle);
        self
    }
}

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Status: "ok".
    pub status: &'static str,
}

/// Error body returned when the tips cannot be produced.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Human-readable failure reason.
    pub error: String,
}

/// Health check handler - always returns 200.
pub async fn health() -> impl IntoResponse {
    Json(HealthResponse { status: "ok" })
}

/// Tips handler - runs the pipeline and returns the buckets, or 500 when the
/// odds feed fails.
pub async fn tips(State(state): State<AppState>) -> impl IntoResponse {
    match state.service.run(Utc::now()).await {
        Ok(categorized) => (StatusCode::OK, Json(categorized)).into_response(),
        Err(e) => {
            error!(error = %e, "Failed to build tips");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse { error: e.to_string() }),
            )
                .into_response()
        }
    }
}

/// Prometheus text exposition.
pub async fn metrics(State(state): State<AppState>) -> impl IntoResponse {
    match &state.metrics {
        Some(handle) => (StatusCode::OK, handle.render()),
        None => (
            StatusCode::NOT_FOUND,
            "metrics recorder not installed".to_string(),
        ),
    }
}
