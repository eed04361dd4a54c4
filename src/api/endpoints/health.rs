//! Health check endpoint.

use axum::extract::State;
use axum::Json;
use serde::Serialize;

use crate::api::types::ApiContext;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub model: String,
    pub remote_store: bool,
    pub uptime_secs: u64,
}

/// `GET /api/health`: liveness check for the front-end.
pub async fn check(State(ctx): State<ApiContext>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: crate::config::APP_VERSION,
        model: ctx.core.analyzer.model_name().to_string(),
        remote_store: ctx.core.history.has_remote(),
        uptime_secs: ctx.core.uptime_secs(),
    })
}
