//! Health check handler

use axum::{Json, extract::State};
use serde::Serialize;

use crate::instructions::CacheSnapshot;
use crate::web::AppState;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub uptime_seconds: i64,
    pub language_model_configured: bool,
    pub instructions: CacheSnapshot,
    pub stored_analyses: usize,
}

/// Liveness plus a view of the instruction cache and analysis store.
///
/// The service always answers (degraded components fall back), so status is
/// "healthy" whenever the process can respond.
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let uptime = chrono::Utc::now() - state.start_time;

    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
        uptime_seconds: uptime.num_seconds(),
        language_model_configured: !state.config.llm.api_key.trim().is_empty(),
        instructions: state.instructions.snapshot().await,
        stored_analyses: state.store.len().await,
    })
}
