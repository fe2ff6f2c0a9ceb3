use axum::{Json, extract::State};
use std::sync::Arc;

use super::{AppState, HealthResponse};

/// `GET /healthz`
pub async fn get_health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        uptime_seconds: state.start_time.elapsed().as_secs(),
        demo_mode: state.generator.is_demo(),
        niches: state.catalog.niches.len(),
    })
}
