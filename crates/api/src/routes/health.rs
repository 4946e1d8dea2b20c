use axum::extract::State;
use axum::{routing::get, Json, Router};
use serde::Serialize;

use crate::state::AppState;

/// Health check response payload.
#[derive(Serialize)]
pub struct HealthResponse {
    /// Overall service status.
    pub status: &'static str,
    /// Crate version from Cargo.toml.
    pub version: &'static str,
    /// Whether `LEONARDO_API_KEY` is set.
    pub image_provider_configured: bool,
    /// Whether `OPENAI_API_KEY` is set.
    pub story_provider_configured: bool,
}

/// GET /health -- returns service status and which providers have keys.
async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        image_provider_configured: state.leonardo.is_configured(),
        story_provider_configured: state.openai.is_configured(),
    })
}

/// Mount health check routes (intended for root-level, NOT under `/api`).
pub fn router() -> Router<AppState> {
    Router::new().route("/health", get(health_check))
}
