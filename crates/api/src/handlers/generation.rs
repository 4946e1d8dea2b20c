//! Handlers for the image generation proxy.
//!
//! Routes:
//! - `POST /api/generations`      -- start a generation
//! - `GET  /api/generations/{id}` -- fetch generation status
//!
//! Both return the provider's JSON unchanged on success.

use axum::extract::{Path, State};
use axum::Json;
use serde_json::{Map, Value};
use studio_core::generation::{prompt_from_body, provider_payload};

use crate::error::{AppError, AppResult};
use crate::state::AppState;

pub const START_FAILED: &str = "Failed to start image generation";
pub const STATUS_FAILED: &str = "Failed to fetch generation status";

/// POST /api/generations
///
/// Requires the provider key, then a non-empty `prompt`. Fills in the
/// default model, size and image count, keeping every other client field.
pub async fn create_generation(
    State(state): State<AppState>,
    Json(body): Json<Map<String, Value>>,
) -> AppResult<Json<Value>> {
    state
        .leonardo
        .ensure_configured()
        .map_err(AppError::provider(START_FAILED))?;
    prompt_from_body(&body)?;

    let payload = provider_payload(&body);
    tracing::info!(model_id = %payload["modelId"], "Starting image generation");

    let response = state
        .leonardo
        .create_generation(&payload)
        .await
        .map_err(AppError::provider(START_FAILED))?;

    Ok(Json(response))
}

/// GET /api/generations/{id}
pub async fn get_generation(
    State(state): State<AppState>,
    Path(generation_id): Path<String>,
) -> AppResult<Json<Value>> {
    state
        .leonardo
        .ensure_configured()
        .map_err(AppError::provider(STATUS_FAILED))?;

    let response = state
        .leonardo
        .get_generation(&generation_id)
        .await
        .map_err(AppError::provider(STATUS_FAILED))?;

    tracing::debug!(
        generation_id = %generation_id,
        status = %response["generations_by_pk"]["status"],
        "Fetched generation status",
    );
    Ok(Json(response))
}
