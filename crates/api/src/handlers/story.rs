//! Handler for `POST /api/story`: one chat completion per request.

use axum::extract::State;
use axum::Json;
use studio_core::story::{StoryRequest, StoryResponse};

use crate::error::{AppError, AppResult};
use crate::state::AppState;

pub const STORY_FAILED: &str = "Failed to generate story";

/// POST /api/story
pub async fn create_story(
    State(state): State<AppState>,
    Json(request): Json<StoryRequest>,
) -> AppResult<Json<StoryResponse>> {
    state
        .openai
        .ensure_configured()
        .map_err(AppError::provider(STORY_FAILED))?;
    request.validate()?;

    tracing::info!(
        model = %request.model,
        hero = ?request.hero,
        channel = ?request.channel,
        has_product_image = request.product_image.is_some(),
        "Generating story",
    );

    let story = state
        .openai
        .generate_story(&request)
        .await
        .map_err(AppError::provider(STORY_FAILED))?;

    Ok(Json(StoryResponse { story }))
}
