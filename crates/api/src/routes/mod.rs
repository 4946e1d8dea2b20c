pub mod generation;
pub mod health;
pub mod story;

use axum::routing::get;
use axum::Router;

use crate::state::AppState;

/// Build the `/api` route tree.
///
/// ```text
/// /                          greeting (GET)
/// /generations               start an image generation (POST)
/// /generations/{id}          generation status (GET)
/// /story                     generate a story (POST)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(greeting))
        .merge(generation::router())
        .merge(story::router())
}

/// GET /api
async fn greeting() -> &'static str {
    "Hello from the Prompt Studio proxy!"
}
