use axum::routing::post;
use axum::Router;

use crate::handlers::story;
use crate::state::AppState;

/// `POST /story`
pub fn router() -> Router<AppState> {
    Router::new().route("/story", post(story::create_story))
}
