//! Route definitions for image generation.
//!
//! ```text
//! POST   /generations            create_generation
//! GET    /generations/{id}       get_generation
//! ```

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::generation;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/generations", post(generation::create_generation))
        .route("/generations/{id}", get(generation::get_generation))
}
