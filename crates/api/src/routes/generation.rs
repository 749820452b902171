//! Route definitions for image generation.

use axum::routing::post;
use axum::Router;

use crate::handlers::generation;
use crate::state::AppState;

/// ```text
/// POST /generate-image -> generate_image
/// ```
pub fn router() -> Router<AppState> {
    Router::new().route("/generate-image", post(generation::generate_image))
}
