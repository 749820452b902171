//! Route definitions for admin maintenance.

use axum::routing::{delete, post};
use axum::Router;

use crate::handlers::admin;
use crate::state::AppState;

/// All routes require the admin secret (enforced by handler extractors).
///
/// ```text
/// DELETE /clear-gallery   -> clear_gallery
/// DELETE /remove-image    -> remove_image
/// POST   /reduce-gallery  -> reduce_gallery
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/clear-gallery", delete(admin::clear_gallery))
        .route("/remove-image", delete(admin::remove_image))
        .route("/reduce-gallery", post(admin::reduce_gallery))
}
