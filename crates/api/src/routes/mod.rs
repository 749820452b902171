pub mod admin;
pub mod gallery;
pub mod generation;
pub mod health;

use axum::Router;

use crate::state::AppState;

/// Build the application route tree.
///
/// Mounted twice by the router, at the root and under `/api`:
///
/// ```text
/// GET    /health              health check
/// POST   /generate-image      generate, store, return record
/// GET    /gallery             newest-first gallery (?limit=N)
/// DELETE /clear-gallery       delete everything (admin)
/// DELETE /remove-image        delete one generation (admin)
/// POST   /reduce-gallery      keep the newest N (admin)
/// ```
pub fn app_routes() -> Router<AppState> {
    Router::new()
        .merge(health::router())
        .merge(generation::router())
        .merge(gallery::router())
        .merge(admin::router())
}
