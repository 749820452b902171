use axum::extract::State;
use axum::{routing::get, Json, Router};
use serde::Serialize;

use crate::state::AppState;

/// Health check response payload.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    /// Overall service status.
    pub status: &'static str,
    pub message: &'static str,
    /// Crate version from Cargo.toml.
    pub version: &'static str,
    /// `live` when images come from the generation API, else `mock`.
    pub mode: &'static str,
    pub artifact_store: &'static str,
    pub metadata_index: &'static str,
}

/// GET /health -- reports the service and the selected backends.
async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let mode = if state.config.use_openai_api {
        "live"
    } else {
        "mock"
    };

    Json(HealthResponse {
        status: "OK",
        message: "Server is running",
        version: env!("CARGO_PKG_VERSION"),
        mode,
        artifact_store: state.artifacts.backend_name(),
        metadata_index: state.metadata.backend_name(),
    })
}

pub fn router() -> Router<AppState> {
    Router::new().route("/health", get(health_check))
}
