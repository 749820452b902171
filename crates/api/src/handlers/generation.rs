//! Handler for the generation endpoint.

use axum::extract::State;
use axum::Json;
use serde::Deserialize;
use sketchy_core::error::CoreError;
use sketchy_core::generation::GenerationRecord;

use crate::error::{AppError, AppResult};
use crate::extract::AppJson;
use crate::state::AppState;

/// Request body for `POST /generate-image`.
#[derive(Debug, Deserialize)]
pub struct GenerateImageRequest {
    #[serde(default)]
    pub prompt: Option<String>,
}

/// POST /generate-image
///
/// Runs the full pipeline and mirrors the stored record back.
pub async fn generate_image(
    State(state): State<AppState>,
    AppJson(input): AppJson<GenerateImageRequest>,
) -> AppResult<Json<GenerationRecord>> {
    let prompt = input
        .prompt
        .ok_or_else(|| CoreError::Validation("prompt is required".into()))?;

    let record = state
        .generation
        .generate(&prompt)
        .await
        .map_err(AppError::generation)?;

    Ok(Json(record))
}
