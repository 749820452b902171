//! Handlers for the admin maintenance endpoints.
//!
//! Every handler takes [`RequireAdminSecret`] first, so the credential is
//! checked before the body is parsed or anything is deleted.

use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};
use sketchy_core::admin::parse_retain_count;
use sketchy_core::error::CoreError;

use crate::error::AppResult;
use crate::extract::AppJson;
use crate::middleware::admin::RequireAdminSecret;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request / response DTOs
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoveImageRequest {
    #[serde(default)]
    pub image_url: Option<String>,
}

/// `count` is kept raw so numeric strings are accepted as well.
#[derive(Debug, Deserialize)]
pub struct ReduceGalleryRequest {
    #[serde(default)]
    pub count: Option<serde_json::Value>,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct ClearGalleryResponse {
    pub message: String,
    pub deleted: usize,
}

#[derive(Debug, Serialize)]
pub struct ReduceGalleryResponse {
    pub message: String,
    pub kept: usize,
    pub deleted: usize,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// DELETE /clear-gallery
pub async fn clear_gallery(
    _admin: RequireAdminSecret,
    State(state): State<AppState>,
) -> AppResult<Json<ClearGalleryResponse>> {
    let outcome = state.maintenance.clear_all().await?;
    Ok(Json(ClearGalleryResponse {
        message: "Gallery cleared".to_string(),
        deleted: outcome.images,
    }))
}

/// DELETE /remove-image
pub async fn remove_image(
    _admin: RequireAdminSecret,
    State(state): State<AppState>,
    AppJson(input): AppJson<RemoveImageRequest>,
) -> AppResult<Json<MessageResponse>> {
    let image_url = input
        .image_url
        .filter(|u| !u.trim().is_empty())
        .ok_or_else(|| CoreError::Validation("imageUrl is required".into()))?;

    state.maintenance.remove_one(&image_url).await?;
    Ok(Json(MessageResponse {
        message: "Image removed".to_string(),
    }))
}

/// POST /reduce-gallery
pub async fn reduce_gallery(
    _admin: RequireAdminSecret,
    State(state): State<AppState>,
    AppJson(input): AppJson<ReduceGalleryRequest>,
) -> AppResult<Json<ReduceGalleryResponse>> {
    let keep = parse_retain_count(input.count.as_ref())?;

    let outcome = state.maintenance.retain_newest(keep).await?;
    Ok(Json(ReduceGalleryResponse {
        message: format!("Gallery reduced to the newest {keep} images"),
        kept: outcome.kept,
        deleted: outcome.deleted,
    }))
}
