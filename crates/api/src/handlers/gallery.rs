use axum::extract::{Query, State};
use axum::Json;
use serde::Serialize;
use sketchy_core::generation::GalleryItem;

use crate::error::AppResult;
use crate::query::GalleryParams;
use crate::state::AppState;

/// Response body for `GET /gallery`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GalleryResponse {
    pub gallery_items: Vec<GalleryItem>,
    /// Generations stored in total.
    pub total_items: usize,
    pub returned_items: usize,
}

/// GET /gallery?limit=N
pub async fn list_gallery(
    State(state): State<AppState>,
    Query(params): Query<GalleryParams>,
) -> AppResult<Json<GalleryResponse>> {
    let page = state.gallery.view(params.limit).await?;

    Ok(Json(GalleryResponse {
        returned_items: page.items.len(),
        total_items: page.total,
        gallery_items: page.items,
    }))
}
