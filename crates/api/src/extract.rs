//! Request body extractors.

use axum::extract::FromRequest;

use crate::error::AppError;

/// JSON body whose rejection is an [`AppError`].
///
/// Malformed JSON, a missing `content-type` or a field of the wrong type
/// answer 400 `VALIDATION_ERROR` with the usual error body instead of
/// axum's plain-text 415/422.
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct AppJson<T>(pub T);
