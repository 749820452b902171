//! Shared-secret extractor for the admin endpoints.
//!
//! The credential is read from the `x-admin-secret` header, falling back to
//! the `secret` query parameter. Use [`RequireAdminSecret`] as the first
//! extractor of any admin handler so the check runs before the body is read.

use axum::extract::{FromRequestParts, Query};
use axum::http::request::Parts;
use sketchy_core::admin::verify_shared_secret;

use crate::error::AppError;
use crate::query::AdminSecretParams;
use crate::state::AppState;

/// Header carrying the admin credential.
pub const ADMIN_SECRET_HEADER: &str = "x-admin-secret";

/// Marker proving the request presented the admin secret.
///
/// Rejects with 401 on a missing or wrong credential and with 500 when the
/// server has no secret configured.
///
/// ```ignore
/// async fn admin_only(_admin: RequireAdminSecret) -> AppResult<Json<()>> {
///     Ok(Json(()))
/// }
/// ```
pub struct RequireAdminSecret;

/// Credential presented by the client, header first.
fn presented_secret(parts: &Parts) -> Option<String> {
    let from_header = parts
        .headers
        .get(ADMIN_SECRET_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);

    from_header.or_else(|| {
        Query::<AdminSecretParams>::try_from_uri(&parts.uri)
            .ok()
            .and_then(|Query(params)| params.secret)
    })
}

impl FromRequestParts<AppState> for RequireAdminSecret {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let presented = presented_secret(parts);
        if let Err(e) = verify_shared_secret(
            state.config.admin_secret.as_deref(),
            presented.as_deref(),
        ) {
            tracing::warn!(path = %parts.uri.path(), error = %e, "Admin request rejected");
            return Err(e.into());
        }
        Ok(RequireAdminSecret)
    }
}
