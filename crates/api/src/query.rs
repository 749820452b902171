//! Shared query parameter types for API handlers.

use serde::Deserialize;

/// Gallery page size (`?limit=`). Clamped to the configured cap by the
/// gallery service.
#[derive(Debug, Deserialize)]
pub struct GalleryParams {
    pub limit: Option<usize>,
}

/// Admin credential passed as `?secret=` instead of the header.
#[derive(Debug, Deserialize)]
pub struct AdminSecretParams {
    pub secret: Option<String>,
}
