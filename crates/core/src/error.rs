#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// A required server-side setting is absent. Distinct from
    /// [`CoreError::Unauthorized`], which blames the client.
    #[error("Server misconfigured: {0}")]
    Misconfigured(String),

    #[error("Image processing failed: {0}")]
    Image(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<image::ImageError> for CoreError {
    fn from(err: image::ImageError) -> Self {
        CoreError::Image(err.to_string())
    }
}
