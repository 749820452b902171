use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use sketchy_core::error::CoreError;
use sketchy_openai::OpenAiError;
use sketchy_pipeline::PipelineError;
use sketchy_storage::StorageError;

/// Application-level error type for HTTP handlers.
///
/// Wraps the domain, upstream and storage errors and adds the generation
/// failure. Implements [`IntoResponse`] to produce consistent JSON error
/// responses of the form `{ "error", "code", "details"? }`.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// A domain-level error from `sketchy_core`.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// The text or image API failed.
    #[error(transparent)]
    Upstream(#[from] OpenAiError),

    /// An artifact or metadata backend failed.
    #[error(transparent)]
    Storage(#[from] StorageError),

    /// A generation request failed after validation. Rendered with the
    /// fixed message `Failed to generate image` and the cause as details.
    #[error("Failed to generate image: {0}")]
    Generation(String),
}

/// Convenience type alias for handler return values.
pub type AppResult<T> = Result<T, AppError>;

impl From<PipelineError> for AppError {
    fn from(err: PipelineError) -> Self {
        match err {
            PipelineError::Core(e) => AppError::Core(e),
            PipelineError::Upstream(e) => AppError::Upstream(e),
            PipelineError::Storage(e) => AppError::Storage(e),
        }
    }
}

/// Malformed or wrongly-typed request bodies are validation failures.
impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::Core(CoreError::Validation(rejection.body_text()))
    }
}

impl AppError {
    /// Map a generation failure. Validation problems keep their 400;
    /// everything else becomes [`AppError::Generation`].
    pub fn generation(err: PipelineError) -> Self {
        match err {
            PipelineError::Core(CoreError::Validation(msg)) => {
                AppError::Core(CoreError::Validation(msg))
            }
            other => AppError::Generation(other.to_string()),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message, details): (StatusCode, &str, String, Option<String>) =
            match &self {
                // --- CoreError variants ---
                AppError::Core(core) => match core {
                    CoreError::Validation(msg) => {
                        (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone(), None)
                    }
                    CoreError::Unauthorized(msg) => {
                        (StatusCode::UNAUTHORIZED, "UNAUTHORIZED", msg.clone(), None)
                    }
                    CoreError::Misconfigured(msg) => {
                        tracing::error!(error = %msg, "Server misconfigured");
                        (
                            StatusCode::INTERNAL_SERVER_ERROR,
                            "MISCONFIGURED",
                            msg.clone(),
                            None,
                        )
                    }
                    CoreError::Image(msg) => {
                        tracing::error!(error = %msg, "Image processing failed");
                        (
                            StatusCode::INTERNAL_SERVER_ERROR,
                            "IMAGE_ERROR",
                            "Image processing failed".to_string(),
                            Some(msg.clone()),
                        )
                    }
                    CoreError::Internal(msg) => {
                        tracing::error!(error = %msg, "Internal core error");
                        (
                            StatusCode::INTERNAL_SERVER_ERROR,
                            "INTERNAL_ERROR",
                            "An internal error occurred".to_string(),
                            None,
                        )
                    }
                },

                // --- Upstream ---
                AppError::Upstream(err) => {
                    tracing::error!(error = %err, "Upstream API error");
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "UPSTREAM_ERROR",
                        "Upstream API request failed".to_string(),
                        Some(err.to_string()),
                    )
                }

                // --- Storage ---
                AppError::Storage(err) => classify_storage_error(err),

                // --- Generation ---
                AppError::Generation(details) => {
                    tracing::error!(error = %details, "Generation failed");
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "GENERATION_FAILED",
                        "Failed to generate image".to_string(),
                        Some(details.clone()),
                    )
                }
            };

        let mut body = json!({
            "error": message,
            "code": code,
        });
        if let Some(details) = details {
            body["details"] = json!(details);
        }

        (status, axum::Json(body)).into_response()
    }
}

/// Classify a storage error into an HTTP status, error code, message and
/// details.
///
/// - `NotFound` maps to 404.
/// - `InvalidName` maps to 400.
/// - Everything else maps to 500 with the backend message as details.
fn classify_storage_error(err: &StorageError) -> (StatusCode, &'static str, String, Option<String>) {
    match err {
        StorageError::NotFound(name) => (
            StatusCode::NOT_FOUND,
            "NOT_FOUND",
            format!("Image {name} not found"),
            None,
        ),
        StorageError::InvalidName(name) => (
            StatusCode::BAD_REQUEST,
            "BAD_REQUEST",
            format!("Invalid image name: {name}"),
            None,
        ),
        other => {
            tracing::error!(error = %other, "Storage error");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "STORAGE_ERROR",
                "Storage backend request failed".to_string(),
                Some(other.to_string()),
            )
        }
    }
}
