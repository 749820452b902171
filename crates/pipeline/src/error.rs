use sketchy_core::error::CoreError;
use sketchy_openai::OpenAiError;
use sketchy_storage::StorageError;

/// Errors from the generation, gallery and maintenance services.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    /// The text or image API call failed. Carries the upstream message.
    #[error("Upstream request failed: {0}")]
    Upstream(#[from] OpenAiError),

    #[error(transparent)]
    Storage(#[from] StorageError),

    /// Validation, image processing and other domain failures.
    #[error(transparent)]
    Core(#[from] CoreError),
}

impl From<tokio::task::JoinError> for PipelineError {
    fn from(err: tokio::task::JoinError) -> Self {
        PipelineError::Core(CoreError::Internal(format!("Blocking task failed: {err}")))
    }
}
