/// Errors from artifact and metadata backends.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// Local filesystem failure.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The named artifact is not known to the store.
    #[error("Artifact not found: {0}")]
    NotFound(String),

    /// An object name that could escape the store's namespace.
    #[error("Invalid artifact name: {0}")]
    InvalidName(String),

    /// Object store call failed. Carries the SDK's full error context.
    #[error("Object store error: {0}")]
    ObjectStore(String),

    /// The key-value HTTP request itself failed.
    #[error("Key-value request failed: {0}")]
    KvRequest(#[from] reqwest::Error),

    /// The key-value service answered with an error.
    #[error("Key-value error ({status}): {body}")]
    Kv { status: u16, body: String },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type StorageResult<T> = Result<T, StorageError>;
