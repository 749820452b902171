use async_trait::async_trait;
use sketchy_core::generation::ArtifactDescriptor;

use crate::error::StorageResult;

/// Named binary objects with durable fetch URLs.
///
/// `identifier` arguments accept either the bare object name or any URL
/// whose last path segment is the object name, so callers can pass the
/// `imageUrl` they received from a previous `save`.
#[async_trait]
pub trait ArtifactStore: Send + Sync {
    /// Short label used in logs and the health payload.
    fn backend_name(&self) -> &'static str;

    /// Persist `bytes` under `name` and describe the stored object.
    async fn save(&self, name: &str, bytes: Vec<u8>) -> StorageResult<ArtifactDescriptor>;

    /// Enumerate every stored object, thumbnails included, in no
    /// particular order.
    async fn list(&self) -> StorageResult<Vec<ArtifactDescriptor>>;

    /// Delete one object.
    async fn delete(&self, identifier: &str) -> StorageResult<()>;

    /// Delete every object. Returns how many were removed.
    async fn clear(&self) -> StorageResult<usize>;
}
