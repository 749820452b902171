use async_trait::async_trait;
use sketchy_core::generation::GenerationRecord;
use tokio::sync::RwLock;

use crate::error::StorageResult;

/// Generation records keyed by their `image_url`.
///
/// Writes and deletes here are independent of the artifact store; nothing
/// ties the two together atomically.
#[async_trait]
pub trait MetadataIndex: Send + Sync {
    /// Short label used in logs and the health payload.
    fn backend_name(&self) -> &'static str;

    /// Store `record` under `record.image_url`, replacing any previous value.
    async fn put(&self, record: &GenerationRecord) -> StorageResult<()>;

    async fn get(&self, image_url: &str) -> StorageResult<Option<GenerationRecord>>;

    /// Look up several keys at once. The result is positionally aligned with
    /// `image_urls`.
    async fn get_many(&self, image_urls: &[String]) -> StorageResult<Vec<Option<GenerationRecord>>> {
        let mut records = Vec::with_capacity(image_urls.len());
        for url in image_urls {
            records.push(self.get(url).await?);
        }
        Ok(records)
    }

    /// Remove the record for `image_url`. Returns whether one existed.
    async fn delete(&self, image_url: &str) -> StorageResult<bool>;

    /// Remove every record. Returns how many were removed.
    async fn clear(&self) -> StorageResult<usize>;
}

// ---------------------------------------------------------------------------
// In-process backend
// ---------------------------------------------------------------------------

/// Insertion-ordered in-process list, used in local development.
#[derive(Default)]
pub struct InMemoryMetadataIndex {
    records: RwLock<Vec<GenerationRecord>>,
}

impl InMemoryMetadataIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of every record in insertion order.
    pub async fn records(&self) -> Vec<GenerationRecord> {
        self.records.read().await.clone()
    }
}

#[async_trait]
impl MetadataIndex for InMemoryMetadataIndex {
    fn backend_name(&self) -> &'static str {
        "memory"
    }

    async fn put(&self, record: &GenerationRecord) -> StorageResult<()> {
        let mut records = self.records.write().await;
        match records.iter_mut().find(|r| r.image_url == record.image_url) {
            Some(existing) => *existing = record.clone(),
            None => records.push(record.clone()),
        }
        Ok(())
    }

    async fn get(&self, image_url: &str) -> StorageResult<Option<GenerationRecord>> {
        Ok(self
            .records
            .read()
            .await
            .iter()
            .find(|r| r.image_url == image_url)
            .cloned())
    }

    async fn delete(&self, image_url: &str) -> StorageResult<bool> {
        let mut records = self.records.write().await;
        let before = records.len();
        records.retain(|r| r.image_url != image_url);
        Ok(records.len() != before)
    }

    async fn clear(&self) -> StorageResult<usize> {
        let drained = std::mem::take(&mut *self.records.write().await);
        Ok(drained.len())
    }
}
