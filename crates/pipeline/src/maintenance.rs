//! Admin maintenance across both backends.
//!
//! None of these operations are transactional with respect to concurrent
//! generations. The credential check happens at the HTTP layer.

use std::sync::Arc;

use sketchy_core::error::CoreError;
use sketchy_core::gallery::{plan_retention, primary_artifacts};
use sketchy_core::naming;
use sketchy_storage::{ArtifactStore, MetadataIndex, StorageError};

use crate::error::PipelineError;

/// Result of a full clear.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClearOutcome {
    /// Generations removed (thumbnails not counted).
    pub images: usize,
    /// Objects removed from the artifact store, thumbnails included.
    pub artifacts: usize,
    /// Records removed from the metadata index.
    pub records: usize,
}

/// Result of a retain-newest-N sweep.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetentionOutcome {
    pub kept: usize,
    pub deleted: usize,
}

pub struct MaintenanceService {
    artifacts: Arc<dyn ArtifactStore>,
    metadata: Arc<dyn MetadataIndex>,
}

impl MaintenanceService {
    pub fn new(artifacts: Arc<dyn ArtifactStore>, metadata: Arc<dyn MetadataIndex>) -> Self {
        Self {
            artifacts,
            metadata,
        }
    }

    /// Delete every artifact and every metadata record.
    pub async fn clear_all(&self) -> Result<ClearOutcome, PipelineError> {
        let images = primary_artifacts(self.artifacts.list().await?).len();
        let artifacts = self.artifacts.clear().await?;
        let records = self.metadata.clear().await?;

        tracing::info!(images, artifacts, records, "Gallery cleared");
        Ok(ClearOutcome {
            images,
            artifacts,
            records,
        })
    }

    /// Delete one generation: its image, its thumbnail and its record.
    ///
    /// `url` may be the generation's image URL or its thumbnail URL, with or
    /// without a query string. It is resolved against the stored artifacts,
    /// and the record is removed under the stored image URL.
    ///
    /// Fails with [`StorageError::NotFound`] when no stored image matches.
    /// A missing thumbnail is not an error.
    pub async fn remove_one(&self, url: &str) -> Result<(), PipelineError> {
        let url = url.trim();
        if url.is_empty() {
            return Err(CoreError::Validation("imageUrl is required".into()).into());
        }

        let target = naming::name_from_url(url)
            .ok_or_else(|| StorageError::NotFound(url.to_string()))?;
        let image = primary_artifacts(self.artifacts.list().await?)
            .into_iter()
            .find(|a| a.name == target || naming::thumbnail_name_for(&a.name) == target)
            .ok_or_else(|| StorageError::NotFound(url.to_string()))?;

        self.artifacts.delete(&image.name).await?;
        self.remove_companions(&image.url).await?;

        tracing::info!(image_url = %image.url, requested = url, "Image removed");
        Ok(())
    }

    /// Keep the newest `keep` generations and delete the rest.
    ///
    /// Running it twice with the same `keep` deletes nothing the second time.
    pub async fn retain_newest(&self, keep: usize) -> Result<RetentionOutcome, PipelineError> {
        let plan = plan_retention(self.artifacts.list().await?, keep);

        for artifact in &plan.remove {
            self.artifacts.delete(&artifact.name).await?;
            self.remove_companions(&artifact.url).await?;
        }

        let outcome = RetentionOutcome {
            kept: plan.keep.len(),
            deleted: plan.remove.len(),
        };
        tracing::info!(kept = outcome.kept, deleted = outcome.deleted, "Gallery reduced");
        Ok(outcome)
    }

    /// Remove the thumbnail and metadata that belong to an already-deleted
    /// image.
    async fn remove_companions(&self, image_url: &str) -> Result<(), PipelineError> {
        if let Some(name) = naming::name_from_url(image_url) {
            if !naming::is_thumbnail(name) {
                let thumbnail = naming::thumbnail_name_for(name);
                match self.artifacts.delete(&thumbnail).await {
                    Ok(()) | Err(StorageError::NotFound(_)) => {}
                    Err(e) => return Err(e.into()),
                }
            }
        }

        if !self.metadata.delete(image_url).await? {
            tracing::debug!(image_url, "No metadata record to remove");
        }
        Ok(())
    }
}
