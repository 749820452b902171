//! The gallery read path: list, plan, look up, join.

use std::sync::Arc;

use sketchy_core::gallery::{effective_limit, join_metadata, plan_view};
use sketchy_core::generation::GalleryItem;
use sketchy_storage::{ArtifactStore, MetadataIndex};

use crate::error::PipelineError;

/// One page of the gallery, newest first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GalleryPage {
    pub items: Vec<GalleryItem>,
    /// Number of generations stored, regardless of the page size.
    pub total: usize,
}

pub struct GalleryService {
    artifacts: Arc<dyn ArtifactStore>,
    metadata: Arc<dyn MetadataIndex>,
    max_items: usize,
}

impl GalleryService {
    pub fn new(
        artifacts: Arc<dyn ArtifactStore>,
        metadata: Arc<dyn MetadataIndex>,
        max_items: usize,
    ) -> Self {
        Self {
            artifacts,
            metadata,
            max_items,
        }
    }

    /// Build a view of at most `min(requested, max_items)` items.
    ///
    /// Never writes. Artifacts without metadata are returned as degraded
    /// items instead of being dropped.
    pub async fn view(&self, requested: Option<usize>) -> Result<GalleryPage, PipelineError> {
        let limit = effective_limit(requested, self.max_items);
        let plan = plan_view(self.artifacts.list().await?, limit);

        let urls: Vec<String> = plan.selected.iter().map(|a| a.url.clone()).collect();
        let records = self.metadata.get_many(&urls).await?;
        let items = join_metadata(&plan.selected, records);

        let degraded = items.iter().filter(|i| i.is_degraded()).count();
        if degraded > 0 {
            tracing::warn!(degraded, "Gallery items returned without metadata");
        }

        Ok(GalleryPage {
            items,
            total: plan.total,
        })
    }
}
