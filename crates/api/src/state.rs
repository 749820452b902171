use std::sync::Arc;

use sketchy_pipeline::{
    GalleryService, GenerationPipeline, GenerationSettings, ImageProducer, MaintenanceService,
    PromptExpander,
};
use sketchy_storage::{ArtifactStore, MetadataIndex};

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc`).
#[derive(Clone)]
pub struct AppState {
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// Generation write path.
    pub generation: Arc<GenerationPipeline>,
    /// Gallery read path.
    pub gallery: Arc<GalleryService>,
    /// Admin maintenance operations.
    pub maintenance: Arc<MaintenanceService>,
    pub artifacts: Arc<dyn ArtifactStore>,
    pub metadata: Arc<dyn MetadataIndex>,
}

impl AppState {
    /// Wire the services around already-constructed backends.
    pub fn new(
        config: ServerConfig,
        expander: Arc<dyn PromptExpander>,
        producer: Arc<dyn ImageProducer>,
        artifacts: Arc<dyn ArtifactStore>,
        metadata: Arc<dyn MetadataIndex>,
    ) -> Self {
        let settings = GenerationSettings {
            thumbnails_enabled: config.thumbnails_enabled,
            max_prompt_chars: config.max_prompt_chars,
        };

        let generation = GenerationPipeline::new(
            expander,
            producer,
            Arc::clone(&artifacts),
            Arc::clone(&metadata),
            settings,
        );
        let gallery = GalleryService::new(
            Arc::clone(&artifacts),
            Arc::clone(&metadata),
            config.gallery_max_items,
        );
        let maintenance = MaintenanceService::new(Arc::clone(&artifacts), Arc::clone(&metadata));

        Self {
            config: Arc::new(config),
            generation: Arc::new(generation),
            gallery: Arc::new(gallery),
            maintenance: Arc::new(maintenance),
            artifacts,
            metadata,
        }
    }
}
