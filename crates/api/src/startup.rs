//! Backend selection.
//!
//! Every choice between implementations is made here, once, from the
//! configuration. The rest of the server only sees trait objects.

use std::sync::Arc;

use sketchy_openai::OpenAiApi;
use sketchy_pipeline::{
    CanvasImageProducer, IdentityExpander, ImageProducer, OpenAiExpander, OpenAiImageProducer,
    PlaceholderImageProducer, PromptExpander,
};
use sketchy_storage::{
    ArtifactStore, InMemoryMetadataIndex, KvMetadataIndex, LocalArtifactStore, MetadataIndex,
    S3ArtifactStore, StorageError,
};

use crate::config::{MockImageSource, ServerConfig, StorageBackend};
use crate::state::AppState;

/// Failures while constructing backends.
#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    #[error("Failed to open artifact store: {0}")]
    Storage(#[from] StorageError),

    #[error("Incomplete configuration: {0}")]
    Config(&'static str),
}

fn openai_client(config: &ServerConfig) -> OpenAiApi {
    OpenAiApi::new(
        config.openai.api_key.clone().unwrap_or_default(),
        config.openai.base_url.clone(),
    )
}

pub fn build_expander(config: &ServerConfig) -> Arc<dyn PromptExpander> {
    if config.prompt_expansion {
        Arc::new(OpenAiExpander::new(
            openai_client(config),
            config.openai.chat_model.clone(),
        ))
    } else {
        Arc::new(IdentityExpander)
    }
}

pub fn build_producer(config: &ServerConfig) -> Arc<dyn ImageProducer> {
    if config.use_openai_api {
        return Arc::new(OpenAiImageProducer::new(
            openai_client(config),
            config.openai.image_model.clone(),
        ));
    }
    match config.mock_image_source {
        MockImageSource::Canvas => Arc::new(CanvasImageProducer),
        MockImageSource::Placeholder => Arc::new(PlaceholderImageProducer::new(
            openai_client(config),
            config.placeholder_base_url.clone(),
        )),
    }
}

pub async fn build_backends(
    config: &ServerConfig,
) -> Result<(Arc<dyn ArtifactStore>, Arc<dyn MetadataIndex>), StartupError> {
    match config.storage_backend {
        StorageBackend::Local => {
            let store = LocalArtifactStore::open(
                config.images_dir.clone(),
                &config.public_image_prefix,
            )
            .await?;
            Ok((Arc::new(store), Arc::new(InMemoryMetadataIndex::new())))
        }
        StorageBackend::Remote => {
            let s3 = config
                .s3
                .as_ref()
                .ok_or(StartupError::Config("S3 settings missing for remote storage"))?;
            let kv = config
                .kv
                .as_ref()
                .ok_or(StartupError::Config("KV settings missing for remote storage"))?;
            let store = S3ArtifactStore::connect(s3).await;
            let index = KvMetadataIndex::new(kv.url.clone(), kv.token.clone(), kv.namespace.clone());
            Ok((Arc::new(store), Arc::new(index)))
        }
    }
}

/// Build the complete application state from configuration.
pub async fn build_state(config: ServerConfig) -> Result<AppState, StartupError> {
    let expander = build_expander(&config);
    let producer = build_producer(&config);
    let (artifacts, metadata) = build_backends(&config).await?;

    tracing::info!(
        expander = expander.name(),
        producer = producer.name(),
        artifact_store = artifacts.backend_name(),
        metadata_index = metadata.backend_name(),
        thumbnails = config.thumbnails_enabled,
        "Backends selected",
    );

    Ok(AppState::new(config, expander, producer, artifacts, metadata))
}
