//! The generation write path.
//!
//! Steps run strictly in order:
//!
//! 1. validate the prompt (before any side effect)
//! 2. expand it
//! 3. produce image bytes
//! 4. derive the thumbnail, if enabled
//! 5. save the image, then the thumbnail
//! 6. write the metadata record
//!
//! Steps 5 and 6 form a saga. A failed thumbnail upload deletes the image
//! that was already written; a failed metadata write deletes both. A failed
//! compensation is logged and the original error is still returned.
//!
//! The saga runs in its own task. Dropping the request future (timeout,
//! client disconnect) detaches it instead of stopping it between a write and
//! its compensation.

use std::sync::Arc;

use sketchy_core::generation::GenerationRecord;
use sketchy_core::naming::{self, ArtifactNames};
use sketchy_core::prompt::normalize_prompt;
use sketchy_core::thumbnail::derive_thumbnail;
use sketchy_storage::{ArtifactStore, MetadataIndex};

use crate::error::PipelineError;
use crate::expander::PromptExpander;
use crate::producer::ImageProducer;

/// Deployment switches for the write path.
#[derive(Debug, Clone)]
pub struct GenerationSettings {
    /// Derive and store a thumbnail next to each image. When off,
    /// `thumbnail_url` equals `image_url`.
    pub thumbnails_enabled: bool,
    /// Optional cap on the trimmed prompt length, in characters.
    pub max_prompt_chars: Option<usize>,
}

impl Default for GenerationSettings {
    fn default() -> Self {
        Self {
            thumbnails_enabled: true,
            max_prompt_chars: None,
        }
    }
}

pub struct GenerationPipeline {
    expander: Arc<dyn PromptExpander>,
    producer: Arc<dyn ImageProducer>,
    artifacts: Arc<dyn ArtifactStore>,
    metadata: Arc<dyn MetadataIndex>,
    settings: GenerationSettings,
}

impl GenerationPipeline {
    pub fn new(
        expander: Arc<dyn PromptExpander>,
        producer: Arc<dyn ImageProducer>,
        artifacts: Arc<dyn ArtifactStore>,
        metadata: Arc<dyn MetadataIndex>,
        settings: GenerationSettings,
    ) -> Self {
        Self {
            expander,
            producer,
            artifacts,
            metadata,
            settings,
        }
    }

    /// Run one generation end to end and return the stored record.
    pub async fn generate(&self, raw_prompt: &str) -> Result<GenerationRecord, PipelineError> {
        let original_prompt = normalize_prompt(raw_prompt, self.settings.max_prompt_chars)?;

        let generated_prompt = self.expander.expand(&original_prompt).await?;
        let image = self.producer.produce(&generated_prompt).await?;

        let names = ArtifactNames::generate(naming::image_extension(&image));

        // Derive before writing anything so a decode failure leaves no blobs.
        let thumbnail = if self.settings.thumbnails_enabled {
            let source = image.clone();
            Some(tokio::task::spawn_blocking(move || derive_thumbnail(&source)).await??)
        } else {
            None
        };

        let draft = Draft {
            original_prompt,
            generated_prompt,
            names,
            image,
            thumbnail,
        };
        let writer = SagaWriter {
            artifacts: self.artifacts.clone(),
            metadata: self.metadata.clone(),
        };
        let record = tokio::spawn(writer.persist(draft)).await??;

        tracing::info!(
            image_url = %record.image_url,
            producer = self.producer.name(),
            expander = self.expander.name(),
            "Generation stored",
        );
        Ok(record)
    }
}

/// Everything computed before the first write.
struct Draft {
    original_prompt: String,
    generated_prompt: String,
    names: ArtifactNames,
    image: Vec<u8>,
    thumbnail: Option<Vec<u8>>,
}

/// Owns the backends for the write phase so it can outlive the request.
struct SagaWriter {
    artifacts: Arc<dyn ArtifactStore>,
    metadata: Arc<dyn MetadataIndex>,
}

impl SagaWriter {
    async fn persist(self, draft: Draft) -> Result<GenerationRecord, PipelineError> {
        let Draft {
            original_prompt,
            generated_prompt,
            names,
            image,
            thumbnail,
        } = draft;

        let image_artifact = self.artifacts.save(&names.image, image).await?;

        let thumbnail_url = match thumbnail {
            Some(bytes) => match self.artifacts.save(&names.thumbnail, bytes).await {
                Ok(artifact) => artifact.url,
                Err(e) => {
                    tracing::error!(
                        name = %names.thumbnail,
                        error = %e,
                        "Thumbnail upload failed, removing image",
                    );
                    self.compensate(&[&image_artifact.url]).await;
                    return Err(e.into());
                }
            },
            None => image_artifact.url.clone(),
        };

        let record = GenerationRecord {
            original_prompt,
            generated_prompt,
            image_url: image_artifact.url.clone(),
            thumbnail_url,
            created_at: image_artifact.uploaded_at,
        };

        if let Err(e) = self.metadata.put(&record).await {
            tracing::error!(
                image_url = %record.image_url,
                error = %e,
                "Metadata write failed, removing artifacts",
            );
            let mut written = vec![record.image_url.as_str()];
            if record.thumbnail_url != record.image_url {
                written.push(record.thumbnail_url.as_str());
            }
            self.compensate(&written).await;
            return Err(e.into());
        }

        Ok(record)
    }

    /// Best-effort removal of artifacts written earlier in a failed run.
    async fn compensate(&self, identifiers: &[&str]) {
        for identifier in identifiers {
            if let Err(e) = self.artifacts.delete(identifier).await {
                tracing::error!(
                    identifier = %identifier,
                    error = %e,
                    "Compensating delete failed, artifact orphaned",
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use sketchy_core::error::CoreError;
    use sketchy_storage::StorageError;

    use super::*;
    use crate::expander::IdentityExpander;
    use crate::producer::CanvasImageProducer;
    use crate::test_support::{
        local_fixture, FlakyArtifactStore, GatedMetadataIndex, UnwritableMetadataIndex,
    };

    fn pipeline(
        artifacts: Arc<dyn ArtifactStore>,
        metadata: Arc<dyn MetadataIndex>,
        settings: GenerationSettings,
    ) -> GenerationPipeline {
        GenerationPipeline::new(
            Arc::new(IdentityExpander),
            Arc::new(CanvasImageProducer),
            artifacts,
            metadata,
            settings,
        )
    }

    #[tokio::test]
    async fn stores_image_thumbnail_and_record() {
        let fx = local_fixture().await;
        let p = pipeline(fx.artifacts.clone(), fx.metadata.clone(), GenerationSettings::default());

        let record = p.generate("  Daft Punk ").await.unwrap();

        assert_eq!(record.original_prompt, "Daft Punk");
        assert_eq!(record.generated_prompt, "Daft Punk");
        assert!(record.image_url.starts_with("/api/images/"));
        assert!(record.image_url.ends_with(".png"));
        assert!(record.thumbnail_url.ends_with("_thumb.jpg"));

        let listed = fx.artifacts.list().await.unwrap();
        assert_eq!(listed.len(), 2);
        assert_eq!(record.created_at, listed[0].uploaded_at);

        let stored = fx.metadata.get(&record.image_url).await.unwrap();
        assert_eq!(stored, Some(record));
    }

    #[tokio::test]
    async fn thumbnails_disabled_reuses_image_url() {
        let fx = local_fixture().await;
        let settings = GenerationSettings {
            thumbnails_enabled: false,
            ..GenerationSettings::default()
        };
        let p = pipeline(fx.artifacts.clone(), fx.metadata.clone(), settings);

        let record = p.generate("Daft Punk").await.unwrap();
        assert_eq!(record.thumbnail_url, record.image_url);
        assert_eq!(fx.artifacts.list().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn image_urls_are_unique_per_generation() {
        let fx = local_fixture().await;
        let p = pipeline(fx.artifacts.clone(), fx.metadata.clone(), GenerationSettings::default());
        let a = p.generate("same").await.unwrap();
        let b = p.generate("same").await.unwrap();
        assert_ne!(a.image_url, b.image_url);
        assert_eq!(fx.metadata.records().await.len(), 2);
    }

    #[tokio::test]
    async fn blank_prompt_fails_before_side_effects() {
        let fx = local_fixture().await;
        let p = pipeline(fx.artifacts.clone(), fx.metadata.clone(), GenerationSettings::default());
        assert_matches!(
            p.generate("   ").await,
            Err(PipelineError::Core(CoreError::Validation(_)))
        );
        assert!(fx.artifacts.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn prompt_length_cap_is_enforced() {
        let fx = local_fixture().await;
        let settings = GenerationSettings {
            max_prompt_chars: Some(4),
            ..GenerationSettings::default()
        };
        let p = pipeline(fx.artifacts.clone(), fx.metadata.clone(), settings);
        assert_matches!(
            p.generate("Daft Punk").await,
            Err(PipelineError::Core(CoreError::Validation(_)))
        );
    }

    #[tokio::test]
    async fn thumbnail_upload_failure_removes_image() {
        let fx = local_fixture().await;
        let flaky = Arc::new(FlakyArtifactStore {
            inner: fx.artifacts.clone(),
            fail_on: "_thumb",
        });
        let p = pipeline(flaky, fx.metadata.clone(), GenerationSettings::default());

        assert_matches!(
            p.generate("Daft Punk").await,
            Err(PipelineError::Storage(StorageError::ObjectStore(_)))
        );
        assert!(fx.artifacts.list().await.unwrap().is_empty());
        assert!(fx.metadata.records().await.is_empty());
    }

    #[tokio::test]
    async fn metadata_failure_removes_both_artifacts() {
        let fx = local_fixture().await;
        let p = pipeline(
            fx.artifacts.clone(),
            Arc::new(UnwritableMetadataIndex),
            GenerationSettings::default(),
        );

        assert_matches!(
            p.generate("Daft Punk").await,
            Err(PipelineError::Storage(StorageError::Kv { status: 503, .. }))
        );
        assert!(fx.artifacts.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn dropped_request_still_compensates() {
        let fx = local_fixture().await;
        let gate = Arc::new(GatedMetadataIndex::default());
        let p = pipeline(fx.artifacts.clone(), gate.clone(), GenerationSettings::default());

        let request = tokio::spawn(async move { p.generate("Daft Punk").await });
        gate.entered.notified().await;
        assert_eq!(fx.artifacts.list().await.unwrap().len(), 2);

        // Drop the request mid-saga, then let the metadata write fail.
        request.abort();
        assert!(request.await.unwrap_err().is_cancelled());
        gate.release.notify_one();

        for _ in 0..100 {
            if fx.artifacts.list().await.unwrap().is_empty() {
                break;
            }
            tokio::time::sleep(std::time::Duration::from_millis(10)).await;
        }
        assert!(fx.artifacts.list().await.unwrap().is_empty());
    }
}
