//! Persisted and projected gallery data model.

use serde::{Deserialize, Serialize};

use crate::types::Timestamp;

/// The metadata written once per successful generation.
///
/// `image_url` doubles as the record's key in every metadata backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationRecord {
    pub original_prompt: String,
    /// Equals `original_prompt` when prompt expansion is disabled.
    pub generated_prompt: String,
    pub image_url: String,
    /// Equals `image_url` when the deployment does not derive thumbnails.
    pub thumbnail_url: String,
    pub created_at: Timestamp,
}

/// A stored binary object as reported by an artifact store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArtifactDescriptor {
    /// Store-level object name, e.g. `0190f3c2...png`.
    pub name: String,
    /// Durable fetch URL handed to clients.
    pub url: String,
    /// Upload time according to the store. Authoritative for gallery order.
    pub uploaded_at: Timestamp,
}

/// One entry of the gallery read model.
///
/// When the metadata lookup misses, only `image_url` and `created_at` (the
/// artifact's upload time) are populated and every other field is empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GalleryItem {
    pub original_prompt: String,
    pub generated_prompt: String,
    pub image_url: String,
    pub thumbnail_url: String,
    pub created_at: Timestamp,
}

impl GalleryItem {
    /// Project a full record.
    pub fn from_record(record: GenerationRecord) -> Self {
        Self {
            original_prompt: record.original_prompt,
            generated_prompt: record.generated_prompt,
            image_url: record.image_url,
            thumbnail_url: record.thumbnail_url,
            created_at: record.created_at,
        }
    }

    /// Project an artifact whose metadata could not be found.
    pub fn degraded(artifact: &ArtifactDescriptor) -> Self {
        Self {
            original_prompt: String::new(),
            generated_prompt: String::new(),
            image_url: artifact.url.clone(),
            thumbnail_url: String::new(),
            created_at: artifact.uploaded_at,
        }
    }

    /// Whether this item was projected without metadata.
    pub fn is_degraded(&self) -> bool {
        self.original_prompt.is_empty() && self.thumbnail_url.is_empty()
    }
}
