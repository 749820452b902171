//! Descriptive prompt -> raw image bytes.
//!
//! One live implementation backed by the image generation API and two mock
//! implementations that never touch it.

use async_trait::async_trait;
use sketchy_core::canvas::render_canvas;
use sketchy_core::error::CoreError;
use sketchy_openai::OpenAiApi;

use crate::error::PipelineError;

/// Default image generation model.
pub const DEFAULT_IMAGE_MODEL: &str = "dall-e-3";

/// Resolution requested from the image generation API.
pub const IMAGE_SIZE: &str = "1024x1024";

/// Default placeholder image service.
pub const DEFAULT_PLACEHOLDER_BASE_URL: &str = "https://placehold.co";

#[async_trait]
pub trait ImageProducer: Send + Sync {
    fn name(&self) -> &'static str;

    async fn produce(&self, prompt: &str) -> Result<Vec<u8>, PipelineError>;
}

// ---------------------------------------------------------------------------
// Live
// ---------------------------------------------------------------------------

/// Requests one image and downloads it straight away, before the
/// short-lived URL expires. The download is not retried.
pub struct OpenAiImageProducer {
    api: OpenAiApi,
    model: String,
}

impl OpenAiImageProducer {
    pub fn new(api: OpenAiApi, model: impl Into<String>) -> Self {
        Self {
            api,
            model: model.into(),
        }
    }
}

#[async_trait]
impl ImageProducer for OpenAiImageProducer {
    fn name(&self) -> &'static str {
        "openai"
    }

    async fn produce(&self, prompt: &str) -> Result<Vec<u8>, PipelineError> {
        let url = self.api.generate_image(&self.model, prompt, IMAGE_SIZE).await?;
        tracing::debug!(model = %self.model, "Image generated, downloading");
        let bytes = self.api.fetch_bytes(&url).await?;
        tracing::debug!(size = bytes.len(), "Generated image downloaded");
        Ok(bytes)
    }
}

// ---------------------------------------------------------------------------
// Mock: local canvas
// ---------------------------------------------------------------------------

/// Synthesizes a solid-color PNG from the prompt.
pub struct CanvasImageProducer;

#[async_trait]
impl ImageProducer for CanvasImageProducer {
    fn name(&self) -> &'static str {
        "mock-canvas"
    }

    async fn produce(&self, prompt: &str) -> Result<Vec<u8>, PipelineError> {
        let prompt = prompt.to_string();
        let bytes = tokio::task::spawn_blocking(move || render_canvas(&prompt)).await??;
        Ok(bytes)
    }
}

// ---------------------------------------------------------------------------
// Mock: placeholder service
// ---------------------------------------------------------------------------

/// Fetches a placeholder image with the prompt rendered as overlay text.
pub struct PlaceholderImageProducer {
    api: OpenAiApi,
    base_url: String,
}

impl PlaceholderImageProducer {
    /// `api` is only used for its credential-free download helper.
    pub fn new(api: OpenAiApi, base_url: impl Into<String>) -> Self {
        Self {
            api,
            base_url: base_url.into(),
        }
    }
}

/// `<base>/600x400/png?text=<prompt>`, with the prompt query-encoded.
pub fn placeholder_url(base_url: &str, prompt: &str) -> Result<String, CoreError> {
    let raw = format!("{}/600x400/png", base_url.trim_end_matches('/'));
    let mut url = reqwest::Url::parse(&raw)
        .map_err(|e| CoreError::Misconfigured(format!("Invalid placeholder URL {raw}: {e}")))?;
    url.query_pairs_mut().append_pair("text", prompt);
    Ok(url.into())
}

#[async_trait]
impl ImageProducer for PlaceholderImageProducer {
    fn name(&self) -> &'static str {
        "mock-placeholder"
    }

    async fn produce(&self, prompt: &str) -> Result<Vec<u8>, PipelineError> {
        let url = placeholder_url(&self.base_url, prompt)?;
        Ok(self.api.fetch_bytes(&url).await?)
    }
}
