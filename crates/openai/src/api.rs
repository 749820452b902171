//! HTTP client for the OpenAI-compatible REST endpoints.
//!
//! Wraps chat completion, image generation and raw downloads using
//! [`reqwest`]. Nothing here retries: every failure is returned to the
//! caller as-is.

use crate::messages::{
    ChatCompletionRequest, ChatCompletionResponse, ChatMessage, ImageGenerationRequest,
    ImageGenerationResponse,
};

/// Default API base URL.
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// HTTP client for one API account.
#[derive(Clone)]
pub struct OpenAiApi {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
}

/// Errors from the REST API layer.
#[derive(Debug, thiserror::Error)]
pub enum OpenAiError {
    /// The HTTP request itself failed (network, DNS, TLS, etc.).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The server returned a non-2xx status code.
    #[error("API error ({status}): {body}")]
    ApiError {
        /// HTTP status code.
        status: u16,
        /// Raw response body for debugging.
        body: String,
    },

    /// A 2xx response that did not contain the expected payload.
    #[error("Unexpected API response: {0}")]
    EmptyResponse(String),
}

impl OpenAiApi {
    /// Create a client for `base_url` (e.g. `https://api.openai.com/v1`).
    pub fn new(api_key: String, base_url: String) -> Self {
        Self::with_client(reqwest::Client::new(), api_key, base_url)
    }

    /// Create a client reusing an existing [`reqwest::Client`].
    pub fn with_client(client: reqwest::Client, api_key: String, base_url: String) -> Self {
        Self {
            client,
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Send a single user message and return the trimmed reply text.
    ///
    /// Sends `POST /chat/completions`.
    pub async fn chat_completion(&self, model: &str, content: &str) -> Result<String, OpenAiError> {
        let body = ChatCompletionRequest {
            model,
            messages: vec![ChatMessage::user(content)],
        };

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?;

        let parsed: ChatCompletionResponse = Self::parse_response(response).await?;
        let text = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .map(|content| content.trim().to_string())
            .filter(|content| !content.is_empty())
            .ok_or_else(|| OpenAiError::EmptyResponse("completion contained no text".into()))?;

        tracing::debug!(model, chars = text.len(), "Chat completion received");
        Ok(text)
    }

    /// Request one image and return its short-lived download URL.
    ///
    /// Sends `POST /images/generations` with `n = 1`.
    pub async fn generate_image(
        &self,
        model: &str,
        prompt: &str,
        size: &str,
    ) -> Result<String, OpenAiError> {
        let body = ImageGenerationRequest {
            model,
            prompt,
            n: 1,
            size,
            response_format: "url",
        };

        let response = self
            .client
            .post(format!("{}/images/generations", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?;

        let parsed: ImageGenerationResponse = Self::parse_response(response).await?;
        let image = parsed
            .data
            .into_iter()
            .next()
            .ok_or_else(|| OpenAiError::EmptyResponse("no images in response".into()))?;

        if let Some(revised) = &image.revised_prompt {
            tracing::debug!(revised_prompt = %revised, "Image prompt revised upstream");
        }

        image
            .url
            .ok_or_else(|| OpenAiError::EmptyResponse("image entry has no url".into()))
    }

    /// Download `url` and return the body bytes.
    ///
    /// Used for generated-image URLs and placeholder services alike, so no
    /// API credentials are attached.
    pub async fn fetch_bytes(&self, url: &str) -> Result<Vec<u8>, OpenAiError> {
        let response = self.client.get(url).send().await?;
        let response = Self::ensure_success(response).await?;
        Ok(response.bytes().await?.to_vec())
    }

    // ---- private helpers ----

    /// Ensure the response has a success status code. Returns the
    /// response unchanged on success, or a [`OpenAiError::ApiError`]
    /// containing the status and body text on failure.
    async fn ensure_success(response: reqwest::Response) -> Result<reqwest::Response, OpenAiError> {
        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            return Err(OpenAiError::ApiError {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response)
    }

    /// Parse a successful JSON response body into the expected type.
    async fn parse_response<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, OpenAiError> {
        let response = Self::ensure_success(response).await?;
        Ok(response.json::<T>().await?)
    }
}
