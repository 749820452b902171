//! Request and response bodies for the completion and image endpoints.
//!
//! Only the fields this service reads are modelled; unknown fields in
//! responses are ignored.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Chat completions
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".into(),
            content: content.into(),
        }
    }
}

/// Body of `POST /chat/completions`.
#[derive(Debug, Serialize)]
pub struct ChatCompletionRequest<'a> {
    pub model: &'a str,
    pub messages: Vec<ChatMessage>,
}

#[derive(Debug, Deserialize)]
pub struct ChatCompletionResponse {
    pub choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
pub struct ChatChoice {
    pub message: ChatChoiceMessage,
}

#[derive(Debug, Deserialize)]
pub struct ChatChoiceMessage {
    /// Absent for tool-call-only replies, which this service never requests.
    #[serde(default)]
    pub content: Option<String>,
}

// ---------------------------------------------------------------------------
// Image generation
// ---------------------------------------------------------------------------

/// Body of `POST /images/generations`.
#[derive(Debug, Serialize)]
pub struct ImageGenerationRequest<'a> {
    pub model: &'a str,
    pub prompt: &'a str,
    pub n: u8,
    pub size: &'a str,
    pub response_format: &'a str,
}

#[derive(Debug, Deserialize)]
pub struct ImageGenerationResponse {
    pub data: Vec<GeneratedImage>,
}

#[derive(Debug, Deserialize)]
pub struct GeneratedImage {
    /// Short-lived download URL.
    #[serde(default)]
    pub url: Option<String>,
    /// The prompt the API actually used, when it rewrote ours.
    #[serde(default)]
    pub revised_prompt: Option<String>,
}
