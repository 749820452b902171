//! Short prompt -> descriptive generation prompt.

use async_trait::async_trait;
use sketchy_core::prompt::expansion_instruction;
use sketchy_openai::OpenAiApi;

use crate::error::PipelineError;

/// Default text-completion model for expansion.
pub const DEFAULT_CHAT_MODEL: &str = "gpt-3.5-turbo";

#[async_trait]
pub trait PromptExpander: Send + Sync {
    fn name(&self) -> &'static str;

    /// Turn a validated user prompt into the prompt sent to the image
    /// producer. Failures are returned as-is; there is no fallback.
    async fn expand(&self, prompt: &str) -> Result<String, PipelineError>;
}

/// Expansion disabled: the prompt passes through unchanged.
pub struct IdentityExpander;

#[async_trait]
impl PromptExpander for IdentityExpander {
    fn name(&self) -> &'static str {
        "identity"
    }

    async fn expand(&self, prompt: &str) -> Result<String, PipelineError> {
        Ok(prompt.to_string())
    }
}

/// Expansion through a chat completion.
pub struct OpenAiExpander {
    api: OpenAiApi,
    model: String,
}

impl OpenAiExpander {
    pub fn new(api: OpenAiApi, model: impl Into<String>) -> Self {
        Self {
            api,
            model: model.into(),
        }
    }
}

#[async_trait]
impl PromptExpander for OpenAiExpander {
    fn name(&self) -> &'static str {
        "openai"
    }

    async fn expand(&self, prompt: &str) -> Result<String, PipelineError> {
        let instruction = expansion_instruction(prompt);
        let expanded = self.api.chat_completion(&self.model, &instruction).await?;
        tracing::debug!(original = %prompt, expanded = %expanded, "Prompt expanded");
        Ok(expanded)
    }
}
