//! The provider seam between narration and a text-generation backend

use crate::{CompletionRequest, CompletionResponse, FinishReason, LLMError, Result};
use async_trait::async_trait;
use tracing::warn;

/// A text-generation backend
#[async_trait]
pub trait LLMProvider: Send + Sync {
    /// Run one completion
    ///
    /// HTTP 429 must surface as [`LLMError::RateLimitExceeded`].
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse>;

    /// Short backend name for logs, e.g. `openai`
    fn name(&self) -> &str;

    /// Complete and return the trimmed text
    ///
    /// Blank output is an error: [`LLMError::ContentFiltered`] when the
    /// backend withheld it, [`LLMError::EmptyCompletion`] otherwise.
    async fn generate(&self, request: CompletionRequest) -> Result<String> {
        let response = self.complete(request).await?;
        let text = response.text.trim();

        if text.is_empty() {
            return Err(match response.finish {
                FinishReason::Filtered => LLMError::ContentFiltered(self.name().to_string()),
                _ => LLMError::EmptyCompletion(self.name().to_string()),
            });
        }
        if response.finish.is_truncated() {
            warn!("{} stopped at the token limit", self.name());
        }
        Ok(text.to_string())
    }
}
