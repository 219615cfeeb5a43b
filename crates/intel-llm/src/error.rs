//! Errors raised by text-generation providers

use thiserror::Error;

pub type Result<T> = std::result::Result<T, LLMError>;

#[derive(Error, Debug)]
pub enum LLMError {
    /// HTTP 429; the only condition callers retry
    #[error("Rate limit exceeded: {0}")]
    RateLimitExceeded(String),

    #[error("{0} rejected the credentials")]
    Unauthorized(String),

    #[error("Model '{0}' is not available")]
    UnknownModel(String),

    #[error("Request rejected with HTTP {status}: {body}")]
    Rejected { status: u16, body: String },

    /// Connection failures and client-side timeouts
    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Could not decode response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("{0} returned an empty completion")]
    EmptyCompletion(String),

    #[error("{0} withheld the completion")]
    ContentFiltered(String),

    #[error("Invalid provider configuration: {0}")]
    Configuration(String),
}

impl LLMError {
    pub fn is_rate_limited(&self) -> bool {
        matches!(self, LLMError::RateLimitExceeded(_))
    }

    /// Error for a non-success HTTP status
    pub(crate) fn from_status(provider: &str, model: &str, status: u16, body: String) -> Self {
        match status {
            429 => LLMError::RateLimitExceeded(body),
            401 | 403 => LLMError::Unauthorized(provider.to_string()),
            404 => LLMError::UnknownModel(model.to_string()),
            _ => LLMError::Rejected { status, body },
        }
    }
}
