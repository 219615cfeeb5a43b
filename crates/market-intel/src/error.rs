//! Errors raised by the collection, analysis and delivery stages

use intel_llm::LLMError;
use intel_prompt::PromptError;
use intel_utils::EnvError;
use thiserror::Error;

/// Every failure a pipeline stage can surface
#[derive(Debug, Error)]
pub enum IntelError {
    /// Upstream answered with something other than data
    #[error("API error: {0}")]
    ApiError(String),

    /// Upstream throttled us
    #[error("Rate limit exceeded for {provider}")]
    RateLimitExceeded { provider: String },

    #[error("Network error: {0}")]
    NetworkError(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// Quote lookup failed
    #[error("Yahoo Finance error: {0}")]
    YahooFinanceError(String),

    /// Price series unusable for analysis
    #[error("Malformed series for {symbol}: {reason}")]
    MalformedSeries { symbol: String, reason: String },

    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Text generation backend error
    #[error("LLM error: {0}")]
    LlmError(#[from] LLMError),

    /// Prompt template error
    #[error("Prompt error: {0}")]
    PromptError(#[from] PromptError),

    /// Report could not be handed to its sink
    #[error("Delivery failed: {0}")]
    DeliveryError(String),

    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
}

/// Shorthand used throughout the crate
pub type Result<T> = std::result::Result<T, IntelError>;

impl From<EnvError> for IntelError {
    fn from(err: EnvError) -> Self {
        IntelError::ConfigError(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = IntelError::MalformedSeries {
            symbol: "7203.T".to_string(),
            reason: "previous close is zero".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Malformed series for 7203.T: previous close is zero"
        );

        let err = IntelError::RateLimitExceeded {
            provider: "newsapi".to_string(),
        };
        assert_eq!(err.to_string(), "Rate limit exceeded for newsapi");
    }

    #[test]
    fn test_error_conversion() {
        let err: IntelError = EnvError::Missing("NEWS_API_KEY".to_string()).into();
        match err {
            IntelError::ConfigError(msg) => assert!(msg.contains("NEWS_API_KEY")),
            other => panic!("Expected ConfigError, got {other:?}"),
        }

        let err: IntelError = LLMError::RateLimitExceeded("slow down".to_string()).into();
        assert!(matches!(err, IntelError::LlmError(_)));
    }
}
