//! Text-generation backends for market narration
//!
//! [`LLMProvider`] is the seam the narrator talks to. Requests are single-shot
//! ([`CompletionRequest::new`] plus optional instructions), and a throttled
//! backend always surfaces as [`LLMError::RateLimitExceeded`] so callers can
//! apply their own cool-down.
//!
//! Concrete providers live in [`providers`] behind the `openai` and
//! `anthropic` features.

pub mod completion;
pub mod error;
pub mod provider;
pub mod turn;

pub use completion::{CompletionRequest, CompletionResponse, FinishReason, TokenUsage};
pub use error::{LLMError, Result};
pub use provider::LLMProvider;
pub use turn::{Role, Turn};

#[cfg(any(feature = "openai", feature = "anthropic"))]
pub mod providers;
