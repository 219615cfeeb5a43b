//! Completion requests and responses

use crate::turn::{Role, Turn};
use serde::{Deserialize, Serialize};

/// Output budget when the caller does not set one
pub const DEFAULT_MAX_TOKENS: u32 = 512;

/// A generation request: standing instructions plus the turns so far
///
/// # Examples
///
/// ```
/// use intel_llm::CompletionRequest;
///
/// let request = CompletionRequest::new("gpt-4o-mini", "Summarize: Yen slides")
///     .with_instructions("You are a markets editor.")
///     .with_max_tokens(300)
///     .with_temperature(0.3);
///
/// assert_eq!(request.prompt(), Some("Summarize: Yen slides"));
/// assert_eq!(request.max_tokens, 300);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompletionRequest {
    pub model: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instructions: Option<String>,
    pub turns: Vec<Turn>,
    pub max_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
}

impl CompletionRequest {
    /// Request with a single user prompt
    pub fn new(model: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            instructions: None,
            turns: vec![Turn::user(prompt)],
            max_tokens: DEFAULT_MAX_TOKENS,
            temperature: None,
        }
    }

    pub fn with_instructions(mut self, instructions: impl Into<String>) -> Self {
        self.instructions = Some(instructions.into());
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    /// Text of the latest user turn
    pub fn prompt(&self) -> Option<&str> {
        self.turns
            .iter()
            .rev()
            .find(|turn| turn.role == Role::User)
            .map(|turn| turn.text.as_str())
    }
}

/// Why generation stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FinishReason {
    /// The model finished on its own
    Stop,
    /// The output budget ran out
    Length,
    /// The provider withheld output
    Filtered,
    Other,
}

impl FinishReason {
    pub fn is_truncated(self) -> bool {
        self == FinishReason::Length
    }

    pub(crate) fn from_openai(reason: &str) -> Self {
        match reason {
            "stop" => FinishReason::Stop,
            "length" => FinishReason::Length,
            "content_filter" => FinishReason::Filtered,
            _ => FinishReason::Other,
        }
    }

    pub(crate) fn from_anthropic(reason: &str) -> Self {
        match reason {
            "end_turn" | "stop_sequence" => FinishReason::Stop,
            "max_tokens" => FinishReason::Length,
            "refusal" => FinishReason::Filtered,
            _ => FinishReason::Other,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenUsage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
}

impl TokenUsage {
    pub fn total(&self) -> u32 {
        self.prompt_tokens + self.completion_tokens
    }
}

/// Raw generated text with its stop reason and token accounting
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletionResponse {
    pub text: String,
    pub finish: FinishReason,
    pub usage: TokenUsage,
}

impl CompletionResponse {
    /// A response that stopped normally, with no usage recorded
    pub fn stopped(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            finish: FinishReason::Stop,
            usage: TokenUsage::default(),
        }
    }
}
