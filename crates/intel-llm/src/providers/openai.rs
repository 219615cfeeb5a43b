//! OpenAI-compatible chat completions
//!
//! Works against api.openai.com and any server that mirrors its
//! `/chat/completions` endpoint (vLLM, LM Studio, Azure deployments); point
//! [`OpenAIConfig::with_api_base`] at it.
//!
//! ```no_run
//! use intel_llm::{CompletionRequest, LLMProvider};
//! use intel_llm::providers::{OpenAIConfig, OpenAIProvider};
//! use std::time::Duration;
//!
//! # async fn run() -> intel_llm::Result<()> {
//! let provider = OpenAIProvider::with_config(
//!     OpenAIConfig::new("sk-...").with_timeout(Duration::from_secs(30)),
//! )?;
//!
//! let request = CompletionRequest::new("gpt-4o-mini", "Summarize today's session.")
//!     .with_instructions("You are a markets editor.")
//!     .with_max_tokens(300);
//!
//! println!("{}", provider.generate(request).await?);
//! # Ok(())
//! # }
//! ```

use crate::{
    CompletionRequest, CompletionResponse, FinishReason, LLMError, LLMProvider, Result, Role,
    TokenUsage,
};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, instrument};

const DEFAULT_API_BASE: &str = "https://api.openai.com/v1";
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// Connection settings; the key is passed in, never read from the environment
#[derive(Debug, Clone)]
pub struct OpenAIConfig {
    pub api_key: String,
    pub api_base: String,
    pub timeout: Duration,
}

impl OpenAIConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            api_base: DEFAULT_API_BASE.to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Use another OpenAI-compatible server; a trailing `/` is ignored
    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

pub struct OpenAIProvider {
    client: Client,
    config: OpenAIConfig,
}

impl OpenAIProvider {
    pub fn with_config(config: OpenAIConfig) -> Result<Self> {
        if config.api_base.is_empty() {
            return Err(LLMError::Configuration(
                "OpenAI api_base must not be empty".to_string(),
            ));
        }
        if config.api_key.trim().is_empty() {
            return Err(LLMError::Configuration(
                "OpenAI api_key must not be empty".to_string(),
            ));
        }

        let client = Client::builder().timeout(config.timeout).build()?;
        Ok(Self { client, config })
    }

    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        Self::with_config(OpenAIConfig::new(api_key))
    }

    pub fn config(&self) -> &OpenAIConfig {
        &self.config
    }
}

#[async_trait]
impl LLMProvider for OpenAIProvider {
    #[instrument(skip(self, request), fields(model = %request.model, api_base = %self.config.api_base))]
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse> {
        let body = ChatRequest::from_request(&request);

        let response = self
            .client
            .post(format!("{}/chat/completions", self.config.api_base))
            .bearer_auth(&self.config.api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;
        if !status.is_success() {
            return Err(LLMError::from_status(
                self.name(),
                &request.model,
                status.as_u16(),
                text,
            ));
        }

        let parsed: ChatResponse = serde_json::from_str(&text)?;
        let usage = parsed.usage.unwrap_or_default();
        let choice = parsed
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| LLMError::EmptyCompletion(self.name().to_string()))?;

        debug!(
            "finish_reason={} prompt_tokens={} completion_tokens={}",
            choice.finish_reason.as_deref().unwrap_or("none"),
            usage.prompt_tokens,
            usage.completion_tokens
        );

        Ok(CompletionResponse {
            text: choice.message.content.unwrap_or_default(),
            finish: choice
                .finish_reason
                .as_deref()
                .map_or(FinishReason::Other, FinishReason::from_openai),
            usage: TokenUsage {
                prompt_tokens: usage.prompt_tokens,
                completion_tokens: usage.completion_tokens,
            },
        })
    }

    fn name(&self) -> &'static str {
        "openai"
    }
}

// Wire format

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    max_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

impl<'a> ChatRequest<'a> {
    /// Instructions travel as a leading `system` message
    fn from_request(request: &'a CompletionRequest) -> Self {
        let system = request.instructions.as_deref().map(|content| ChatMessage {
            role: Role::System.as_str(),
            content,
        });
        let turns = request.turns.iter().map(|turn| ChatMessage {
            role: turn.role.as_str(),
            content: &turn.text,
        });

        Self {
            model: &request.model,
            messages: system.into_iter().chain(turns).collect(),
            max_tokens: request.max_tokens,
            temperature: request.temperature,
        }
    }
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
    usage: Option<ChatUsage>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    content: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct ChatUsage {
    prompt_tokens: u32,
    completion_tokens: u32,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn request() -> CompletionRequest {
        CompletionRequest::new("gpt-4o-mini", "Summarize")
            .with_instructions("You are a markets editor.")
            .with_max_tokens(300)
            .with_temperature(0.5)
    }

    fn provider(server: &MockServer) -> OpenAIProvider {
        OpenAIProvider::with_config(OpenAIConfig::new("test-key").with_api_base(server.uri()))
            .unwrap()
    }

    #[test]
    fn test_config_defaults_and_validation() {
        let provider = OpenAIProvider::new("test-key").unwrap();
        assert_eq!(provider.name(), "openai");
        assert_eq!(provider.config().api_base, "https://api.openai.com/v1");
        assert_eq!(provider.config().timeout, Duration::from_secs(60));

        let trimmed = OpenAIConfig::new("k").with_api_base("http://localhost:1234/v1/");
        assert_eq!(trimmed.api_base, "http://localhost:1234/v1");

        assert!(matches!(
            OpenAIProvider::with_config(OpenAIConfig::new("k").with_api_base("")),
            Err(LLMError::Configuration(_))
        ));
        assert!(matches!(
            OpenAIProvider::new("  "),
            Err(LLMError::Configuration(_))
        ));
    }

    #[test]
    fn test_instructions_become_leading_system_message() {
        let request = request();
        let body = serde_json::to_value(ChatRequest::from_request(&request)).unwrap();
        assert_eq!(
            body,
            json!({
                "model": "gpt-4o-mini",
                "messages": [
                    {"role": "system", "content": "You are a markets editor."},
                    {"role": "user", "content": "Summarize"}
                ],
                "max_tokens": 300,
                "temperature": 0.5
            })
        );
    }

    #[tokio::test]
    async fn test_complete_against_mock_server() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .and(header("Authorization", "Bearer test-key"))
            .and(body_json(json!({
                "model": "gpt-4o-mini",
                "messages": [
                    {"role": "system", "content": "You are a markets editor."},
                    {"role": "user", "content": "Summarize"}
                ],
                "max_tokens": 300,
                "temperature": 0.5
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "choices": [{
                    "message": {"role": "assistant", "content": "  Stocks edged higher.  "},
                    "finish_reason": "stop"
                }],
                "usage": {"prompt_tokens": 20, "completion_tokens": 5}
            })))
            .expect(1)
            .mount(&server)
            .await;

        let response = provider(&server).complete(request()).await.unwrap();
        assert_eq!(response.text, "  Stocks edged higher.  ");
        assert_eq!(response.finish, FinishReason::Stop);
        assert_eq!(response.usage.total(), 25);
    }

    #[tokio::test]
    async fn test_429_maps_to_rate_limit() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(429).set_body_string("Rate limit reached"))
            .mount(&server)
            .await;

        let err = provider(&server).complete(request()).await.unwrap_err();
        assert!(err.is_rate_limited());
    }

    #[tokio::test]
    async fn test_null_content_is_an_empty_completion() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "choices": [{"message": {"role": "assistant", "content": null}, "finish_reason": "stop"}]
            })))
            .mount(&server)
            .await;

        let err = provider(&server).generate(request()).await.unwrap_err();
        assert!(matches!(err, LLMError::EmptyCompletion(_)));
    }

    #[tokio::test]
    async fn test_garbage_body_is_a_decode_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>gateway</html>"))
            .mount(&server)
            .await;

        let err = provider(&server).complete(request()).await.unwrap_err();
        assert!(matches!(err, LLMError::Decode(_)));
    }
}
