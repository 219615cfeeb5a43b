//! Rate-limited narrator
//!
//! Turns collected items into short narratives, one backend call at a time.
//! A throttle signal from the backend triggers a single retry after a fixed
//! cool-down; any other failure becomes a placeholder so the batch always
//! completes.

use crate::config::NarratorConfig;
use crate::error::Result;
use crate::indicators::IndicatorReading;
use crate::model::{Collection, Item};
use crate::prompts::{PromptPair, PromptSet};
use intel_llm::{CompletionRequest, LLMProvider};
use serde_json::json;
use std::sync::Arc;
use tracing::{debug, error, info, instrument, warn};

/// Aggregate text when there is nothing to summarize
pub const NOTHING_NOTABLE: &str = "There was no notable market news today.";

/// Aggregate text when the summary call fails
pub const NO_SIGNIFICANT_ITEMS: &str =
    "No significant market items could be summarized today.";

/// Outlook text when the outlook call fails
pub const OUTLOOK_UNAVAILABLE: &str = "The economic outlook could not be generated today.";

/// Outcome of narrating one item
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Narration {
    /// Text produced by the backend
    Generated(String),
    /// Stand-in text after a backend failure
    Placeholder(String),
}

impl Narration {
    pub fn placeholder_for(title: &str) -> Self {
        Narration::Placeholder(format!("Summary unavailable: {title}"))
    }

    pub fn text(&self) -> &str {
        match self {
            Narration::Generated(text) | Narration::Placeholder(text) => text,
        }
    }

    pub fn into_text(self) -> String {
        match self {
            Narration::Generated(text) | Narration::Placeholder(text) => text,
        }
    }

    pub fn is_placeholder(&self) -> bool {
        matches!(self, Narration::Placeholder(_))
    }
}

/// Narrated collection plus per-outcome counts
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NarrationReport {
    pub collection: Collection,
    pub generated: usize,
    pub placeholders: usize,
    /// Items dropped for having no body
    pub skipped: usize,
}

impl NarrationReport {
    /// Fold one item outcome into the report
    fn record(&mut self, mut item: Item, narration: Narration) {
        if narration.is_placeholder() {
            self.placeholders += 1;
        } else {
            self.generated += 1;
        }
        item.narrative = Some(narration.into_text());
        self.collection.push_unique(item);
    }
}

/// Summarizes items, days and outlooks through an [`LLMProvider`]
pub struct Narrator {
    provider: Arc<dyn LLMProvider>,
    prompts: PromptSet,
    config: NarratorConfig,
}

impl Narrator {
    pub fn new(provider: Arc<dyn LLMProvider>, config: NarratorConfig) -> Result<Self> {
        Ok(Self {
            provider,
            prompts: PromptSet::load()?,
            config,
        })
    }

    pub fn config(&self) -> &NarratorConfig {
        &self.config
    }

    /// Narrate a single item; never fails
    #[instrument(skip(self, item), fields(title = %item.title))]
    pub async fn summarize_item(&self, item: &Item) -> Narration {
        let body: String = item
            .body()
            .unwrap_or_default()
            .chars()
            .take(self.config.body_char_limit)
            .collect();

        let request = match self.request(
            &self.prompts.item,
            &json!({ "title": item.title, "body": body }),
            self.config.item_max_tokens,
            self.config.temperature,
        ) {
            Ok(request) => request,
            Err(e) => {
                error!("Failed to build summary prompt: {}", e);
                return Narration::placeholder_for(&item.title);
            }
        };

        match self.generate_with_retry(request).await {
            Ok(text) => {
                debug!("Summary complete: {} chars", text.chars().count());
                Narration::Generated(text)
            }
            Err(e) => {
                error!("Summary failed for '{}': {}", item.title, e);
                Narration::placeholder_for(&item.title)
            }
        }
    }

    /// Narrate every item with a body, pausing between backend calls
    ///
    /// Items with neither content nor description are dropped with a warning.
    #[instrument(skip(self, collection), fields(items = collection.len()))]
    pub async fn summarize_all(&self, collection: Collection) -> NarrationReport {
        let mut report = NarrationReport::default();
        let mut called = false;

        for (idx, item) in collection.into_iter().enumerate() {
            if item.body().is_none() {
                warn!("Item {} has no content, skipping: {}", idx + 1, item.title);
                report.skipped += 1;
                continue;
            }

            if called {
                tokio::time::sleep(self.config.pacing).await;
            }
            let narration = self.summarize_item(&item).await;
            called = true;

            report.record(item, narration);
        }

        info!(
            "Narrated {} items ({} placeholders, {} skipped)",
            report.collection.len(),
            report.placeholders,
            report.skipped
        );
        report
    }

    /// Summary of the day built from the leading narrated items
    #[instrument(skip(self, collection), fields(items = collection.len()))]
    pub async fn aggregate(&self, collection: &Collection) -> String {
        if collection.is_empty() {
            return NOTHING_NOTABLE.to_string();
        }

        let articles: Vec<_> = collection
            .iter()
            .take(self.config.aggregate_item_limit)
            .map(|item| {
                json!({
                    "title": item.title,
                    "narrative": item.narrative.as_deref().unwrap_or("No summary"),
                })
            })
            .collect();

        let result = match self.request(
            &self.prompts.daily_summary,
            &json!({ "articles": articles }),
            self.config.aggregate_max_tokens,
            self.config.temperature,
        ) {
            Ok(request) => self.generate_with_retry(request).await.map_err(Into::into),
            Err(e) => Err(e),
        };

        result.unwrap_or_else(|e| {
            error!("Daily summary failed: {}", e);
            NO_SIGNIFICANT_ITEMS.to_string()
        })
    }

    /// Outlook narrative from the news summary and latest indicators
    #[instrument(skip(self, news_summary, indicators), fields(indicators = indicators.len()))]
    pub async fn outlook(&self, news_summary: &str, indicators: &[IndicatorReading]) -> String {
        let indicators: Vec<_> = indicators
            .iter()
            .map(|r| {
                json!({
                    "name": r.name,
                    "value": format!("{:.2}", r.value),
                    "date": r.date.format("%Y-%m-%d").to_string(),
                })
            })
            .collect();

        let result = match self.request(
            &self.prompts.outlook,
            &json!({ "news_summary": news_summary, "indicators": indicators }),
            self.config.outlook_max_tokens,
            self.config.outlook_temperature,
        ) {
            Ok(request) => self.generate_with_retry(request).await.map_err(Into::into),
            Err(e) => Err(e),
        };

        result.unwrap_or_else(|e| {
            error!("Outlook generation failed: {}", e);
            OUTLOOK_UNAVAILABLE.to_string()
        })
    }

    fn request(
        &self,
        pair: &PromptPair,
        vars: &serde_json::Value,
        max_tokens: u32,
        temperature: f32,
    ) -> Result<CompletionRequest> {
        let (system, user) = pair.render(self.config.language, vars)?;
        Ok(CompletionRequest::new(self.config.model.clone(), user)
            .with_instructions(system)
            .with_max_tokens(max_tokens)
            .with_temperature(temperature))
    }

    /// Call the backend, retrying exactly once after a throttle signal
    async fn generate_with_retry(&self, request: CompletionRequest) -> intel_llm::Result<String> {
        let mut retried = false;
        loop {
            match self.provider.generate(request.clone()).await {
                Err(e) if e.is_rate_limited() && !retried => {
                    warn!(
                        "{} rate limited, retrying in {:?}",
                        self.provider.name(),
                        self.config.cooldown
                    );
                    tokio::time::sleep(self.config.cooldown).await;
                    retried = true;
                }
                outcome => return outcome,
            }
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use async_trait::async_trait;
    use intel_llm::{CompletionResponse, LLMError};
    use std::collections::VecDeque;
    use std::sync::Mutex;
    use std::time::Duration;
    use tokio::time::Instant;

    /// Provider that replays a fixed script of outcomes
    pub(crate) struct ScriptedProvider {
        script: Mutex<VecDeque<intel_llm::Result<String>>>,
        requests: Mutex<Vec<CompletionRequest>>,
    }

    impl ScriptedProvider {
        pub(crate) fn new(script: Vec<intel_llm::Result<String>>) -> Self {
            Self {
                script: Mutex::new(script.into()),
                requests: Mutex::new(Vec::new()),
            }
        }

        pub(crate) fn calls(&self) -> usize {
            self.requests.lock().unwrap().len()
        }

        pub(crate) fn requests(&self) -> Vec<CompletionRequest> {
            self.requests.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl LLMProvider for ScriptedProvider {
        async fn complete(&self, request: CompletionRequest) -> intel_llm::Result<CompletionResponse> {
            self.requests.lock().unwrap().push(request);
            let next = self
                .script
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Err(LLMError::Configuration("script exhausted".to_string())));

            next.map(CompletionResponse::stopped)
        }

        fn name(&self) -> &str {
            "scripted"
        }
    }

    pub(crate) fn throttled() -> intel_llm::Result<String> {
        Err(LLMError::RateLimitExceeded("429".to_string()))
    }

    fn rejected(body: &str) -> LLMError {
        LLMError::Rejected {
            status: 500,
            body: body.to_string(),
        }
    }

    fn narrator(provider: Arc<ScriptedProvider>) -> Narrator {
        Narrator::new(provider, NarratorConfig::default()).unwrap()
    }

    fn item(title: &str, url: &str, content: &str) -> Item {
        Item {
            title: title.to_string(),
            url: url.to_string(),
            content: content.to_string(),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_summarize_item_request_shape() {
        let provider = Arc::new(ScriptedProvider::new(vec![Ok("Yen weakens.".to_string())]));
        let narrator = narrator(provider.clone());

        let long_body = "x".repeat(5000);
        let narration = narrator
            .summarize_item(&item("Yen slides", "u", &long_body))
            .await;
        assert_eq!(narration, Narration::Generated("Yen weakens.".to_string()));

        let requests = provider.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].max_tokens, 300);
        assert_eq!(requests[0].temperature, Some(0.3));
        assert_eq!(requests[0].model, "gpt-4o-mini");

        let prompt = requests[0].prompt().unwrap();
        assert!(prompt.contains(&"x".repeat(3000)));
        assert!(!prompt.contains(&"x".repeat(3001)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_throttle_once_then_success() {
        let provider = Arc::new(ScriptedProvider::new(vec![
            throttled(),
            Ok("Recovered.".to_string()),
        ]));
        let narrator = narrator(provider.clone());

        let started = Instant::now();
        let narration = narrator.summarize_item(&item("T", "u", "body")).await;
        let elapsed = started.elapsed();

        assert_eq!(narration.text(), "Recovered.");
        assert_eq!(provider.calls(), 2);
        assert!(elapsed >= Duration::from_secs(60));
        assert!(elapsed < Duration::from_secs(61));
    }

    #[tokio::test(start_paused = true)]
    async fn test_always_throttled_gives_placeholder_after_two_calls() {
        let provider = Arc::new(ScriptedProvider::new(vec![
            throttled(),
            throttled(),
            Ok("never reached".to_string()),
        ]));
        let narrator = narrator(provider.clone());

        let started = Instant::now();
        let narration = narrator
            .summarize_item(&item("Oil jumps", "u", "body"))
            .await;
        let elapsed = started.elapsed();

        assert_eq!(provider.calls(), 2);
        assert!(elapsed >= Duration::from_secs(60));
        assert!(elapsed < Duration::from_secs(120));
        assert!(narration.is_placeholder());
        assert!(narration.text().contains("Oil jumps"));
    }

    #[tokio::test]
    async fn test_other_failure_is_not_retried() {
        let provider = Arc::new(ScriptedProvider::new(vec![
            Err(LLMError::Unauthorized("scripted".to_string())),
            Ok("never reached".to_string()),
        ]));
        let narrator = narrator(provider.clone());

        let narration = narrator.summarize_item(&item("T", "u", "body")).await;
        assert_eq!(provider.calls(), 1);
        assert_eq!(narration, Narration::placeholder_for("T"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_summarize_all_paces_and_folds() {
        let provider = Arc::new(ScriptedProvider::new(vec![
            Ok("first".to_string()),
            Err(rejected("boom")),
            Ok("third".to_string()),
        ]));
        let narrator = narrator(provider.clone());

        let mut no_body = item("Empty", "u-empty", "");
        no_body.description = "  ".to_string();
        let mut described = item("Described", "u3", "");
        described.description = "Only a description".to_string();

        let collection: Collection = vec![
            item("One", "u1", "body one"),
            no_body,
            item("Two", "u2", "body two"),
            described,
        ]
        .into_iter()
        .collect();

        let started = Instant::now();
        let report = narrator.summarize_all(collection).await;
        let elapsed = started.elapsed();

        // three calls, two pauses
        assert_eq!(provider.calls(), 3);
        assert!(elapsed >= Duration::from_secs(2));
        assert!(elapsed < Duration::from_secs(3));

        assert_eq!(report.generated, 2);
        assert_eq!(report.placeholders, 1);
        assert_eq!(report.skipped, 1);

        let narratives: Vec<_> = report
            .collection
            .iter()
            .map(|i| i.narrative.clone().unwrap())
            .collect();
        assert_eq!(
            narratives,
            vec![
                "first".to_string(),
                "Summary unavailable: Two".to_string(),
                "third".to_string()
            ]
        );
    }

    #[tokio::test]
    async fn test_aggregate_empty_makes_no_call() {
        let provider = Arc::new(ScriptedProvider::new(vec![]));
        let narrator = narrator(provider.clone());

        let text = narrator.aggregate(&Collection::new()).await;
        assert_eq!(text, NOTHING_NOTABLE);
        assert_eq!(provider.calls(), 0);
    }

    #[tokio::test]
    async fn test_aggregate_uses_first_five_items() {
        let provider = Arc::new(ScriptedProvider::new(vec![Ok("Markets mixed.".to_string())]));
        let narrator = narrator(provider.clone());

        let collection: Collection = (1..=7)
            .map(|n| {
                let mut it = item(&format!("Headline {n}"), &format!("u{n}"), "b");
                it.narrative = Some(format!("narrative {n}"));
                it
            })
            .collect();

        let text = narrator.aggregate(&collection).await;
        assert_eq!(text, "Markets mixed.");

        let requests = provider.requests();
        assert_eq!(requests[0].max_tokens, 500);
        let prompt = requests[0].prompt().unwrap();
        assert!(prompt.contains("Headline 5"));
        assert!(!prompt.contains("Headline 6"));
    }

    #[tokio::test]
    async fn test_aggregate_failure_falls_back() {
        let provider = Arc::new(ScriptedProvider::new(vec![Err(rejected("down"))]));
        let narrator = narrator(provider.clone());

        let collection: Collection = vec![item("A", "u", "b")].into_iter().collect();
        assert_eq!(narrator.aggregate(&collection).await, NO_SIGNIFICANT_ITEMS);
    }

    #[tokio::test]
    async fn test_outlook() {
        let provider = Arc::new(ScriptedProvider::new(vec![
            Ok("Growth slows.".to_string()),
            Err(rejected("down")),
        ]));
        let narrator = narrator(provider.clone());

        let readings = vec![IndicatorReading {
            key: "us_cpi".to_string(),
            name: "US Consumer Price Index".to_string(),
            series_id: "CPIAUCSL".to_string(),
            value: 314.176,
            date: chrono::NaiveDate::from_ymd_opt(2024, 12, 1).unwrap(),
        }];

        assert_eq!(narrator.outlook("Calm day.", &readings).await, "Growth slows.");
        let request = &provider.requests()[0];
        assert_eq!(request.max_tokens, 600);
        assert_eq!(request.temperature, Some(0.4));
        let prompt = request.prompt().unwrap();
        assert!(prompt.contains("US Consumer Price Index: 314.18 (2024-12-01)"));

        assert_eq!(narrator.outlook("Calm day.", &readings).await, OUTLOOK_UNAVAILABLE);
    }
}
