//! NewsAPI client
//!
//! Searches `GET /v2/everything`. Free developer keys allow 100 requests per
//! day, so the collector caps how many terms it issues.

use crate::error::{IntelError, Result};
use crate::model::RawArticle;
use crate::source::{NewsQuery, NewsSource};
use async_trait::async_trait;
use governor::clock::DefaultClock;
use governor::state::{InMemoryState, NotKeyed};
use governor::{Quota, RateLimiter};
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, instrument};

type SharedRateLimiter = Arc<RateLimiter<NotKeyed, InMemoryState, DefaultClock>>;

const NEWSAPI_BASE_URL: &str = "https://newsapi.org";
const DEFAULT_RATE_LIMIT: u32 = 30;

/// Response envelope; `status` is `"ok"` or `"error"`
#[derive(Debug, Deserialize)]
struct EverythingResponse {
    status: String,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    articles: Vec<RawArticle>,
}

/// NewsAPI client with client-side rate limiting
pub struct NewsApiClient {
    client: Client,
    api_key: String,
    base_url: String,
    rate_limiter: SharedRateLimiter,
}

impl NewsApiClient {
    /// Create a new client
    ///
    /// # Arguments
    /// * `api_key` - NewsAPI key
    /// * `timeout` - Per-request timeout
    pub fn new(api_key: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            api_key: api_key.into(),
            base_url: NEWSAPI_BASE_URL.to_string(),
            rate_limiter: rate_limiter(DEFAULT_RATE_LIMIT),
        })
    }

    /// Point the client at a different host (self-hosted proxy, test server)
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Requests per minute allowed by the local limiter
    pub fn with_rate_limit(mut self, per_minute: u32) -> Self {
        self.rate_limiter = rate_limiter(per_minute);
        self
    }
}

fn rate_limiter(per_minute: u32) -> SharedRateLimiter {
    let quota = Quota::per_minute(NonZeroU32::new(per_minute).unwrap_or(NonZeroU32::MIN));
    Arc::new(RateLimiter::direct(quota))
}

#[async_trait]
impl NewsSource for NewsApiClient {
    #[instrument(skip(self), fields(q = %query.query))]
    async fn fetch(&self, query: &NewsQuery) -> Result<Vec<RawArticle>> {
        self.rate_limiter.until_ready().await;

        let page_size = query.page_size.to_string();
        let url = format!("{}/v2/everything", self.base_url);
        let response = self
            .client
            .get(&url)
            .query(&[
                ("q", query.query.as_str()),
                ("from", query.from.as_str()),
                ("sortBy", "relevancy"),
                ("language", query.language.as_str()),
                ("pageSize", page_size.as_str()),
                ("apiKey", self.api_key.as_str()),
            ])
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(IntelError::RateLimitExceeded {
                provider: "newsapi".to_string(),
            });
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(IntelError::ApiError(format!(
                "NewsAPI error {status}: {body}"
            )));
        }

        let data: EverythingResponse = response
            .json()
            .await
            .map_err(|e| IntelError::ApiError(format!("Failed to parse NewsAPI response: {e}")))?;

        if data.status != "ok" {
            return Err(IntelError::ApiError(format!(
                "NewsAPI returned status '{}': {}",
                data.status,
                data.message.unwrap_or_else(|| "Unknown error".to_string())
            )));
        }

        debug!("NewsAPI returned {} articles", data.articles.len());
        Ok(data.articles)
    }
}
