//! FRED observations client
//!
//! Serves the indicator stage: one `series/observations` call per catalogue
//! entry, oldest first. The service allows 120 calls a minute per key.

use crate::error::{IntelError, Result};
use crate::model::{Series, SeriesPoint};
use crate::source::IndicatorSource;
use async_trait::async_trait;
use chrono::NaiveDate;
use governor::clock::DefaultClock;
use governor::state::{InMemoryState, NotKeyed};
use governor::{Quota, RateLimiter};
use reqwest::Client;
use serde::Deserialize;
use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, instrument};

type SharedRateLimiter = Arc<RateLimiter<NotKeyed, InMemoryState, DefaultClock>>;

const FRED_BASE_URL: &str = "https://api.stlouisfed.org/fred";
const DEFAULT_RATE_LIMIT: u32 = 120;

/// FRED series IDs used by the indicator catalogue
pub mod series {
    /// Gross Domestic Product
    pub const GDP: &str = "GDP";
    /// CPI for all urban consumers
    pub const CPI: &str = "CPIAUCSL";
    /// Unemployment Rate
    pub const UNEMPLOYMENT_RATE: &str = "UNRATE";
    /// Effective federal funds rate
    pub const FED_FUNDS_RATE: &str = "FEDFUNDS";
}

#[derive(Debug, Clone, Deserialize)]
struct Observation {
    date: String,
    /// `"."` marks a missing value
    value: String,
}

#[derive(Debug, Deserialize)]
struct ObservationsResponse {
    observations: Vec<Observation>,
}

/// Indicator source backed by FRED
pub struct FredClient {
    client: Client,
    api_key: String,
    base_url: String,
    rate_limiter: SharedRateLimiter,
}

impl FredClient {
    /// Client with the default 120/min limiter
    pub fn new(api_key: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            api_key: api_key.into(),
            base_url: FRED_BASE_URL.to_string(),
            rate_limiter: rate_limiter(DEFAULT_RATE_LIMIT),
        })
    }

    /// Override the API root (e.g. a test server)
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

/// Convert raw observations, dropping missing (".") and unparseable values
fn parse_observations(observations: Vec<Observation>) -> Vec<SeriesPoint> {
    observations
        .into_iter()
        .filter_map(|obs| {
            let date = NaiveDate::parse_from_str(&obs.date, "%Y-%m-%d").ok()?;
            let value = obs.value.trim().parse::<f64>().ok()?;
            value.is_finite().then_some(SeriesPoint { date, value })
        })
        .collect()
}

#[async_trait]
impl IndicatorSource for FredClient {
    #[instrument(skip(self))]
    async fn observations(
        &self,
        series_id: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Series> {
        self.rate_limiter.until_ready().await;

        let start = start.format("%Y-%m-%d").to_string();
        let end = end.format("%Y-%m-%d").to_string();
        let url = format!("{}/series/observations", self.base_url);
        let response = self
            .client
            .get(&url)
            .query(&[
                ("series_id", series_id),
                ("api_key", self.api_key.as_str()),
                ("file_type", "json"),
                ("sort_order", "asc"),
                ("observation_start", start.as_str()),
                ("observation_end", end.as_str()),
            ])
            .send()
            .await
            .map_err(|e| IntelError::ApiError(format!("FRED request failed: {e}")))?;

        if !response.status().is_success() {
            return Err(IntelError::ApiError(format!(
                "FRED API error: {}",
                response.status()
            )));
        }

        let data: ObservationsResponse = response
            .json()
            .await
            .map_err(|e| IntelError::ApiError(format!("Failed to parse FRED response: {e}")))?;

        let raw_count = data.observations.len();
        let points = parse_observations(data.observations);
        debug!(
            "FRED {} returned {} observations ({} usable)",
            series_id,
            raw_count,
            points.len()
        );

        Ok(Series {
            id: series_id.to_string(),
            points,
        })
    }
}
