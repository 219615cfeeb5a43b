//! Daily price bars from Yahoo Finance

use crate::error::{IntelError, Result};
use crate::model::PriceBar;
use crate::source::PriceSource;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::time::Duration;
use tracing::{debug, instrument};
use yahoo_finance_api as yahoo;

/// Price source for hot-stock detection and index snapshots
///
/// No API key is required. Japanese listings use the `.T` suffix
/// (e.g. `7203.T`), indices use a caret (`^N225`).
pub struct YahooFinanceClient {
    provider: yahoo::YahooConnector,
    timeout: Duration,
}

impl YahooFinanceClient {
    /// `timeout` bounds every quote request; an expired request is an
    /// ordinary fetch failure
    pub fn new(timeout: Duration) -> Result<Self> {
        let provider = yahoo::YahooConnector::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| IntelError::YahooFinanceError(e.to_string()))?;
        Ok(Self { provider, timeout })
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

#[async_trait]
impl PriceSource for YahooFinanceClient {
    #[instrument(skip(self))]
    async fn history(&self, symbol: &str, days: u32) -> Result<Vec<PriceBar>> {
        let response = self
            .provider
            .get_quote_range(symbol, "1d", &format!("{days}d"))
            .await
            .map_err(|e| IntelError::YahooFinanceError(e.to_string()))?;

        let quotes = response
            .quotes()
            .map_err(|e| IntelError::YahooFinanceError(e.to_string()))?;

        debug!("Yahoo returned {} bars for {}", quotes.len(), symbol);

        Ok(quotes
            .iter()
            .map(|q| PriceBar {
                timestamp: DateTime::from_timestamp(q.timestamp as i64, 0)
                    .unwrap_or_else(Utc::now),
                open: q.open,
                high: q.high,
                low: q.low,
                close: q.close,
                volume: q.volume,
            })
            .collect())
    }
}
