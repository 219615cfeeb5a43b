//! Data source abstractions
//!
//! Each external feed the pipeline reads from sits behind a small async trait
//! so stages can be driven by mocks in tests.

use crate::error::Result;
use crate::model::{PriceBar, RawArticle, Series};
use async_trait::async_trait;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One search request against a news provider
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewsQuery {
    /// Free-text search term
    pub query: String,
    /// Earliest publication date (YYYY-MM-DD)
    pub from: String,
    /// ISO 639-1 language filter
    pub language: String,
    /// Requested page size
    pub page_size: usize,
}

/// A provider of news articles
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait NewsSource: Send + Sync {
    /// Fetch articles matching `query`
    async fn fetch(&self, query: &NewsQuery) -> Result<Vec<RawArticle>>;
}

/// A provider of daily price history
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PriceSource: Send + Sync {
    /// Daily bars for `symbol` covering the last `days` days, oldest first
    async fn history(&self, symbol: &str, days: u32) -> Result<Vec<PriceBar>>;
}

/// A provider of macro-economic time series
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait IndicatorSource: Send + Sync {
    /// Observations of `series_id` between `start` and `end` inclusive
    async fn observations(&self, series_id: &str, start: NaiveDate, end: NaiveDate)
    -> Result<Series>;
}
