//! Deduplicating news collector
//!
//! Fans a bounded number of search terms out over every configured
//! [`NewsSource`], merges the results in term-major, source-minor order and
//! keeps the first item seen for each URL.

use crate::config::CollectorConfig;
use crate::model::{Collection, Item};
use crate::source::{NewsQuery, NewsSource};
use chrono::{Days, NaiveDate, Utc};
use tracing::{info, instrument, warn};

/// Collects market news from one or more sources
pub struct NewsCollector {
    sources: Vec<Box<dyn NewsSource>>,
    config: CollectorConfig,
}

impl NewsCollector {
    pub fn new(sources: Vec<Box<dyn NewsSource>>, config: CollectorConfig) -> Self {
        Self { sources, config }
    }

    pub fn config(&self) -> &CollectorConfig {
        &self.config
    }

    /// Collect up to `max_items` unique items published since yesterday
    ///
    /// Never fails: a source error is logged and the remaining fetches go
    /// ahead. If every fetch fails the collection is empty.
    pub async fn collect(&self, terms: &[String], max_items: usize) -> Collection {
        let today = Utc::now().date_naive();
        let from = today
            .checked_sub_days(Days::new(self.config.lookback_days))
            .unwrap_or(today);
        self.collect_since(terms, max_items, from).await
    }

    /// Same as [`NewsCollector::collect`] with an explicit start date
    #[instrument(skip(self, terms), fields(terms = terms.len(), sources = self.sources.len()))]
    pub async fn collect_since(
        &self,
        terms: &[String],
        max_items: usize,
        from: NaiveDate,
    ) -> Collection {
        let mut collection = Collection::new();
        let from = from.format("%Y-%m-%d").to_string();
        let page_size = max_items.min(self.config.page_size_cap);

        for term in terms.iter().take(self.config.max_terms) {
            let query = NewsQuery {
                query: term.clone(),
                from: from.clone(),
                language: self.config.language.clone(),
                page_size,
            };

            info!("Searching news for '{}'", term);
            for (idx, source) in self.sources.iter().enumerate() {
                match source.fetch(&query).await {
                    Ok(articles) => {
                        let fetched = articles.len();
                        let mut accepted = 0;
                        for item in articles.into_iter().map(Item::from) {
                            if collection.push_unique(item) {
                                accepted += 1;
                            }
                        }
                        info!(
                            "Term '{}' source #{}: {} articles, {} new",
                            term, idx, fetched, accepted
                        );
                    }
                    Err(e) => {
                        warn!("Term '{}' source #{} failed: {}", term, idx, e);
                    }
                }
            }
        }

        collection.truncate(max_items);
        info!("Collected {} unique articles", collection.len());
        collection
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::IntelError;
    use crate::model::{RawArticle, RawSource};
    use crate::source::MockNewsSource;
    use mockall::Sequence;

    fn raw(title: &str, url: &str) -> RawArticle {
        RawArticle {
            source: Some(RawSource {
                id: None,
                name: Some("Wire".to_string()),
            }),
            title: Some(title.to_string()),
            url: Some(url.to_string()),
            ..Default::default()
        }
    }

    fn terms(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| (*s).to_string()).collect()
    }

    fn from_date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, 1).unwrap()
    }

    #[tokio::test]
    async fn test_duplicate_urls_across_terms() {
        let mut source = MockNewsSource::new();
        source
            .expect_fetch()
            .withf(|q| q.query == "market")
            .times(1)
            .returning(|_| Ok(vec![raw("one", "https://a")]));
        source
            .expect_fetch()
            .withf(|q| q.query == "economy")
            .times(1)
            .returning(|_| Ok(vec![raw("two", "https://b"), raw("three", "https://b")]));

        let collector = NewsCollector::new(vec![Box::new(source)], CollectorConfig::default());
        let collection = collector
            .collect_since(&terms(&["market", "economy"]), 10, from_date())
            .await;

        let titles: Vec<_> = collection.iter().map(|i| i.title.as_str()).collect();
        assert_eq!(titles, vec!["one", "two"]);
    }

    #[tokio::test]
    async fn test_only_first_three_terms_issued() {
        let mut source = MockNewsSource::new();
        source.expect_fetch().times(3).returning(|_| Ok(vec![]));

        let collector = NewsCollector::new(vec![Box::new(source)], CollectorConfig::default());
        let collection = collector
            .collect_since(&terms(&["a", "b", "c", "d", "e"]), 10, from_date())
            .await;

        assert!(collection.is_empty());
    }

    #[tokio::test]
    async fn test_query_parameters() {
        let mut source = MockNewsSource::new();
        source
            .expect_fetch()
            .withf(|q| q.from == "2025-03-01" && q.language == "en" && q.page_size == 20)
            .times(1)
            .returning(|_| Ok(vec![]));

        let collector = NewsCollector::new(vec![Box::new(source)], CollectorConfig::default());
        collector
            .collect_since(&terms(&["market"]), 50, from_date())
            .await;
    }

    #[tokio::test]
    async fn test_failed_fetch_is_skipped() {
        let mut source = MockNewsSource::new();
        source
            .expect_fetch()
            .withf(|q| q.query == "market")
            .returning(|_| Err(IntelError::ApiError("down".to_string())));
        source
            .expect_fetch()
            .withf(|q| q.query == "economy")
            .returning(|_| Ok(vec![raw("survivor", "https://s")]));

        let collector = NewsCollector::new(vec![Box::new(source)], CollectorConfig::default());
        let collection = collector
            .collect_since(&terms(&["market", "economy"]), 10, from_date())
            .await;

        assert_eq!(collection.len(), 1);
        assert_eq!(collection.items()[0].title, "survivor");
    }

    #[tokio::test]
    async fn test_all_sources_failing_yields_empty() {
        let mut source = MockNewsSource::new();
        source
            .expect_fetch()
            .returning(|_| Err(IntelError::ApiError("down".to_string())));

        let collector = NewsCollector::new(vec![Box::new(source)], CollectorConfig::default());
        let collection = collector
            .collect_since(&terms(&["market", "economy"]), 10, from_date())
            .await;
        assert!(collection.is_empty());
    }

    #[tokio::test]
    async fn test_term_major_source_minor_order_and_truncation() {
        let mut seq = Sequence::new();
        let mut first = MockNewsSource::new();
        let mut second = MockNewsSource::new();

        first
            .expect_fetch()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(vec![raw("t1-s1", "https://1")]));
        second
            .expect_fetch()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(vec![raw("t1-s2", "https://2")]));
        first
            .expect_fetch()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(vec![raw("t2-s1", "https://3")]));
        second
            .expect_fetch()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(vec![raw("t2-s2", "https://4")]));

        let collector = NewsCollector::new(
            vec![Box::new(first), Box::new(second)],
            CollectorConfig::default(),
        );
        let collection = collector
            .collect_since(&terms(&["x", "y"]), 3, from_date())
            .await;

        let titles: Vec<_> = collection.iter().map(|i| i.title.as_str()).collect();
        assert_eq!(titles, vec!["t1-s1", "t1-s2", "t2-s1"]);
    }
}
