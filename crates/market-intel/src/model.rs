//! Core data model shared by the pipeline stages

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// A news article as the pipeline sees it
///
/// Identity is the source URL. Every text field is normalised to `""` when
/// the provider omits it; `narrative` is filled in by the narrator.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    pub title: String,
    pub source: String,
    pub published_at: String,
    pub description: String,
    pub content: String,
    pub author: String,
    pub url: String,
    pub narrative: Option<String>,
}

impl Item {
    /// Text submitted for narration: content, falling back to description
    pub fn body(&self) -> Option<&str> {
        [self.content.as_str(), self.description.as_str()]
            .into_iter()
            .find(|s| !s.trim().is_empty())
    }
}

/// Article payload as returned by a news provider
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawArticle {
    #[serde(default)]
    pub source: Option<RawSource>,
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub published_at: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
}

/// Publisher reference inside a [`RawArticle`]
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawSource {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
}

impl From<RawArticle> for Item {
    fn from(raw: RawArticle) -> Self {
        Self {
            title: raw.title.unwrap_or_default(),
            source: raw.source.and_then(|s| s.name).unwrap_or_default(),
            published_at: raw.published_at.unwrap_or_default(),
            description: raw.description.unwrap_or_default(),
            content: raw.content.unwrap_or_default(),
            author: raw.author.unwrap_or_default(),
            url: raw.url.unwrap_or_default(),
            narrative: None,
        }
    }
}

/// Ordered, URL-unique sequence of items
///
/// # Examples
///
/// ```
/// use market_intel::model::{Collection, Item};
///
/// let mut collection = Collection::new();
/// let item = Item { url: "https://example.com/a".into(), ..Default::default() };
///
/// assert!(collection.push_unique(item.clone()));
/// assert!(!collection.push_unique(item));
/// assert_eq!(collection.len(), 1);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Collection {
    items: Vec<Item>,
}

impl Collection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `item` unless an earlier item has the same URL
    ///
    /// Returns whether the item was accepted.
    pub fn push_unique(&mut self, item: Item) -> bool {
        if self.contains_url(&item.url) {
            return false;
        }
        self.items.push(item);
        true
    }

    pub fn contains_url(&self, url: &str) -> bool {
        self.items.iter().any(|i| i.url == url)
    }

    /// Keep only the first `max` items
    pub fn truncate(&mut self, max: usize) {
        self.items.truncate(max);
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn items(&self) -> &[Item] {
        &self.items
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Item> {
        self.items.iter()
    }

    pub fn into_items(self) -> Vec<Item> {
        self.items
    }
}

impl FromIterator<Item> for Collection {
    fn from_iter<I: IntoIterator<Item = Item>>(iter: I) -> Self {
        let mut collection = Collection::new();
        for item in iter {
            collection.push_unique(item);
        }
        collection
    }
}

impl IntoIterator for Collection {
    type Item = Item;
    type IntoIter = std::vec::IntoIter<Item>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}

impl<'a> IntoIterator for &'a Collection {
    type Item = &'a Item;
    type IntoIter = std::slice::Iter<'a, Item>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

/// One daily OHLCV bar
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceBar {
    pub timestamp: DateTime<Utc>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: u64,
}

/// Price history for a single symbol, oldest bar first
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceSeries {
    pub symbol: String,
    pub bars: Vec<PriceBar>,
}

impl PriceSeries {
    pub fn new(symbol: impl Into<String>, bars: Vec<PriceBar>) -> Self {
        Self {
            symbol: symbol.into(),
            bars,
        }
    }

    /// Latest close and its fractional change against the previous bar
    pub fn last_close_change(&self) -> Option<(f64, f64)> {
        let [.., prev, last] = self.bars.as_slice() else {
            return None;
        };
        if prev.close <= 0.0 {
            return None;
        }
        Some((last.close, (last.close - prev.close) / prev.close))
    }
}

/// A dated observation of a macro indicator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeriesPoint {
    pub date: NaiveDate,
    pub value: f64,
}

/// Time-ordered observations of one indicator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Series {
    pub id: String,
    pub points: Vec<SeriesPoint>,
}

impl Series {
    pub fn latest(&self) -> Option<&SeriesPoint> {
        self.points.last()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}
