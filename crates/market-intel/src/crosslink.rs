//! Links hot stocks to the news that mentions them

use crate::anomaly::AnomalySignal;
use crate::model::Item;
use serde::{Deserialize, Serialize};

/// A narrated item referenced from a hot stock
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkedItem {
    pub title: String,
    pub narrative: String,
    pub url: String,
}

/// An anomaly signal together with its related news
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HotStock {
    pub signal: AnomalySignal,
    pub related: Vec<LinkedItem>,
}

/// Case-sensitive title matcher
///
/// # Examples
///
/// ```
/// use market_intel::crosslink::CrossLinker;
/// use market_intel::model::Item;
///
/// let items = vec![Item {
///     title: "Toyota (7203) reports record profit".into(),
///     ..Default::default()
/// }];
///
/// assert_eq!(CrossLinker::default().link("7203.T", &items).len(), 1);
/// assert!(CrossLinker::new(false).link("7203.T", &items).is_empty());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CrossLinker {
    match_bare_ticker: bool,
}

impl Default for CrossLinker {
    fn default() -> Self {
        Self::new(true)
    }
}

impl CrossLinker {
    /// `match_bare_ticker` also matches the symbol without its exchange
    /// suffix (`7203.T` -> `7203`)
    pub fn new(match_bare_ticker: bool) -> Self {
        Self { match_bare_ticker }
    }

    /// Items whose title mentions `symbol`, in input order
    pub fn link(&self, symbol: &str, items: &[Item]) -> Vec<LinkedItem> {
        let bare = self
            .match_bare_ticker
            .then(|| bare_ticker(symbol))
            .flatten();

        items
            .iter()
            .filter(|item| {
                (!symbol.is_empty() && item.title.contains(symbol))
                    || bare.is_some_and(|b| item.title.contains(b))
            })
            .map(|item| LinkedItem {
                title: item.title.clone(),
                narrative: item.narrative.clone().unwrap_or_default(),
                url: item.url.clone(),
            })
            .collect()
    }

    /// Pair every signal with its related items
    pub fn link_all(&self, signals: Vec<AnomalySignal>, items: &[Item]) -> Vec<HotStock> {
        signals
            .into_iter()
            .map(|signal| {
                let related = self.link(&signal.symbol, items);
                HotStock { signal, related }
            })
            .collect()
    }
}

/// Symbol with the text after its last `.` removed; `None` if that is empty
/// or the symbol has no `.`
fn bare_ticker(symbol: &str) -> Option<&str> {
    symbol
        .rsplit_once('.')
        .map(|(bare, _)| bare)
        .filter(|bare| !bare.is_empty())
}
