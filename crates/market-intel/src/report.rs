//! Report composition
//!
//! A [`Report`] is a fixed sequence of sections rendered to plain text. The
//! composer is total: absent fields fall back to placeholder text and empty
//! inputs still produce the header and disclaimer.

use crate::crosslink::HotStock;
use crate::indicators::{IndicatorReading, MarketIndexSnapshot};
use crate::model::Item;
use chrono::NaiveDate;
use comfy_table::{Table, presets::ASCII_FULL};
use serde::Serialize;
use std::fmt;

pub const DISCLAIMER: &str = "Disclaimer: This report is generated automatically for \
informational purposes only and does not constitute investment advice.";

pub const OUTLOOK_NOTICE: &str = "Note: This outlook was generated automatically and must be \
reviewed by a person before it is relied upon.";

pub const NO_ANOMALIES: &str = "No unusual activity detected.";

const UNKNOWN: &str = "Unknown";
const NO_SUMMARY: &str = "No summary";
const NO_URL: &str = "No URL";

/// Section identifiers, in render order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub enum SectionKind {
    Header,
    Summary,
    Details,
    Indicators,
    Outlook,
    Anomalies,
    Disclaimer,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Section {
    pub kind: SectionKind,
    pub body: String,
}

/// A composed report; immutable once built
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Report {
    date: NaiveDate,
    sections: Vec<Section>,
}

impl Report {
    pub fn date(&self) -> NaiveDate {
        self.date
    }

    pub fn sections(&self) -> &[Section] {
        &self.sections
    }

    pub fn section(&self, kind: SectionKind) -> Option<&str> {
        self.sections
            .iter()
            .find(|s| s.kind == kind)
            .map(|s| s.body.as_str())
    }

    /// Delivery subject line
    pub fn subject(&self) -> String {
        format!("Market Intelligence Report - {}", self.date.format("%Y-%m-%d"))
    }

    /// Plain-text rendering
    pub fn render(&self) -> String {
        self.sections
            .iter()
            .map(|s| s.body.as_str())
            .collect::<Vec<_>>()
            .join("\n\n")
    }
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}

/// Everything a report may contain
///
/// `None` / empty leaves the corresponding optional section out; the anomaly
/// section is present whenever `hot_stocks` is `Some`, even if empty.
#[derive(Debug, Clone, Copy, Default)]
pub struct ReportContent<'a> {
    pub summary: Option<&'a str>,
    pub items: &'a [Item],
    pub indicators: &'a [IndicatorReading],
    pub indices: &'a [MarketIndexSnapshot],
    pub outlook: Option<&'a str>,
    pub hot_stocks: Option<&'a [HotStock]>,
}

/// Builds [`Report`]s for a given date
#[derive(Debug, Clone, Copy)]
pub struct ReportComposer {
    date: NaiveDate,
    detail_limit: usize,
}

impl ReportComposer {
    pub fn new(date: NaiveDate) -> Self {
        Self {
            date,
            detail_limit: 5,
        }
    }

    /// Number of items listed in the details section
    pub fn with_detail_limit(mut self, limit: usize) -> Self {
        self.detail_limit = limit;
        self
    }

    /// Summary, item details and anomaly table
    pub fn compose(&self, aggregate: &str, items: &[Item], hot_stocks: &[HotStock]) -> Report {
        self.compose_content(&ReportContent {
            summary: Some(aggregate),
            items,
            hot_stocks: Some(hot_stocks),
            ..Default::default()
        })
    }

    pub fn compose_content(&self, content: &ReportContent<'_>) -> Report {
        let mut sections = vec![Section {
            kind: SectionKind::Header,
            body: self.header(),
        }];

        if let Some(summary) = content.summary {
            sections.push(Section {
                kind: SectionKind::Summary,
                body: titled("Market Summary", summary),
            });
        }

        if !content.items.is_empty() {
            sections.push(Section {
                kind: SectionKind::Details,
                body: titled("Top Stories", &self.details(content.items)),
            });
        }

        if !content.indicators.is_empty() || !content.indices.is_empty() {
            sections.push(Section {
                kind: SectionKind::Indicators,
                body: titled(
                    "Economic Indicators",
                    &indicator_tables(content.indicators, content.indices),
                ),
            });
        }

        if let Some(outlook) = content.outlook {
            sections.push(Section {
                kind: SectionKind::Outlook,
                body: titled("Economic Outlook", &format!("{outlook}\n\n{OUTLOOK_NOTICE}")),
            });
        }

        if let Some(hot_stocks) = content.hot_stocks {
            sections.push(Section {
                kind: SectionKind::Anomalies,
                body: titled("Hot Stocks", &anomaly_section(hot_stocks)),
            });
        }

        sections.push(Section {
            kind: SectionKind::Disclaimer,
            body: DISCLAIMER.to_string(),
        });

        Report {
            date: self.date,
            sections,
        }
    }

    fn header(&self) -> String {
        let title = format!("Market Intelligence Report - {}", self.date.format("%Y-%m-%d"));
        let rule = "=".repeat(title.chars().count());
        format!("{title}\n{rule}")
    }

    fn details(&self, items: &[Item]) -> String {
        items
            .iter()
            .take(self.detail_limit)
            .enumerate()
            .map(|(idx, item)| {
                format!(
                    "{}. {}\n   Source: {}\n   Published: {}\n   Summary: {}\n   URL: {}",
                    idx + 1,
                    or_placeholder(&item.title, UNKNOWN),
                    or_placeholder(&item.source, UNKNOWN),
                    or_placeholder(&item.published_at, UNKNOWN),
                    item.narrative
                        .as_deref()
                        .map_or(NO_SUMMARY, |n| or_placeholder(n, NO_SUMMARY)),
                    or_placeholder(&item.url, NO_URL),
                )
            })
            .collect::<Vec<_>>()
            .join("\n\n")
    }
}

fn or_placeholder<'a>(value: &'a str, fallback: &'a str) -> &'a str {
    if value.trim().is_empty() {
        fallback
    } else {
        value
    }
}

fn titled(title: &str, body: &str) -> String {
    format!("{title}\n{}\n{body}", "-".repeat(title.chars().count()))
}

fn indicator_tables(indicators: &[IndicatorReading], indices: &[MarketIndexSnapshot]) -> String {
    let mut parts = Vec::new();

    if !indicators.is_empty() {
        let mut table = Table::new();
        table
            .load_preset(ASCII_FULL)
            .set_header(vec!["Indicator", "Latest", "Date"]);
        for reading in indicators {
            table.add_row(vec![
                reading.name.clone(),
                format!("{:.2}", reading.value),
                reading.date.format("%Y-%m-%d").to_string(),
            ]);
        }
        parts.push(table.to_string());
    }

    if !indices.is_empty() {
        let mut table = Table::new();
        table
            .load_preset(ASCII_FULL)
            .set_header(vec!["Index", "Close", "Change", "Date"]);
        for index in indices {
            table.add_row(vec![
                index.name.clone(),
                format!("{:.2}", index.close),
                format!("{:+.2}%", index.change * 100.0),
                index.date.format("%Y-%m-%d").to_string(),
            ]);
        }
        parts.push(table.to_string());
    }

    parts.join("\n\n")
}

fn anomaly_section(hot_stocks: &[HotStock]) -> String {
    if hot_stocks.is_empty() {
        return NO_ANOMALIES.to_string();
    }

    let mut table = Table::new();
    table.load_preset(ASCII_FULL).set_header(vec![
        "Symbol",
        "Volume ratio",
        "Price change",
        "Reasons",
        "Related news",
    ]);

    for stock in hot_stocks {
        let signal = &stock.signal;
        let reasons = signal
            .reasons
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("\n");
        let related = if stock.related.is_empty() {
            "None".to_string()
        } else {
            stock.related.len().to_string()
        };
        table.add_row(vec![
            signal.symbol.clone(),
            format!("{:.2}x", signal.volume_ratio),
            format!("{:+.2}%", signal.price_change * 100.0),
            reasons,
            related,
        ]);
    }

    let mut out = table.to_string();

    for stock in hot_stocks.iter().filter(|s| !s.related.is_empty()) {
        out.push_str(&format!("\n\nRelated news for {}:", stock.signal.symbol));
        for linked in &stock.related {
            out.push_str(&format!(
                "\n  - {}\n    {}\n    {}",
                or_placeholder(&linked.title, UNKNOWN),
                or_placeholder(&linked.narrative, NO_SUMMARY),
                or_placeholder(&linked.url, NO_URL),
            ));
        }
    }

    out
}
