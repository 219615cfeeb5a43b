//! Economic indicators and market index snapshots

use crate::api::fred_series;
use crate::model::PriceSeries;
use crate::source::{IndicatorSource, PriceSource};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, instrument, warn};

/// Catalogue entry mapping a short indicator name to a FRED series
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndicatorSpec {
    pub key: &'static str,
    pub series_id: &'static str,
    pub name: &'static str,
}

/// Indicators the pipeline knows how to fetch
pub const CATALOGUE: &[IndicatorSpec] = &[
    IndicatorSpec {
        key: "us_gdp",
        series_id: fred_series::GDP,
        name: "US GDP",
    },
    IndicatorSpec {
        key: "us_cpi",
        series_id: fred_series::CPI,
        name: "US Consumer Price Index",
    },
    IndicatorSpec {
        key: "us_unemployment",
        series_id: fred_series::UNEMPLOYMENT_RATE,
        name: "US Unemployment Rate",
    },
    IndicatorSpec {
        key: "us_interest_rate",
        series_id: fred_series::FED_FUNDS_RATE,
        name: "US Federal Funds Rate",
    },
];

pub fn lookup(key: &str) -> Option<&'static IndicatorSpec> {
    CATALOGUE.iter().find(|spec| spec.key == key)
}

/// Latest observation of one indicator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndicatorReading {
    pub key: String,
    pub name: String,
    pub series_id: String,
    pub value: f64,
    pub date: NaiveDate,
}

/// Fetches catalogue indicators through an [`IndicatorSource`]
pub struct IndicatorCollector {
    source: Arc<dyn IndicatorSource>,
}

impl IndicatorCollector {
    pub fn new(source: Arc<dyn IndicatorSource>) -> Self {
        Self { source }
    }

    /// Latest reading for each named indicator, in request order
    ///
    /// Unknown names, failed fetches and empty series are logged and skipped.
    #[instrument(skip(self, names), fields(count = names.len()))]
    pub async fn collect(
        &self,
        names: &[String],
        start: NaiveDate,
        end: NaiveDate,
    ) -> Vec<IndicatorReading> {
        let mut readings = Vec::with_capacity(names.len());

        for name in names {
            let Some(spec) = lookup(name) else {
                warn!("Unknown indicator '{}', skipping", name);
                continue;
            };

            match self.source.observations(spec.series_id, start, end).await {
                Ok(series) => match series.latest() {
                    Some(point) => readings.push(IndicatorReading {
                        key: spec.key.to_string(),
                        name: spec.name.to_string(),
                        series_id: spec.series_id.to_string(),
                        value: point.value,
                        date: point.date,
                    }),
                    None => warn!("No observations for {} ({})", spec.name, spec.series_id),
                },
                Err(e) => warn!("Failed to fetch {} ({}): {}", spec.name, spec.series_id, e),
            }
        }

        info!("Collected {} indicator readings", readings.len());
        readings
    }
}

/// Latest close of a market index with its daily move
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketIndexSnapshot {
    pub symbol: String,
    pub name: String,
    pub close: f64,
    /// Day-over-day change as a fraction
    pub change: f64,
    pub date: NaiveDate,
}

/// Human-readable name for well-known index symbols
pub fn index_name(symbol: &str) -> &str {
    match symbol {
        "^DJI" => "Dow Jones Industrial Average",
        "^GSPC" => "S&P 500",
        "^IXIC" => "NASDAQ Composite",
        "^N225" => "Nikkei 225",
        other => other,
    }
}

/// Fetches market index snapshots through a [`PriceSource`]
pub struct MarketIndexCollector {
    source: Arc<dyn PriceSource>,
}

impl MarketIndexCollector {
    pub fn new(source: Arc<dyn PriceSource>) -> Self {
        Self { source }
    }

    #[instrument(skip(self, symbols), fields(count = symbols.len()))]
    pub async fn collect(&self, symbols: &[String], days: u32) -> Vec<MarketIndexSnapshot> {
        let mut snapshots = Vec::with_capacity(symbols.len());

        for symbol in symbols {
            let bars = match self.source.history(symbol, days).await {
                Ok(bars) => bars,
                Err(e) => {
                    warn!("Failed to fetch index {}: {}", symbol, e);
                    continue;
                }
            };

            let series = PriceSeries::new(symbol.clone(), bars);
            match (series.last_close_change(), series.bars.last()) {
                (Some((close, change)), Some(last)) if close.is_finite() && change.is_finite() => {
                    snapshots.push(MarketIndexSnapshot {
                        symbol: symbol.clone(),
                        name: index_name(symbol).to_string(),
                        close,
                        change,
                        date: last.timestamp.date_naive(),
                    });
                }
                _ => warn!("Not enough usable bars for index {}", symbol),
            }
        }

        snapshots
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::IntelError;
    use crate::model::{PriceBar, Series, SeriesPoint};
    use crate::source::{MockIndicatorSource, MockPriceSource};
    use chrono::{TimeZone, Utc};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_catalogue_lookup() {
        assert_eq!(lookup("us_cpi").unwrap().series_id, "CPIAUCSL");
        assert_eq!(lookup("us_gdp").unwrap().series_id, "GDP");
        assert_eq!(lookup("us_unemployment").unwrap().series_id, "UNRATE");
        assert_eq!(lookup("us_interest_rate").unwrap().series_id, "FEDFUNDS");
        assert!(lookup("jp_cpi").is_none());
    }

    #[tokio::test]
    async fn test_collect_skips_unknown_failed_and_empty() {
        let mut source = MockIndicatorSource::new();
        source
            .expect_observations()
            .withf(|id, _, _| id == "UNRATE")
            .returning(|id, _, _| {
                Ok(Series {
                    id: id.to_string(),
                    points: vec![
                        SeriesPoint {
                            date: NaiveDate::from_ymd_opt(2024, 11, 1).unwrap(),
                            value: 4.2,
                        },
                        SeriesPoint {
                            date: NaiveDate::from_ymd_opt(2024, 12, 1).unwrap(),
                            value: 4.1,
                        },
                    ],
                })
            });
        source
            .expect_observations()
            .withf(|id, _, _| id == "GDP")
            .returning(|_, _, _| Err(IntelError::ApiError("500".to_string())));
        source
            .expect_observations()
            .withf(|id, _, _| id == "CPIAUCSL")
            .returning(|id, _, _| {
                Ok(Series {
                    id: id.to_string(),
                    points: vec![],
                })
            });

        let collector = IndicatorCollector::new(Arc::new(source));
        let names: Vec<String> = ["us_gdp", "bogus", "us_cpi", "us_unemployment"]
            .iter()
            .map(|s| (*s).to_string())
            .collect();

        let readings = collector
            .collect(&names, date(2024, 1, 1), date(2024, 12, 31))
            .await;

        assert_eq!(readings.len(), 1);
        assert_eq!(readings[0].key, "us_unemployment");
        assert_eq!(readings[0].date, date(2024, 12, 1));
        assert!((readings[0].value - 4.1).abs() < f64::EPSILON);
    }

    #[tokio::test]
    async fn test_market_index_snapshot() {
        let bar = |day: u32, close: f64| PriceBar {
            timestamp: Utc.with_ymd_and_hms(2025, 3, day, 0, 0, 0).unwrap(),
            open: close,
            high: close,
            low: close,
            close,
            volume: 0,
        };

        let mut source = MockPriceSource::new();
        source
            .expect_history()
            .withf(|symbol, days| symbol == "^N225" && *days == 30)
            .returning(move |_, _| Ok(vec![bar(3, 38000.0), bar(4, 38380.0)]));
        source
            .expect_history()
            .withf(|symbol, _| symbol == "^DJI")
            .returning(move |_, _| Ok(vec![bar(4, 42000.0)]));

        let collector = MarketIndexCollector::new(Arc::new(source));
        let snapshots = collector
            .collect(&["^N225".to_string(), "^DJI".to_string()], 30)
            .await;

        assert_eq!(snapshots.len(), 1);
        assert_eq!(snapshots[0].name, "Nikkei 225");
        assert_eq!(snapshots[0].date, date(2025, 3, 4));
        assert!((snapshots[0].change - 0.01).abs() < 1e-12);
    }
}
