//! Hot-stock anomaly detection
//!
//! A symbol is "hot" when its latest volume is a multiple of the trailing
//! average or its close moved by at least a threshold fraction since the
//! previous bar.

use crate::config::DetectorConfig;
use crate::error::{IntelError, Result};
use crate::model::PriceSeries;
use crate::source::PriceSource;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{debug, info, instrument, warn};

/// Why a symbol was flagged
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AnomalyReason {
    /// Last volume at or above `threshold` times the trailing mean
    VolumeSpike { ratio: f64, threshold: f64 },
    /// Absolute close-to-close change at or above `threshold`
    PriceMove { change: f64, threshold: f64 },
}

impl AnomalyReason {
    pub fn kind(&self) -> &'static str {
        match self {
            AnomalyReason::VolumeSpike { .. } => "volume",
            AnomalyReason::PriceMove { .. } => "price",
        }
    }
}

impl fmt::Display for AnomalyReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AnomalyReason::VolumeSpike { ratio, threshold } => {
                write!(f, "volume spike {ratio:.2}x (>= {threshold:.2}x)")
            }
            AnomalyReason::PriceMove { change, threshold } => write!(
                f,
                "price move {:+.2}% (>= {:.2}%)",
                change * 100.0,
                threshold * 100.0
            ),
        }
    }
}

/// A symbol that crossed at least one threshold
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnomalySignal {
    pub symbol: String,
    /// Last volume over the mean of the preceding volumes; 0 when that mean is 0
    pub volume_ratio: f64,
    /// Fractional close change against the previous bar
    pub price_change: f64,
    pub last_close: f64,
    pub reasons: Vec<AnomalyReason>,
}

/// Threshold-based volume/price anomaly detector
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnomalyDetector {
    volume_threshold: f64,
    price_threshold: f64,
}

impl AnomalyDetector {
    pub fn new(volume_threshold: f64, price_threshold: f64) -> Self {
        Self {
            volume_threshold,
            price_threshold,
        }
    }

    pub fn from_config(config: &DetectorConfig) -> Self {
        Self::new(config.volume_threshold, config.price_threshold)
    }

    /// Signals for every series that crossed a threshold, in input order
    ///
    /// Short series are skipped; malformed ones are logged and omitted.
    pub fn detect(&self, series: &[PriceSeries]) -> Vec<AnomalySignal> {
        let signals: Vec<_> = series
            .iter()
            .filter_map(|s| match self.evaluate(s) {
                Ok(signal) => signal,
                Err(e) => {
                    warn!("{}", e);
                    None
                }
            })
            .collect();

        info!(
            "{} of {} symbols flagged as hot",
            signals.len(),
            series.len()
        );
        signals
    }

    /// Evaluate one series
    ///
    /// `Ok(None)` when the series is too short or nothing fired.
    pub fn evaluate(&self, series: &PriceSeries) -> Result<Option<AnomalySignal>> {
        let [earlier @ .., prev, last] = series.bars.as_slice() else {
            debug!("{}: fewer than 2 bars, skipping", series.symbol);
            return Ok(None);
        };

        let malformed = |reason: &str| IntelError::MalformedSeries {
            symbol: series.symbol.clone(),
            reason: reason.to_string(),
        };

        if !last.close.is_finite() || !prev.close.is_finite() {
            return Err(malformed("non-finite close"));
        }
        if prev.close <= 0.0 {
            return Err(malformed("previous close is not positive"));
        }

        let trailing_count = earlier.len() + 1;
        let trailing_sum: f64 = earlier
            .iter()
            .chain(std::iter::once(prev))
            .map(|bar| bar.volume as f64)
            .sum();
        let trailing_mean = trailing_sum / trailing_count as f64;

        let volume_ratio = if trailing_mean > 0.0 {
            last.volume as f64 / trailing_mean
        } else {
            0.0
        };
        let price_change = (last.close - prev.close) / prev.close;

        let mut reasons = Vec::new();
        if volume_ratio >= self.volume_threshold {
            reasons.push(AnomalyReason::VolumeSpike {
                ratio: volume_ratio,
                threshold: self.volume_threshold,
            });
        }
        if price_change.abs() >= self.price_threshold {
            reasons.push(AnomalyReason::PriceMove {
                change: price_change,
                threshold: self.price_threshold,
            });
        }

        if reasons.is_empty() {
            return Ok(None);
        }

        Ok(Some(AnomalySignal {
            symbol: series.symbol.clone(),
            volume_ratio,
            price_change,
            last_close: last.close,
            reasons,
        }))
    }
}

/// Detect anomalies with explicit thresholds
pub fn detect(
    series: &[PriceSeries],
    volume_threshold: f64,
    price_threshold: f64,
) -> Vec<AnomalySignal> {
    AnomalyDetector::new(volume_threshold, price_threshold).detect(series)
}

/// Fetch price history for each symbol, skipping failures
#[instrument(skip(source, symbols), fields(count = symbols.len()))]
pub async fn fetch_series(
    source: &dyn PriceSource,
    symbols: &[String],
    days: u32,
) -> Vec<PriceSeries> {
    let mut out = Vec::with_capacity(symbols.len());
    for symbol in symbols {
        match source.history(symbol, days).await {
            Ok(bars) => out.push(PriceSeries::new(symbol.clone(), bars)),
            Err(e) => warn!("Failed to fetch {}: {}", symbol, e),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::PriceBar;
    use crate::source::MockPriceSource;
    use chrono::Utc;

    fn series(symbol: &str, volumes: &[u64], closes: &[f64]) -> PriceSeries {
        let bars = volumes
            .iter()
            .zip(closes)
            .map(|(&volume, &close)| PriceBar {
                timestamp: Utc::now(),
                open: close,
                high: close,
                low: close,
                close,
                volume,
            })
            .collect();
        PriceSeries::new(symbol, bars)
    }

    #[test]
    fn test_volume_and_price_both_fire() {
        let input = [series(
            "7203.T",
            &[100, 100, 100, 100, 500],
            &[10.0, 10.0, 10.0, 10.0, 10.6],
        )];

        let signals = detect(&input, 2.0, 0.05);
        assert_eq!(signals.len(), 1);

        let signal = &signals[0];
        assert!((signal.volume_ratio - 5.0).abs() < 1e-12);
        assert!((signal.price_change - 0.06).abs() < 1e-9);
        let kinds: Vec<_> = signal.reasons.iter().map(AnomalyReason::kind).collect();
        assert_eq!(kinds, vec!["volume", "price"]);
    }

    #[test]
    fn test_volume_ratio_boundary() {
        let below = [series("A", &[1_000_000, 1_999_999], &[10.0, 10.0])];
        assert!(detect(&below, 2.0, 0.05).is_empty());

        let at = [series("A", &[100, 100, 200], &[10.0, 10.0, 10.0])];
        let signals = detect(&at, 2.0, 0.05);
        assert_eq!(signals.len(), 1);
        assert!((signals[0].volume_ratio - 2.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_price_change_boundary_both_directions() {
        let up = [series("UP", &[100, 100], &[100.0, 105.0])];
        let down = [series("DOWN", &[100, 100], &[100.0, 95.0])];

        let up_signals = detect(&up, 2.0, 0.05);
        assert_eq!(up_signals.len(), 1);
        assert_eq!(up_signals[0].reasons[0].kind(), "price");

        let down_signals = detect(&down, 2.0, 0.05);
        assert_eq!(down_signals.len(), 1);
        assert!(down_signals[0].price_change < 0.0);
    }

    #[test]
    fn test_zero_trailing_volume() {
        let quiet = [series("Z", &[0, 0, 1_000], &[10.0, 10.0, 10.0])];
        assert!(detect(&quiet, 2.0, 0.05).is_empty());

        let moved = [series("Z", &[0, 0, 1_000], &[10.0, 10.0, 11.0])];
        let signals = detect(&moved, 2.0, 0.05);
        assert_eq!(signals.len(), 1);
        assert!(signals[0].volume_ratio.abs() < f64::EPSILON);
        assert_eq!(signals[0].reasons.len(), 1);
    }

    #[test]
    fn test_short_and_malformed_series_are_omitted() {
        let input = [
            series("SHORT", &[100], &[10.0]),
            series("ZERO", &[100, 900], &[0.0, 10.0]),
            series("NAN", &[100, 900], &[10.0, f64::NAN]),
            series("HOT", &[100, 900], &[10.0, 10.0]),
        ];

        let signals = detect(&input, 2.0, 0.05);
        let symbols: Vec<_> = signals.iter().map(|s| s.symbol.as_str()).collect();
        assert_eq!(symbols, vec!["HOT"]);

        let detector = AnomalyDetector::new(2.0, 0.05);
        assert!(matches!(
            detector.evaluate(&input[1]),
            Err(IntelError::MalformedSeries { .. })
        ));
    }

    #[test]
    fn test_output_follows_input_order() {
        let input = [
            series("B", &[1, 10], &[1.0, 1.0]),
            series("A", &[1, 10], &[1.0, 1.0]),
            series("C", &[1, 10], &[1.0, 1.0]),
        ];
        let symbols: Vec<_> = detect(&input, 2.0, 0.05)
            .into_iter()
            .map(|s| s.symbol)
            .collect();
        assert_eq!(symbols, vec!["B", "A", "C"]);
    }

    #[test]
    fn test_reason_display() {
        let reason = AnomalyReason::PriceMove {
            change: -0.0712,
            threshold: 0.05,
        };
        assert_eq!(reason.to_string(), "price move -7.12% (>= 5.00%)");

        let reason = AnomalyReason::VolumeSpike {
            ratio: 3.456,
            threshold: 2.0,
        };
        assert_eq!(reason.to_string(), "volume spike 3.46x (>= 2.00x)");
    }

    #[tokio::test]
    async fn test_fetch_series_skips_failures() {
        let mut source = MockPriceSource::new();
        source
            .expect_history()
            .withf(|symbol, _| symbol == "AAPL")
            .returning(|_, _| Ok(vec![]));
        source
            .expect_history()
            .withf(|symbol, _| symbol == "BROKEN")
            .returning(|_, _| Err(IntelError::YahooFinanceError("404".to_string())));

        let fetched = fetch_series(&source, &["BROKEN".to_string(), "AAPL".to_string()], 5).await;
        assert_eq!(fetched.len(), 1);
        assert_eq!(fetched[0].symbol, "AAPL");
    }
}
