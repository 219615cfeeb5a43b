//! End-to-end pipeline
//!
//! One [`Pipeline::run`] executes the enabled stages in order:
//!
//! 1. news: collect, narrate each item, summarize the day
//! 2. indicators: latest macro readings and market index moves
//! 3. outlook: narrative over the news summary and indicators
//! 4. hot stocks: detect anomalies and link them to the narrated news
//!
//! and then composes one report and hands it to the delivery sink. Stage
//! failures degrade to empty results; only a missing component for an
//! enabled stage is an error, raised when the pipeline is built.

use crate::anomaly::{AnomalyDetector, fetch_series};
use crate::collector::NewsCollector;
use crate::config::IntelConfig;
use crate::crosslink::{CrossLinker, HotStock};
use crate::delivery::{Delivery, DeliverySink};
use crate::error::{IntelError, Result};
use crate::indicators::{IndicatorCollector, IndicatorReading, MarketIndexCollector, MarketIndexSnapshot};
use crate::model::Collection;
use crate::narrator::{NOTHING_NOTABLE, Narrator};
use crate::report::{Report, ReportComposer, ReportContent};
use crate::source::{IndicatorSource, PriceSource};
use chrono::{Days, NaiveDate, Utc};
use serde::Serialize;
use std::fmt;
use std::sync::Arc;
use tracing::{Instrument, error, info, info_span, warn};
use uuid::Uuid;

/// How a run ended
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum RunOutcome {
    /// The report reached the sink
    Delivered,
    /// Every enabled stage came back empty; nothing was sent
    NothingToReport,
    /// The sink rejected the report
    DeliveryFailed(String),
}

impl fmt::Display for RunOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunOutcome::Delivered => write!(f, "delivered"),
            RunOutcome::NothingToReport => write!(f, "nothing to report"),
            RunOutcome::DeliveryFailed(reason) => write!(f, "delivery failed: {reason}"),
        }
    }
}

/// Per-stage tallies for a run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunCounts {
    pub items_collected: usize,
    pub items_narrated: usize,
    pub placeholders: usize,
    pub items_skipped: usize,
    pub indicators: usize,
    pub indices: usize,
    pub symbols_analysed: usize,
    pub hot_stocks: usize,
}

/// Result of one pipeline run
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunSummary {
    pub run_id: Uuid,
    pub outcome: RunOutcome,
    pub counts: RunCounts,
    /// The composed report, if anything was composed
    pub report: Option<Report>,
}

/// The assembled market intelligence pipeline
pub struct Pipeline {
    config: IntelConfig,
    collector: Option<NewsCollector>,
    narrator: Option<Narrator>,
    prices: Option<Arc<dyn PriceSource>>,
    indicators: Option<IndicatorCollector>,
    linker: CrossLinker,
    sink: Box<dyn DeliverySink>,
}

impl Pipeline {
    pub fn builder(config: IntelConfig) -> PipelineBuilder {
        PipelineBuilder::new(config)
    }

    pub fn config(&self) -> &IntelConfig {
        &self.config
    }

    /// Run every enabled stage for today's date
    pub async fn run(&self) -> RunSummary {
        self.run_for(Utc::now().date_naive()).await
    }

    /// Run every enabled stage for `date`
    pub async fn run_for(&self, date: NaiveDate) -> RunSummary {
        let run_id = Uuid::new_v4();
        let span = info_span!("pipeline_run", %run_id, stages = %self.config.stages);
        self.execute(run_id, date).instrument(span).await
    }

    async fn execute(&self, run_id: Uuid, date: NaiveDate) -> RunSummary {
        let stages = self.config.stages;
        let mut counts = RunCounts::default();
        info!("Starting market intelligence run for {}", date);

        // 1. news
        let mut narrated = Collection::new();
        let mut summary = None;
        if let (true, Some(collector), Some(narrator)) =
            (stages.news, &self.collector, &self.narrator)
        {
            let collected = collector
                .collect(&collector.config().terms, self.config.collector.max_items)
                .await;
            counts.items_collected = collected.len();

            if collected.is_empty() {
                info!("No news collected, skipping narration");
            } else {
                let report = narrator.summarize_all(collected).await;
                counts.items_narrated = report.generated;
                counts.placeholders = report.placeholders;
                counts.items_skipped = report.skipped;
                narrated = report.collection;
            }
            summary = Some(narrator.aggregate(&narrated).await);
        }

        // 2. indicators
        let (readings, indices) = if stages.indicators {
            self.collect_indicators(date).await
        } else {
            (Vec::new(), Vec::new())
        };
        counts.indicators = readings.len();
        counts.indices = indices.len();

        // 3. outlook
        let mut outlook = None;
        if let (true, Some(narrator)) = (stages.outlook, &self.narrator) {
            if narrated.is_empty() && readings.is_empty() {
                info!("No news or indicators available, skipping outlook");
            } else {
                let news_summary = summary.as_deref().unwrap_or(NOTHING_NOTABLE);
                outlook = Some(narrator.outlook(news_summary, &readings).await);
            }
        }

        // 4. hot stocks
        let mut hot_stocks: Option<Vec<HotStock>> = None;
        if let (true, Some(prices)) = (stages.hot_stocks, &self.prices) {
            let detector = AnomalyDetector::from_config(&self.config.detector);
            let series = fetch_series(
                prices.as_ref(),
                &self.config.detector.symbols,
                self.config.detector.history_days,
            )
            .await;
            counts.symbols_analysed = series.len();

            let signals = detector.detect(&series);
            let linked = self.linker.link_all(signals, narrated.items());
            counts.hot_stocks = linked.len();
            hot_stocks = Some(linked);
        }

        let produced = !narrated.is_empty()
            || !readings.is_empty()
            || !indices.is_empty()
            || outlook.is_some()
            || counts.hot_stocks > 0;

        if !produced {
            info!("Every enabled stage came back empty; nothing to report");
            return RunSummary {
                run_id,
                outcome: RunOutcome::NothingToReport,
                counts,
                report: None,
            };
        }

        let report = ReportComposer::new(date).compose_content(&ReportContent {
            summary: summary.as_deref(),
            items: narrated.items(),
            indicators: &readings,
            indices: &indices,
            outlook: outlook.as_deref(),
            hot_stocks: hot_stocks.as_deref(),
        });

        let delivery = Delivery::from_report(&report, self.config.recipient.clone());
        let outcome = match self.sink.deliver(&delivery).await {
            Ok(()) => {
                info!("Report delivered: {}", delivery.subject);
                RunOutcome::Delivered
            }
            Err(e) => {
                error!("Report delivery failed: {}", e);
                RunOutcome::DeliveryFailed(e.to_string())
            }
        };

        RunSummary {
            run_id,
            outcome,
            counts,
            report: Some(report),
        }
    }

    async fn collect_indicators(
        &self,
        date: NaiveDate,
    ) -> (Vec<IndicatorReading>, Vec<MarketIndexSnapshot>) {
        let readings = match &self.indicators {
            Some(collector) => {
                let start = date
                    .checked_sub_days(Days::new(self.config.economic_data_days))
                    .unwrap_or(date);
                collector.collect(&self.config.indicators, start, date).await
            }
            None => Vec::new(),
        };

        let indices = match &self.prices {
            Some(prices) => {
                MarketIndexCollector::new(Arc::clone(prices))
                    .collect(&self.config.market_indices, self.config.market_data_days)
                    .await
            }
            None => {
                warn!("No price source configured, market indices skipped");
                Vec::new()
            }
        };

        (readings, indices)
    }
}

/// Builder for [`Pipeline`]
pub struct PipelineBuilder {
    config: IntelConfig,
    collector: Option<NewsCollector>,
    narrator: Option<Narrator>,
    prices: Option<Arc<dyn PriceSource>>,
    indicator_source: Option<Arc<dyn IndicatorSource>>,
    linker: CrossLinker,
    sink: Option<Box<dyn DeliverySink>>,
}

impl PipelineBuilder {
    pub fn new(config: IntelConfig) -> Self {
        Self {
            config,
            collector: None,
            narrator: None,
            prices: None,
            indicator_source: None,
            linker: CrossLinker::default(),
            sink: None,
        }
    }

    pub fn news_collector(mut self, collector: NewsCollector) -> Self {
        self.collector = Some(collector);
        self
    }

    pub fn narrator(mut self, narrator: Narrator) -> Self {
        self.narrator = Some(narrator);
        self
    }

    pub fn price_source(mut self, source: Arc<dyn PriceSource>) -> Self {
        self.prices = Some(source);
        self
    }

    pub fn indicator_source(mut self, source: Arc<dyn IndicatorSource>) -> Self {
        self.indicator_source = Some(source);
        self
    }

    pub fn cross_linker(mut self, linker: CrossLinker) -> Self {
        self.linker = linker;
        self
    }

    pub fn sink(mut self, sink: Box<dyn DeliverySink>) -> Self {
        self.sink = Some(sink);
        self
    }

    /// Check every enabled stage has what it needs
    pub fn build(self) -> Result<Pipeline> {
        let stages = self.config.stages;
        let missing = |what: &str| {
            IntelError::ConfigError(format!("{what} is required for the selected stages"))
        };

        if stages.is_empty() {
            return Err(IntelError::ConfigError(
                "At least one stage must be selected".to_string(),
            ));
        }
        if stages.news && self.collector.is_none() {
            return Err(missing("A news collector"));
        }
        if stages.needs_narrator() && self.narrator.is_none() {
            return Err(missing("A narrator"));
        }
        if stages.indicators && self.indicator_source.is_none() {
            return Err(missing("An indicator source"));
        }
        if stages.hot_stocks && self.prices.is_none() {
            return Err(missing("A price source"));
        }
        let sink = self.sink.ok_or_else(|| missing("A delivery sink"))?;

        Ok(Pipeline {
            config: self.config,
            collector: self.collector,
            narrator: self.narrator,
            prices: self.prices,
            indicators: self.indicator_source.map(IndicatorCollector::new),
            linker: self.linker,
            sink,
        })
    }
}
