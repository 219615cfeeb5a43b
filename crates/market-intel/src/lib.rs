//! Daily market intelligence pipeline
//!
//! This crate collects market news, narrates it through a text-generation
//! backend, flags unusually active stocks and composes everything into one
//! plain-text report. It includes:
//!
//! - News collection from NewsAPI with URL deduplication
//! - Rate-limited narration with a single cooldown retry on throttling
//! - Economic indicators from FRED and market index snapshots from Yahoo Finance
//! - Volume and price anomaly detection
//! - Cross-linking of hot stocks to the narrated news
//! - Report composition and delivery to stdout or a dated file
//!
//! # Architecture
//!
//! A [`Pipeline`] owns one component per stage and runs the enabled stages
//! in order. Data sources sit behind the traits in [`source`] so every stage
//! can be exercised without the network.
//!
//! # Example
//!
//! ```rust,ignore
//! use market_intel::{IntelConfig, Pipeline, StdoutSink, YahooFinanceClient};
//! use market_intel::config::StageSet;
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let mut config = IntelConfig::from_env()?;
//!     config.stages = StageSet::parse("hot-stocks")?;
//!     config.validate()?;
//!
//!     let pipeline = Pipeline::builder(config)
//!         .price_source(Arc::new(YahooFinanceClient::new(Duration::from_secs(30))?))
//!         .sink(Box::new(StdoutSink))
//!         .build()?;
//!
//!     let summary = pipeline.run().await;
//!     println!("{}", summary.outcome);
//!     Ok(())
//! }
//! ```

pub mod anomaly;
pub mod api;
pub mod collector;
pub mod config;
pub mod crosslink;
pub mod delivery;
pub mod error;
pub mod indicators;
pub mod model;
pub mod narrator;
pub mod pipeline;
pub mod prompts;
pub mod report;
pub mod source;

// Re-export main types for convenience
pub use anomaly::{AnomalyDetector, AnomalyReason, AnomalySignal};
pub use api::{FredClient, NewsApiClient, YahooFinanceClient};
pub use collector::NewsCollector;
pub use config::{IntelConfig, LlmBackend, StageSet};
pub use crosslink::{CrossLinker, HotStock};
pub use delivery::{Delivery, DeliverySink, FileSink, StdoutSink};
pub use error::{IntelError, Result};
pub use model::{Collection, Item};
pub use narrator::Narrator;
pub use pipeline::{Pipeline, RunCounts, RunOutcome, RunSummary};
pub use report::{Report, ReportComposer};

// Re-export Language from intel-prompt
pub use intel_prompt::Language;
