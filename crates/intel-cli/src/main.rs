//! Command-line runner for the daily market intelligence report

use anyhow::{Context, bail};
use clap::Parser;
use intel_llm::LLMProvider;
use intel_llm::providers::{AnthropicProvider, OpenAIConfig, OpenAIProvider};
use intel_prompt::Language;
use market_intel::config::StageSet;
use market_intel::delivery::DeliverySink;
use market_intel::{
    FileSink, FredClient, IntelConfig, LlmBackend, NewsApiClient, NewsCollector, Narrator,
    Pipeline, RunOutcome, StdoutSink, YahooFinanceClient,
};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "market-intel")]
#[command(about = "Collect market news, flag hot stocks and deliver a daily report", long_about = None)]
struct Args {
    /// Stages to run: news, indicators, outlook, hot-stocks or all
    #[arg(short, long, default_value = "all")]
    stages: String,

    /// Maximum number of news articles to narrate
    #[arg(long)]
    max_articles: Option<usize>,

    /// Comma-separated symbols to scan for unusual activity
    #[arg(long, value_delimiter = ',')]
    symbols: Option<Vec<String>>,

    /// Report language code (en, ja)
    #[arg(short, long)]
    language: Option<String>,

    /// Text-generation backend (openai, anthropic)
    #[arg(long)]
    provider: Option<String>,

    /// Text-generation model
    #[arg(long)]
    model: Option<String>,

    /// Report recipient
    #[arg(long, env = "RECIPIENT_EMAIL")]
    recipient: Option<String>,

    /// Write the report to `<dir>/<date>-report.txt` instead of printing it
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Print the report to stdout even when a recipient is configured
    #[arg(long)]
    dry_run: bool,

    /// Print the run summary as JSON
    #[arg(long)]
    json: bool,
}

impl Args {
    fn apply(&self, config: &mut IntelConfig) -> anyhow::Result<()> {
        config.stages = StageSet::parse(&self.stages)?;

        if let Some(max) = self.max_articles {
            config.collector.max_items = max;
        }
        if let Some(symbols) = &self.symbols {
            config.detector.symbols = symbols
                .iter()
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect();
        }
        if let Some(code) = &self.language {
            config.narrator.language = code.parse::<Language>()?;
        }
        if let Some(name) = &self.provider {
            let backend = name.parse::<LlmBackend>()?;
            if backend != config.llm_backend {
                config.llm_backend = backend;
                config.narrator.model = backend.default_model().to_string();
            }
        }
        if let Some(model) = &self.model {
            config.narrator.model.clone_from(model);
        }
        if self.recipient.is_some() {
            config.recipient.clone_from(&self.recipient);
        }
        Ok(())
    }

    /// Where the report goes
    ///
    /// `--dry-run` always prints. Mail is not implemented, so a configured
    /// recipient needs either `--dry-run` or `--output-dir`.
    fn sink_choice(&self, config: &IntelConfig) -> anyhow::Result<SinkChoice> {
        if self.dry_run {
            return Ok(SinkChoice::Stdout);
        }
        if let Some(dir) = &self.output_dir {
            return Ok(SinkChoice::File(dir.clone()));
        }
        if let Some(recipient) = &config.recipient {
            bail!(
                "Mail delivery to {recipient} is not supported; pass --dry-run to print \
                 the report or --output-dir to write it"
            );
        }
        Ok(SinkChoice::Stdout)
    }
}

#[derive(Debug, PartialEq)]
enum SinkChoice {
    Stdout,
    File(PathBuf),
}

impl SinkChoice {
    fn into_sink(self) -> Box<dyn DeliverySink> {
        match self {
            Self::Stdout => Box::new(StdoutSink),
            Self::File(dir) => Box::new(FileSink::new(dir)),
        }
    }
}

fn llm_provider(config: &IntelConfig) -> anyhow::Result<Arc<dyn LLMProvider>> {
    let key = config
        .llm_api_key()
        .with_context(|| format!("{} is not set", config.llm_backend.key_var()))?
        .to_string();
    let timeout = config.request_timeout;

    Ok(match config.llm_backend {
        LlmBackend::OpenAi => {
            let mut llm_config = OpenAIConfig::new(key).with_timeout(timeout);
            if let Some(base) = &config.openai_api_base {
                llm_config = llm_config.with_api_base(base.as_str());
            }
            Arc::new(OpenAIProvider::with_config(llm_config)?)
        }
        LlmBackend::Anthropic => Arc::new(AnthropicProvider::with_timeout(key, timeout)?),
    })
}

fn build_pipeline(config: IntelConfig, sink: Box<dyn DeliverySink>) -> anyhow::Result<Pipeline> {
    let stages = config.stages;
    let timeout = config.request_timeout;
    let mut builder = Pipeline::builder(config.clone()).sink(sink);

    if stages.needs_narrator() {
        let provider = llm_provider(&config)?;
        builder = builder.narrator(Narrator::new(provider, config.narrator.clone())?);
    }

    if stages.news {
        let key = config
            .news_api_key
            .clone()
            .context("NEWS_API_KEY is not set")?;
        let source = NewsApiClient::new(key, timeout)?;
        builder = builder.news_collector(NewsCollector::new(
            vec![Box::new(source)],
            config.collector.clone(),
        ));
    }

    if stages.indicators {
        let key = config
            .fred_api_key
            .clone()
            .context("FRED_API_KEY is not set")?;
        builder = builder.indicator_source(Arc::new(FredClient::new(key, timeout)?));
    }

    if stages.indicators || stages.hot_stocks {
        builder = builder.price_source(Arc::new(YahooFinanceClient::new(timeout)?));
    }

    Ok(builder.build()?)
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let args = Args::parse();

    let mut config = IntelConfig::from_env().context("Failed to load configuration")?;
    args.apply(&mut config)?;

    intel_utils::init_tracing(&config.log_level);
    config.validate()?;

    info!(
        "Starting market-intel with stages: {} (llm: {})",
        config.stages, config.llm_backend
    );

    let sink = args.sink_choice(&config)?.into_sink();
    let pipeline = build_pipeline(config, sink)?;
    let summary = pipeline.run().await;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        info!(
            run_id = %summary.run_id,
            collected = summary.counts.items_collected,
            narrated = summary.counts.items_narrated,
            hot_stocks = summary.counts.hot_stocks,
            "Run finished: {}",
            summary.outcome
        );
    }

    Ok(match summary.outcome {
        RunOutcome::Delivered | RunOutcome::NothingToReport => ExitCode::SUCCESS,
        RunOutcome::DeliveryFailed(_) => ExitCode::FAILURE,
    })
}
