//! Configuration for market intelligence runs
//!
//! [`IntelConfig`] is normally loaded with [`IntelConfig::from_env`] and then
//! adjusted by command-line overrides. Credentials are plain fields handed to
//! client constructors; nothing here touches global state.

use crate::error::{IntelError, Result};
use intel_prompt::Language;
use intel_utils::EnvReader;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Default search terms for market news
pub const DEFAULT_NEWS_TERMS: &[&str] = &[
    "market",
    "economy",
    "finance",
    "stocks",
    "trading",
    "investment",
    "economic",
    "financial",
    "business",
];

pub const DEFAULT_TARGET_SYMBOLS: &[&str] = &["7203.T", "6758.T", "AAPL", "MSFT"];

pub const DEFAULT_INDICATORS: &[&str] =
    &["us_gdp", "us_cpi", "us_unemployment", "us_interest_rate"];

pub const DEFAULT_MARKET_INDICES: &[&str] = &["^DJI", "^GSPC", "^IXIC", "^N225"];

/// Text-generation backend the narrator talks to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LlmBackend {
    /// Any OpenAI-compatible `/chat/completions` server
    #[default]
    OpenAi,
    Anthropic,
}

impl LlmBackend {
    pub fn default_model(self) -> &'static str {
        match self {
            Self::OpenAi => "gpt-4o-mini",
            Self::Anthropic => "claude-3-5-haiku-latest",
        }
    }

    /// Environment variable holding the backend's key
    pub fn key_var(self) -> &'static str {
        match self {
            Self::OpenAi => "OPENAI_API_KEY",
            Self::Anthropic => "ANTHROPIC_API_KEY",
        }
    }
}

impl std::str::FromStr for LlmBackend {
    type Err = IntelError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "openai" => Ok(Self::OpenAi),
            "anthropic" => Ok(Self::Anthropic),
            other => Err(IntelError::ConfigError(format!(
                "Unknown LLM provider '{other}' (expected openai or anthropic)"
            ))),
        }
    }
}

impl fmt::Display for LlmBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::OpenAi => "openai",
            Self::Anthropic => "anthropic",
        })
    }
}

/// Which pipeline stages a run executes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageSet {
    pub news: bool,
    pub indicators: bool,
    pub outlook: bool,
    pub hot_stocks: bool,
}

impl StageSet {
    pub fn all() -> Self {
        Self {
            news: true,
            indicators: true,
            outlook: true,
            hot_stocks: true,
        }
    }

    pub fn none() -> Self {
        Self {
            news: false,
            indicators: false,
            outlook: false,
            hot_stocks: false,
        }
    }

    /// Parse a comma-separated stage list, e.g. `"news,hot-stocks"` or `"all"`
    ///
    /// # Examples
    ///
    /// ```
    /// use market_intel::config::StageSet;
    ///
    /// let stages = StageSet::parse("news, hot-stocks").unwrap();
    /// assert!(stages.news && stages.hot_stocks);
    /// assert!(!stages.indicators && !stages.outlook);
    /// ```
    pub fn parse(spec: &str) -> Result<Self> {
        let mut stages = Self::none();
        for name in spec.split(',').map(str::trim).filter(|s| !s.is_empty()) {
            match name.to_lowercase().as_str() {
                "all" => stages = Self::all(),
                "news" => stages.news = true,
                "indicators" | "economic" => stages.indicators = true,
                "outlook" => stages.outlook = true,
                "hot-stocks" | "hot_stocks" | "hotstocks" => stages.hot_stocks = true,
                other => {
                    return Err(IntelError::ConfigError(format!(
                        "Unknown stage '{other}' (expected news, indicators, outlook, hot-stocks or all)"
                    )));
                }
            }
        }

        if stages.is_empty() {
            return Err(IntelError::ConfigError(
                "At least one stage must be selected".to_string(),
            ));
        }
        Ok(stages)
    }

    pub fn is_empty(&self) -> bool {
        !(self.news || self.indicators || self.outlook || self.hot_stocks)
    }

    /// Whether any enabled stage talks to the text-generation backend
    pub fn needs_narrator(&self) -> bool {
        self.news || self.outlook
    }
}

impl Default for StageSet {
    fn default() -> Self {
        Self::all()
    }
}

impl fmt::Display for StageSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = [
            (self.news, "news"),
            (self.indicators, "indicators"),
            (self.outlook, "outlook"),
            (self.hot_stocks, "hot-stocks"),
        ]
        .into_iter()
        .filter_map(|(on, name)| on.then_some(name))
        .collect();
        write!(f, "{}", names.join(","))
    }
}

/// News collection settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CollectorConfig {
    /// Candidate search terms, in priority order
    pub terms: Vec<String>,
    /// Only the first `max_terms` terms are issued
    pub max_terms: usize,
    /// Collection size after merge and dedup
    pub max_items: usize,
    /// ISO 639-1 article language
    pub language: String,
    /// How far back `from` reaches, in days
    pub lookback_days: u64,
    /// Provider page size ceiling
    pub page_size_cap: usize,
}

impl Default for CollectorConfig {
    fn default() -> Self {
        Self {
            terms: DEFAULT_NEWS_TERMS.iter().map(|s| (*s).to_string()).collect(),
            max_terms: 3,
            max_items: 10,
            language: "en".to_string(),
            lookback_days: 1,
            page_size_cap: 20,
        }
    }
}

/// Text-generation settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NarratorConfig {
    pub model: String,
    pub language: Language,
    /// Wait after a throttle signal before the single retry
    pub cooldown: Duration,
    /// Pause between consecutive per-item calls
    pub pacing: Duration,
    /// Characters of article body submitted per item
    pub body_char_limit: usize,
    pub item_max_tokens: u32,
    pub aggregate_max_tokens: u32,
    pub outlook_max_tokens: u32,
    pub temperature: f32,
    pub outlook_temperature: f32,
    /// Narrated items fed to the aggregate summary
    pub aggregate_item_limit: usize,
}

impl Default for NarratorConfig {
    fn default() -> Self {
        Self {
            model: "gpt-4o-mini".to_string(),
            language: Language::English,
            cooldown: Duration::from_secs(60),
            pacing: Duration::from_secs(1),
            body_char_limit: 3000,
            item_max_tokens: 300,
            aggregate_max_tokens: 500,
            outlook_max_tokens: 600,
            temperature: 0.3,
            outlook_temperature: 0.4,
            aggregate_item_limit: 5,
        }
    }
}

/// Hot-stock detection settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectorConfig {
    pub symbols: Vec<String>,
    /// Days of history fetched per symbol
    pub history_days: u32,
    /// Minimum last-volume / trailing-mean ratio
    pub volume_threshold: f64,
    /// Minimum absolute day-over-day close change, as a fraction
    pub price_threshold: f64,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            symbols: DEFAULT_TARGET_SYMBOLS
                .iter()
                .map(|s| (*s).to_string())
                .collect(),
            history_days: 5,
            volume_threshold: 2.0,
            price_threshold: 0.05,
        }
    }
}

impl DetectorConfig {
    pub fn validate(&self) -> Result<()> {
        for (name, value) in [
            ("volume_threshold", self.volume_threshold),
            ("price_threshold", self.price_threshold),
        ] {
            if !value.is_finite() || value <= 0.0 {
                return Err(IntelError::ConfigError(format!(
                    "{name} must be a positive number, got {value}"
                )));
            }
        }
        if self.history_days < 2 {
            return Err(IntelError::ConfigError(
                "history_days must be at least 2".to_string(),
            ));
        }
        Ok(())
    }
}

/// Full configuration for one pipeline run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntelConfig {
    pub news_api_key: Option<String>,
    pub llm_backend: LlmBackend,
    pub openai_api_key: Option<String>,
    pub anthropic_api_key: Option<String>,
    /// OpenAI-compatible endpoint; `None` uses the public API
    pub openai_api_base: Option<String>,
    pub fred_api_key: Option<String>,
    /// Report recipient; `None` prints the report instead
    pub recipient: Option<String>,
    pub log_level: String,
    pub stages: StageSet,
    pub collector: CollectorConfig,
    pub narrator: NarratorConfig,
    pub detector: DetectorConfig,
    /// Indicator catalogue names, e.g. `us_cpi`
    pub indicators: Vec<String>,
    pub market_indices: Vec<String>,
    pub economic_data_days: u64,
    pub market_data_days: u32,
    pub request_timeout: Duration,
}

impl Default for IntelConfig {
    fn default() -> Self {
        Self {
            news_api_key: None,
            llm_backend: LlmBackend::default(),
            openai_api_key: None,
            anthropic_api_key: None,
            openai_api_base: None,
            fred_api_key: None,
            recipient: None,
            log_level: "info".to_string(),
            stages: StageSet::all(),
            collector: CollectorConfig::default(),
            narrator: NarratorConfig::default(),
            detector: DetectorConfig::default(),
            indicators: DEFAULT_INDICATORS.iter().map(|s| (*s).to_string()).collect(),
            market_indices: DEFAULT_MARKET_INDICES
                .iter()
                .map(|s| (*s).to_string())
                .collect(),
            economic_data_days: 365,
            market_data_days: 30,
            request_timeout: Duration::from_secs(30),
        }
    }
}

impl IntelConfig {
    /// Create a new configuration builder
    pub fn builder() -> IntelConfigBuilder {
        IntelConfigBuilder::default()
    }

    /// Load from the process environment
    ///
    /// Only parsing errors are reported here; call [`IntelConfig::validate`]
    /// once stage selection and overrides are final.
    pub fn from_env() -> Result<Self> {
        Self::from_reader(&EnvReader::from_env())
    }

    /// Load from an explicit variable snapshot
    pub fn from_reader(env: &EnvReader) -> Result<Self> {
        let defaults = Self::default();

        let language = match env.get("REPORT_LANGUAGE") {
            Some(code) => code
                .parse::<Language>()
                .map_err(|e| IntelError::ConfigError(format!("REPORT_LANGUAGE: {e}")))?,
            None => defaults.narrator.language,
        };

        let collector = CollectorConfig {
            terms: env.list_or("NEWS_KEYWORDS", DEFAULT_NEWS_TERMS),
            max_items: env.parse_or("MAX_NEWS_ARTICLES", defaults.collector.max_items)?,
            ..defaults.collector
        };

        let llm_backend = match env.get("LLM_PROVIDER") {
            Some(name) => name.parse::<LlmBackend>()?,
            None => defaults.llm_backend,
        };
        let model = match llm_backend {
            LlmBackend::OpenAi => env.string_or("OPENAI_MODEL", llm_backend.default_model()),
            LlmBackend::Anthropic => env.string_or("ANTHROPIC_MODEL", llm_backend.default_model()),
        };

        let narrator = NarratorConfig {
            model,
            language,
            ..defaults.narrator
        };

        let detector = DetectorConfig {
            symbols: env.list_or("TARGET_SYMBOLS", DEFAULT_TARGET_SYMBOLS),
            history_days: env.parse_or("HOT_STOCK_DAYS", defaults.detector.history_days)?,
            volume_threshold: env
                .parse_or("VOLUME_THRESHOLD", defaults.detector.volume_threshold)?,
            price_threshold: env
                .parse_or("PRICE_CHANGE_THRESHOLD", defaults.detector.price_threshold)?,
        };

        Ok(Self {
            news_api_key: env.get("NEWS_API_KEY").map(str::to_string),
            llm_backend,
            openai_api_key: env.get("OPENAI_API_KEY").map(str::to_string),
            anthropic_api_key: env.get("ANTHROPIC_API_KEY").map(str::to_string),
            openai_api_base: env.get("OPENAI_API_BASE").map(str::to_string),
            fred_api_key: env.get("FRED_API_KEY").map(str::to_string),
            recipient: env.get("RECIPIENT_EMAIL").map(str::to_string),
            log_level: env.string_or("LOG_LEVEL", &defaults.log_level),
            stages: defaults.stages,
            collector,
            narrator,
            detector,
            indicators: env.list_or("DEFAULT_INDICATORS", DEFAULT_INDICATORS),
            market_indices: env.list_or("DEFAULT_MARKET_INDICES", DEFAULT_MARKET_INDICES),
            economic_data_days: env
                .parse_or("ECONOMIC_DATA_DAYS", defaults.economic_data_days)?,
            market_data_days: env.parse_or("MARKET_DATA_DAYS", defaults.market_data_days)?,
            request_timeout: defaults.request_timeout,
        })
    }

    /// Key for the selected text-generation backend
    pub fn llm_api_key(&self) -> Option<&str> {
        match self.llm_backend {
            LlmBackend::OpenAi => self.openai_api_key.as_deref(),
            LlmBackend::Anthropic => self.anthropic_api_key.as_deref(),
        }
    }

    /// Validate the configuration against the selected stages
    pub fn validate(&self) -> Result<()> {
        if self.stages.is_empty() {
            return Err(IntelError::ConfigError(
                "At least one stage must be selected".to_string(),
            ));
        }

        if self.stages.news && self.news_api_key.is_none() {
            return Err(IntelError::ConfigError(
                "NEWS_API_KEY is required for the news stage".to_string(),
            ));
        }

        if self.stages.needs_narrator() && self.llm_api_key().is_none() {
            return Err(IntelError::ConfigError(format!(
                "{} is required for the news and outlook stages",
                self.llm_backend.key_var()
            )));
        }

        if self.stages.indicators && self.fred_api_key.is_none() {
            return Err(IntelError::ConfigError(
                "FRED_API_KEY is required for the indicators stage".to_string(),
            ));
        }

        if self.collector.max_items == 0 {
            return Err(IntelError::ConfigError(
                "MAX_NEWS_ARTICLES must be greater than 0".to_string(),
            ));
        }

        if self.narrator.model.is_empty() {
            return Err(IntelError::ConfigError(
                "The narrator model must not be empty".to_string(),
            ));
        }

        if self.stages.hot_stocks {
            self.detector.validate()?;
        }

        Ok(())
    }
}

/// Builder for IntelConfig
#[derive(Debug, Default)]
pub struct IntelConfigBuilder {
    config: IntelConfig,
}

impl IntelConfigBuilder {
    /// Start from an existing configuration
    pub fn from_config(config: IntelConfig) -> Self {
        Self { config }
    }

    pub fn stages(mut self, stages: StageSet) -> Self {
        self.config.stages = stages;
        self
    }

    pub fn news_api_key(mut self, key: impl Into<String>) -> Self {
        self.config.news_api_key = Some(key.into());
        self
    }

    pub fn openai_api_key(mut self, key: impl Into<String>) -> Self {
        self.config.openai_api_key = Some(key.into());
        self
    }

    /// Switch backend; the model resets to that backend's default
    pub fn llm_backend(mut self, backend: LlmBackend) -> Self {
        self.config.llm_backend = backend;
        self.config.narrator.model = backend.default_model().to_string();
        self
    }

    pub fn anthropic_api_key(mut self, key: impl Into<String>) -> Self {
        self.config.anthropic_api_key = Some(key.into());
        self
    }

    pub fn openai_api_base(mut self, base: impl Into<String>) -> Self {
        self.config.openai_api_base = Some(base.into());
        self
    }

    pub fn fred_api_key(mut self, key: impl Into<String>) -> Self {
        self.config.fred_api_key = Some(key.into());
        self
    }

    pub fn recipient(mut self, recipient: impl Into<String>) -> Self {
        self.config.recipient = Some(recipient.into());
        self
    }

    pub fn max_news_articles(mut self, max: usize) -> Self {
        self.config.collector.max_items = max;
        self
    }

    pub fn symbols<I, S>(mut self, symbols: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.config.detector.symbols = symbols.into_iter().map(Into::into).collect();
        self
    }

    pub fn thresholds(mut self, volume: f64, price: f64) -> Self {
        self.config.detector.volume_threshold = volume;
        self.config.detector.price_threshold = price;
        self
    }

    pub fn language(mut self, language: Language) -> Self {
        self.config.narrator.language = language;
        self
    }

    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.config.narrator.model = model.into();
        self
    }

    /// Build the configuration
    pub fn build(self) -> Result<IntelConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = IntelConfig::default();
        assert_eq!(config.collector.max_items, 10);
        assert_eq!(config.collector.max_terms, 3);
        assert_eq!(config.narrator.model, "gpt-4o-mini");
        assert_eq!(config.narrator.cooldown, Duration::from_secs(60));
        assert_eq!(config.narrator.pacing, Duration::from_secs(1));
        assert_eq!(config.detector.symbols, vec!["7203.T", "6758.T", "AAPL", "MSFT"]);
        assert!((config.detector.volume_threshold - 2.0).abs() < f64::EPSILON);
        assert_eq!(config.market_indices.len(), 4);
        assert_eq!(config.stages, StageSet::all());
    }

    #[test]
    fn test_from_reader() {
        let env = EnvReader::from_pairs([
            ("NEWS_API_KEY", "news"),
            ("OPENAI_API_KEY", "sk-test"),
            ("MAX_NEWS_ARTICLES", "30"),
            ("TARGET_SYMBOLS", "9984.T,NVDA"),
            ("VOLUME_THRESHOLD", "3.5"),
            ("REPORT_LANGUAGE", "ja"),
            ("RECIPIENT_EMAIL", "desk@example.com"),
        ]);

        let config = IntelConfig::from_reader(&env).unwrap();
        assert_eq!(config.news_api_key.as_deref(), Some("news"));
        assert_eq!(config.collector.max_items, 30);
        assert_eq!(config.detector.symbols, vec!["9984.T", "NVDA"]);
        assert!((config.detector.volume_threshold - 3.5).abs() < f64::EPSILON);
        assert!((config.detector.price_threshold - 0.05).abs() < f64::EPSILON);
        assert_eq!(config.narrator.language, Language::Japanese);
        assert_eq!(config.recipient.as_deref(), Some("desk@example.com"));
        assert!(config.fred_api_key.is_none());
    }

    #[test]
    fn test_from_reader_rejects_bad_values() {
        let env = EnvReader::from_pairs([("HOT_STOCK_DAYS", "five")]);
        assert!(matches!(
            IntelConfig::from_reader(&env),
            Err(IntelError::ConfigError(_))
        ));

        let env = EnvReader::from_pairs([("REPORT_LANGUAGE", "fr")]);
        assert!(IntelConfig::from_reader(&env).is_err());
    }

    #[test]
    fn test_validate_required_keys_per_stage() {
        let hot_only = StageSet {
            hot_stocks: true,
            ..StageSet::none()
        };
        assert!(IntelConfig::builder().stages(hot_only).build().is_ok());

        let news_only = StageSet {
            news: true,
            ..StageSet::none()
        };
        let err = IntelConfig::builder().stages(news_only).build().unwrap_err();
        assert!(err.to_string().contains("NEWS_API_KEY"));

        let err = IntelConfig::builder()
            .stages(news_only)
            .news_api_key("k")
            .build()
            .unwrap_err();
        assert!(err.to_string().contains("OPENAI_API_KEY"));

        let indicators_only = StageSet {
            indicators: true,
            ..StageSet::none()
        };
        let err = IntelConfig::builder()
            .stages(indicators_only)
            .build()
            .unwrap_err();
        assert!(err.to_string().contains("FRED_API_KEY"));
    }

    #[test]
    fn test_anthropic_backend_from_reader() {
        let env = EnvReader::from_pairs([
            ("LLM_PROVIDER", "Anthropic"),
            ("OPENAI_API_KEY", "sk-unused"),
        ]);
        let mut config = IntelConfig::from_reader(&env).unwrap();
        assert_eq!(config.llm_backend, LlmBackend::Anthropic);
        assert_eq!(config.narrator.model, "claude-3-5-haiku-latest");
        config.stages = StageSet::parse("outlook").unwrap();

        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("ANTHROPIC_API_KEY"));

        config.anthropic_api_key = Some("sk-ant".to_string());
        assert!(config.validate().is_ok());
        assert_eq!(config.llm_api_key(), Some("sk-ant"));

        let built = IntelConfig::builder()
            .stages(StageSet::parse("outlook").unwrap())
            .llm_backend(LlmBackend::Anthropic)
            .anthropic_api_key("sk-ant")
            .build()
            .unwrap();
        assert_eq!(built.narrator.model, LlmBackend::Anthropic.default_model());

        let env = EnvReader::from_pairs([("LLM_PROVIDER", "mistral")]);
        assert!(IntelConfig::from_reader(&env).is_err());
    }

    #[test]
    fn test_negative_day_windows_are_rejected() {
        for key in ["ECONOMIC_DATA_DAYS", "MARKET_DATA_DAYS"] {
            let env = EnvReader::from_pairs([(key, "-30")]);
            assert!(
                matches!(IntelConfig::from_reader(&env), Err(IntelError::ConfigError(_))),
                "{key} accepted a negative window"
            );
        }
        let env = EnvReader::from_pairs([("ECONOMIC_DATA_DAYS", "90")]);
        assert_eq!(IntelConfig::from_reader(&env).unwrap().economic_data_days, 90);
    }

    #[test]
    fn test_validate_thresholds() {
        let hot_only = StageSet {
            hot_stocks: true,
            ..StageSet::none()
        };
        assert!(
            IntelConfig::builder()
                .stages(hot_only)
                .thresholds(0.0, 0.05)
                .build()
                .is_err()
        );
        assert!(
            IntelConfig::builder()
                .stages(hot_only)
                .thresholds(2.0, f64::NAN)
                .build()
                .is_err()
        );
    }

    #[test]
    fn test_stage_parsing() {
        assert_eq!(StageSet::parse("all").unwrap(), StageSet::all());
        let stages = StageSet::parse("indicators,outlook").unwrap();
        assert!(stages.indicators && stages.outlook);
        assert!(!stages.news);
        assert_eq!(stages.to_string(), "indicators,outlook");
        assert!(stages.needs_narrator());

        assert!(StageSet::parse("charts").is_err());
        assert!(StageSet::parse("").is_err());
    }
}
