//! Configuration management with TOML, environment variables, and CLI overrides.

use crate::pricing::ExchangeRate;
use crate::steam::{CatalogSource, Pause, RetryPolicy};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, warn};

/// Application configuration with layered loading.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Number of search pages to list
    #[serde(default = "default_pages")]
    pub pages: u32,

    /// Catalog source
    #[serde(default)]
    pub source: CatalogSource,

    /// Concurrent comparison workers. Keep this small, the store
    /// rate-limits per client and per IP.
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,

    /// Delay between search pages in milliseconds
    #[serde(default = "default_delay_ms")]
    pub page_delay_ms: u64,

    /// Delay after each successful detail lookup in milliseconds
    #[serde(default = "default_delay_ms")]
    pub detail_delay_ms: u64,

    /// Random jitter added to both delays (0 to this value)
    #[serde(default)]
    pub delay_jitter_ms: u64,

    /// Attempts per search page
    #[serde(default = "default_page_attempts")]
    pub page_attempts: u32,

    /// Attempts per detail lookup
    #[serde(default = "default_detail_attempts")]
    pub detail_attempts: u32,

    /// First backoff delay in milliseconds, doubled on each retry
    #[serde(default = "default_backoff_base_ms")]
    pub backoff_base_ms: u64,

    /// Upper bound for a single backoff delay in milliseconds
    #[serde(default = "default_backoff_cap_ms")]
    pub backoff_cap_ms: u64,

    /// UAH to IDR multiplier
    #[serde(default)]
    pub exchange_rate: ExchangeRate,

    /// Console output format
    #[serde(default)]
    pub format: OutputFormat,

    /// CSV report path; `None` disables the file
    #[serde(default = "default_output")]
    pub output: Option<PathBuf>,

    /// Proxy URL (e.g., socks5://host:port)
    #[serde(default)]
    pub proxy: Option<String>,
}

fn default_pages() -> u32 {
    100
}

fn default_concurrency() -> usize {
    2
}

fn default_delay_ms() -> u64 {
    3000
}

fn default_page_attempts() -> u32 {
    3
}

fn default_detail_attempts() -> u32 {
    5
}

fn default_backoff_base_ms() -> u64 {
    1000
}

fn default_backoff_cap_ms() -> u64 {
    16000
}

fn default_output() -> Option<PathBuf> {
    Some(PathBuf::from("steam_price_comparison.csv"))
}

impl Default for Config {
    fn default() -> Self {
        Self {
            pages: default_pages(),
            source: CatalogSource::Search,
            concurrency: default_concurrency(),
            page_delay_ms: default_delay_ms(),
            detail_delay_ms: default_delay_ms(),
            delay_jitter_ms: 0,
            page_attempts: default_page_attempts(),
            detail_attempts: default_detail_attempts(),
            backoff_base_ms: default_backoff_base_ms(),
            backoff_cap_ms: default_backoff_cap_ms(),
            exchange_rate: ExchangeRate::default(),
            format: OutputFormat::Table,
            output: default_output(),
            proxy: None,
        }
    }
}

impl Config {
    /// Creates a new default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads configuration from a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        debug!("Loading config from: {}", path.display());

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    /// Loads configuration with fallback to default locations.
    pub fn load(explicit_path: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit_path {
            return Self::from_file(path);
        }

        let local_config = Path::new("config.toml");
        if local_config.exists() {
            debug!("Found config.toml in current directory");
            return Self::from_file(local_config);
        }

        if let Some(config_dir) = dirs::config_dir() {
            let xdg_config = config_dir.join("steam-price-gap").join("config.toml");
            if xdg_config.exists() {
                debug!("Found config in XDG config directory");
                return Self::from_file(xdg_config);
            }
        }

        debug!("No config file found, using defaults");
        Ok(Self::default())
    }

    /// Applies environment variable overrides. Unparseable values are
    /// reported and ignored.
    pub fn with_env(mut self) -> Self {
        if let Ok(proxy) = std::env::var("STEAM_GAP_PROXY") {
            self.proxy = Some(proxy);
        }

        if let Ok(delay) = std::env::var("STEAM_GAP_DELAY") {
            match delay.parse() {
                Ok(d) => {
                    self.page_delay_ms = d;
                    self.detail_delay_ms = d;
                }
                Err(_) => {
                    warn!("Ignoring STEAM_GAP_DELAY={:?}: not a number of milliseconds", delay)
                }
            }
        }

        if let Ok(concurrency) = std::env::var("STEAM_GAP_CONCURRENCY") {
            match concurrency.parse() {
                Ok(c) => self.concurrency = c,
                Err(_) => warn!("Ignoring STEAM_GAP_CONCURRENCY={:?}: not a number", concurrency),
            }
        }

        self
    }

    /// Backoff used for search pages.
    pub fn page_retry(&self) -> RetryPolicy {
        RetryPolicy::new(self.page_attempts, self.backoff_base(), self.backoff_cap())
    }

    /// Backoff used for detail lookups.
    pub fn detail_retry(&self) -> RetryPolicy {
        RetryPolicy::new(self.detail_attempts, self.backoff_base(), self.backoff_cap())
    }

    pub fn page_pause(&self) -> Pause {
        Pause::new(self.page_delay_ms, self.delay_jitter_ms)
    }

    pub fn detail_pause(&self) -> Pause {
        Pause::new(self.detail_delay_ms, self.delay_jitter_ms)
    }

    /// Worker pool width, never zero.
    pub fn workers(&self) -> usize {
        self.concurrency.max(1)
    }

    fn backoff_base(&self) -> Duration {
        Duration::from_millis(self.backoff_base_ms)
    }

    fn backoff_cap(&self) -> Duration {
        Duration::from_millis(self.backoff_cap_ms)
    }
}

/// Output format for the console report.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
    Markdown,
    Csv,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "table" => Ok(OutputFormat::Table),
            "json" => Ok(OutputFormat::Json),
            "markdown" | "md" => Ok(OutputFormat::Markdown),
            "csv" => Ok(OutputFormat::Csv),
            _ => Err(format!("Unknown format: {}. Use: table, json, markdown, csv", s)),
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Table => write!(f, "table"),
            OutputFormat::Json => write!(f, "json"),
            OutputFormat::Markdown => write!(f, "markdown"),
            OutputFormat::Csv => write!(f, "csv"),
        }
    }
}
