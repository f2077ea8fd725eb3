use serde::Deserialize;
use std::fs;
use std::time::Duration;
use thiserror::Error;

use crate::fetcher::RetryPolicy;
use crate::market::Timeframe;
use crate::model::DEFAULT_EMA_PERIODS;

#[derive(Debug, Clone, Deserialize)]
pub struct CoinConfig {
    pub id: String,
    #[serde(default)]
    pub symbol: Option<String>,
}

impl CoinConfig {
    /// Ticker for log lines; falls back to the API id.
    pub fn label(&self) -> &str {
        self.symbol.as_deref().unwrap_or(&self.id)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,
    #[serde(default = "default_vs_currency")]
    pub vs_currency: String,
    #[serde(default)]
    pub timeframe: Timeframe,
    pub coins: Vec<CoinConfig>,
    #[serde(default = "default_ema_periods")]
    pub ema_periods: Vec<usize>,
    #[serde(default = "default_refresh_interval_seconds")]
    pub refresh_interval_seconds: u64,
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    #[serde(default = "default_initial_backoff_ms")]
    pub initial_backoff_ms: u64,
    #[serde(default = "default_request_timeout_seconds")]
    pub request_timeout_seconds: u64,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config: {0}")]
    Io(#[from] std::io::Error),
    #[error("cannot parse config: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}

fn default_api_base_url() -> String {
    "https://api.coingecko.com/api/v3".into()
}

fn default_vs_currency() -> String {
    "usd".into()
}

fn default_ema_periods() -> Vec<usize> {
    DEFAULT_EMA_PERIODS.to_vec()
}

fn default_refresh_interval_seconds() -> u64 {
    300
}

fn default_max_retries() -> u32 {
    3
}

fn default_initial_backoff_ms() -> u64 {
    1000
}

fn default_request_timeout_seconds() -> u64 {
    10
}

impl AppConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.coins.is_empty() {
            return Err(ConfigError::Invalid("no coins configured".into()));
        }
        if let Some(pos) = self.coins.iter().position(|c| c.id.trim().is_empty()) {
            return Err(ConfigError::Invalid(format!("coin #{pos} has an empty id")));
        }
        reqwest::Url::parse(&self.api_base_url)
            .map_err(|e| ConfigError::Invalid(format!("api_base_url: {e}")))?;
        if self.vs_currency.trim().is_empty() {
            return Err(ConfigError::Invalid("vs_currency is empty".into()));
        }
        if self.ema_periods.is_empty() {
            return Err(ConfigError::Invalid("ema_periods is empty".into()));
        }
        if self.ema_periods.contains(&0) {
            return Err(ConfigError::Invalid("ema_periods must be positive".into()));
        }
        if self.refresh_interval_seconds == 0 {
            let msg = "refresh_interval_seconds must be positive";
            return Err(ConfigError::Invalid(msg.into()));
        }
        if self.request_timeout_seconds == 0 {
            let msg = "request_timeout_seconds must be positive";
            return Err(ConfigError::Invalid(msg.into()));
        }
        self.retry_policy()
            .map_err(|e| ConfigError::Invalid(e.to_string()))?;
        Ok(())
    }

    pub fn retry_policy(&self) -> Result<RetryPolicy, crate::model::FetchError> {
        RetryPolicy::from_millis(self.max_retries, self.initial_backoff_ms)
    }

    pub fn refresh_interval(&self) -> Duration {
        Duration::from_secs(self.refresh_interval_seconds)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_seconds)
    }
}

pub fn parse_config(content: &str) -> Result<AppConfig, ConfigError> {
    let config: AppConfig = serde_json::from_str(content)?;
    config.validate()?;
    Ok(config)
}

pub fn load_config(path: &str) -> Result<AppConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    parse_config(&content)
}
