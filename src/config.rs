//! Configuration types for margin-signal

use crate::exchange::{BINANCE_FUTURES_URL, BINANCE_MARGIN_URL, BINANCE_SPOT_URL};
use serde::Deserialize;

/// Root configuration structure
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub exchange: ExchangeConfig,
    #[serde(default)]
    pub poll: PollConfig,
    pub telegram: TelegramConfig,
    #[serde(default)]
    pub telemetry: TelemetryConfig,
}

/// Exchange API configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ExchangeConfig {
    /// Spot REST base URL
    #[serde(default = "default_spot_url")]
    pub spot_url: String,

    /// USD-M futures REST base URL
    #[serde(default = "default_futures_url")]
    pub futures_url: String,

    /// Margin statistics gateway base URL
    #[serde(default = "default_margin_url")]
    pub margin_url: String,

    /// Per-request timeout (seconds)
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Points requested per 5-minute history read
    #[serde(default = "default_history_limit")]
    pub history_limit: u32,

    /// Assets never tracked (stablecoins and majors)
    #[serde(default = "default_excluded_assets")]
    pub excluded_assets: Vec<String>,

    /// Quote asset appended to a margin asset to form its trading pair
    #[serde(default = "default_quote_asset")]
    pub quote_asset: String,
}

fn default_spot_url() -> String {
    BINANCE_SPOT_URL.to_string()
}
fn default_futures_url() -> String {
    BINANCE_FUTURES_URL.to_string()
}
fn default_margin_url() -> String {
    BINANCE_MARGIN_URL.to_string()
}
fn default_timeout_secs() -> u64 {
    10
}
fn default_history_limit() -> u32 {
    50
}
fn default_quote_asset() -> String {
    "USDT".to_string()
}
fn default_excluded_assets() -> Vec<String> {
    [
        "USD1", "USDT", "USDC", "USDP", "FDUSD", "BTC", "WBTC", "WBETH", "ETH", "SOL", "BNSOL",
        "XRP", "BNB", "ADA", "SUI", "LTC", "TRX", "PAXG", "DAI", "BFUSD",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

impl Default for ExchangeConfig {
    fn default() -> Self {
        Self {
            spot_url: default_spot_url(),
            futures_url: default_futures_url(),
            margin_url: default_margin_url(),
            timeout_secs: default_timeout_secs(),
            history_limit: default_history_limit(),
            excluded_assets: default_excluded_assets(),
            quote_asset: default_quote_asset(),
        }
    }
}

/// Poll cycle configuration
#[derive(Debug, Clone, Deserialize)]
pub struct PollConfig {
    /// Seconds between cycles
    #[serde(default = "default_interval_secs")]
    pub interval_secs: u64,

    /// Wait for the next 5-minute slot before the first cycle
    #[serde(default = "default_true")]
    pub align_to_slot: bool,

    /// Delay before retrying a transient snapshot failure (milliseconds)
    #[serde(default = "default_retry_delay_ms")]
    pub retry_delay_ms: u64,

    /// Maximum age of the cached perpetual listing (seconds)
    #[serde(default = "default_listing_refresh_secs")]
    pub listing_refresh_secs: u64,

    /// Reports built concurrently within one cycle
    #[serde(default = "default_report_concurrency")]
    pub report_concurrency: usize,

    /// Post a notice when a new margin asset appears
    #[serde(default = "default_true")]
    pub announce_new_assets: bool,
}

fn default_true() -> bool {
    true
}
fn default_interval_secs() -> u64 {
    300
}
fn default_retry_delay_ms() -> u64 {
    2_000
}
fn default_listing_refresh_secs() -> u64 {
    750
}
fn default_report_concurrency() -> usize {
    4
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            interval_secs: default_interval_secs(),
            align_to_slot: true,
            retry_delay_ms: default_retry_delay_ms(),
            listing_refresh_secs: default_listing_refresh_secs(),
            report_concurrency: default_report_concurrency(),
            announce_new_assets: true,
        }
    }
}

/// Telegram delivery configuration
#[derive(Debug, Clone, Deserialize)]
pub struct TelegramConfig {
    /// Bot token
    pub token: String,

    /// Chat receiving reports
    pub chat_id: String,

    /// Chat receiving cycle failure alerts
    #[serde(default)]
    pub error_chat_id: Option<String>,

    /// Bot API base URL
    #[serde(default = "default_telegram_api_url")]
    pub api_url: String,
}

fn default_telegram_api_url() -> String {
    "https://api.telegram.org".to_string()
}

/// Telemetry configuration
#[derive(Debug, Clone, Deserialize)]
pub struct TelemetryConfig {
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Emit JSON log lines instead of human-readable ones
    #[serde(default)]
    pub json_logs: bool,

    /// Serve Prometheus metrics on this port when set
    #[serde(default)]
    pub metrics_port: Option<u16>,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            json_logs: false,
            metrics_port: None,
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    pub fn load(path: impl AsRef<std::path::Path>) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }
}
