//! Binance REST client
//!
//! Margin statistics come from the public `bapi` gateway on www.binance.com,
//! spot data from api.binance.com and futures data from fapi.binance.com.
//! Open interest and long/short history are only published in 5-minute
//! buckets aligned to 5-minute boundaries.

use super::{
    DailyVolume, ExchangeApi, FetchError, FundingInfo, MarginAsset, SeriesPoint, VolumeCandle,
};
use crate::config::ExchangeConfig;
use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use reqwest::Client;
use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::collections::{HashMap, HashSet};
use std::str::FromStr;
use std::time::Duration;

pub const BINANCE_SPOT_URL: &str = "https://api.binance.com";
pub const BINANCE_FUTURES_URL: &str = "https://fapi.binance.com";
pub const BINANCE_MARGIN_URL: &str = "https://www.binance.com";

const BORROW_REPAY_PATH: &str = "/bapi/margin/v1/public/margin/statistics/24h-borrow-and-repay";
const AVAILABLE_INVENTORY_PATH: &str =
    "/bapi/margin/v1/public/margin/marketStats/available-inventory";
const DAILY_VOLUME_PATH: &str = "/api/v3/ticker/24hr";
const KLINES_PATH: &str = "/api/v3/klines";
const EXCHANGE_INFO_PATH: &str = "/fapi/v1/exchangeInfo";
const PREMIUM_INDEX_PATH: &str = "/fapi/v1/premiumIndex";
const OPEN_INTEREST_PATH: &str = "/futures/data/openInterestHist";
const LONG_SHORT_RATIO_PATH: &str = "/futures/data/globalLongShortAccountRatio";

/// Granularity of every history read
const HISTORY_PERIOD: &str = "5m";

/// Configuration for the Binance client
#[derive(Debug, Clone)]
pub struct BinanceConfig {
    pub spot_url: String,
    pub futures_url: String,
    pub margin_url: String,
    /// Per-request timeout
    pub timeout: Duration,
    /// Number of 5-minute points requested per history read (4h needs 49)
    pub history_limit: u32,
}

impl Default for BinanceConfig {
    fn default() -> Self {
        Self {
            spot_url: BINANCE_SPOT_URL.to_string(),
            futures_url: BINANCE_FUTURES_URL.to_string(),
            margin_url: BINANCE_MARGIN_URL.to_string(),
            timeout: Duration::from_secs(10),
            history_limit: 50,
        }
    }
}

impl From<&ExchangeConfig> for BinanceConfig {
    fn from(config: &ExchangeConfig) -> Self {
        Self {
            spot_url: config.spot_url.clone(),
            futures_url: config.futures_url.clone(),
            margin_url: config.margin_url.clone(),
            timeout: Duration::from_secs(config.timeout_secs),
            history_limit: config.history_limit,
        }
    }
}

/// Envelope of the `bapi` gateway responses
#[derive(Debug, Deserialize)]
struct GatewayEnvelope<T> {
    data: T,
}

/// Error payloads returned by the REST and gateway APIs
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ErrorBody {
    /// `{"code":-1121,"msg":"Invalid symbol."}`
    Rest { code: i64, msg: String },
    /// `{"status":404,"error":"Not Found","message":"No message available"}`
    Gateway { status: i64, message: String },
}

#[derive(Debug, Deserialize)]
struct BorrowRepayData {
    coins: Vec<BorrowRepayCoin>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BorrowRepayCoin {
    asset: String,
    total_borrow: Decimal,
    total_repay: Decimal,
    total_borrow_in_usdt: Decimal,
    total_repay_in_usdt: Decimal,
}

#[derive(Debug, Deserialize)]
struct InventoryData {
    assets: HashMap<String, Decimal>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct MiniTicker {
    symbol: String,
    volume: Decimal,
    quote_volume: Decimal,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PremiumIndex {
    symbol: String,
    last_funding_rate: Decimal,
    next_funding_time: i64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct OpenInterestEntry {
    sum_open_interest_value: Decimal,
    timestamp: i64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LongShortEntry {
    long_short_ratio: Decimal,
    timestamp: i64,
}

#[derive(Debug, Deserialize)]
struct ExchangeInfo {
    symbols: Vec<ExchangeInfoSymbol>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ExchangeInfoSymbol {
    symbol: String,
    contract_type: String,
    status: String,
}

/// Binance market data client
pub struct BinanceClient {
    config: BinanceConfig,
    client: Client,
}

impl BinanceClient {
    /// Create a client with the public Binance endpoints
    pub fn new() -> anyhow::Result<Self> {
        Self::with_config(BinanceConfig::default())
    }

    /// Create a client with custom configuration
    pub fn with_config(config: BinanceConfig) -> anyhow::Result<Self> {
        let client = Client::builder().timeout(config.timeout).build()?;
        Ok(Self { config, client })
    }

    /// Send a GET request and decode the JSON body
    async fn get_json<T: DeserializeOwned>(
        &self,
        endpoint: &'static str,
        url: String,
        query: &[(&str, &str)],
    ) -> Result<T, FetchError> {
        tracing::debug!(endpoint, url = %url, "Requesting Binance data");

        let response = self
            .client
            .get(&url)
            .query(query)
            .send()
            .await
            .map_err(|source| FetchError::Transport { endpoint, source })?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|source| FetchError::Transport { endpoint, source })?;

        if !status.is_success() {
            return Err(match serde_json::from_str::<ErrorBody>(&body) {
                Ok(ErrorBody::Rest { code, msg }) => FetchError::Api {
                    endpoint,
                    status: status.as_u16(),
                    code,
                    message: msg,
                },
                Ok(ErrorBody::Gateway {
                    status: code,
                    message,
                }) => FetchError::Api {
                    endpoint,
                    status: status.as_u16(),
                    code,
                    message,
                },
                Err(_) => FetchError::Status {
                    endpoint,
                    status: status.as_u16(),
                    body,
                },
            });
        }

        serde_json::from_str(&body).map_err(|e| FetchError::Malformed {
            endpoint,
            reason: e.to_string(),
        })
    }

    async fn borrow_repay(&self) -> Result<Vec<BorrowRepayCoin>, FetchError> {
        let url = format!("{}{}", self.config.margin_url, BORROW_REPAY_PATH);
        let envelope: GatewayEnvelope<BorrowRepayData> =
            self.get_json("borrow_repay", url, &[]).await?;
        Ok(envelope.data.coins)
    }

    async fn available_inventory(&self) -> Result<HashMap<String, Decimal>, FetchError> {
        let url = format!("{}{}", self.config.margin_url, AVAILABLE_INVENTORY_PATH);
        let envelope: GatewayEnvelope<InventoryData> =
            self.get_json("available_inventory", url, &[]).await?;
        Ok(envelope.data.assets)
    }

    fn history_query<'a>(&self, pair: &'a str, limit: &'a str) -> [(&'a str, &'a str); 3] {
        [("symbol", pair), ("period", HISTORY_PERIOD), ("limit", limit)]
    }
}

#[async_trait]
impl ExchangeApi for BinanceClient {
    async fn margin_assets(&self) -> Result<Vec<MarginAsset>, FetchError> {
        let coins = self.borrow_repay().await?;
        let inventory = self.available_inventory().await?;

        let assets = coins
            .into_iter()
            .map(|coin| {
                let available = inventory.get(&coin.asset).copied().unwrap_or_else(|| {
                    tracing::warn!(asset = %coin.asset, "No available inventory for asset");
                    Decimal::ZERO
                });

                MarginAsset {
                    asset: coin.asset,
                    total_borrow: coin.total_borrow,
                    total_repay: coin.total_repay,
                    total_borrow_usdt: coin.total_borrow_in_usdt,
                    total_repay_usdt: coin.total_repay_in_usdt,
                    available,
                }
            })
            .collect();

        Ok(assets)
    }

    async fn daily_volume(&self, pair: &str) -> Result<DailyVolume, FetchError> {
        let url = format!("{}{}", self.config.spot_url, DAILY_VOLUME_PATH);
        let ticker: MiniTicker = self
            .get_json("ticker_24hr", url, &[("type", "MINI"), ("symbol", pair)])
            .await?;

        Ok(DailyVolume {
            symbol: ticker.symbol,
            volume: ticker.volume,
            quote_volume: ticker.quote_volume,
        })
    }

    async fn volume_candles(&self, pair: &str) -> Result<Vec<VolumeCandle>, FetchError> {
        let url = format!("{}{}", self.config.spot_url, KLINES_PATH);
        let limit = self.config.history_limit.to_string();
        let rows: Vec<Vec<serde_json::Value>> = self
            .get_json(
                "klines",
                url,
                &[("symbol", pair), ("interval", HISTORY_PERIOD), ("limit", limit.as_str())],
            )
            .await?;

        rows.iter()
            .map(|row| {
                parse_kline(row).map_err(|reason| FetchError::Malformed {
                    endpoint: "klines",
                    reason,
                })
            })
            .collect()
    }

    async fn funding_info(&self, pair: &str) -> Result<FundingInfo, FetchError> {
        let url = format!("{}{}", self.config.futures_url, PREMIUM_INDEX_PATH);
        let index: PremiumIndex = self
            .get_json("premium_index", url, &[("symbol", pair)])
            .await?;

        let next_funding_time =
            millis_to_utc(index.next_funding_time).ok_or_else(|| FetchError::Malformed {
                endpoint: "premium_index",
                reason: format!("invalid nextFundingTime {}", index.next_funding_time),
            })?;

        Ok(FundingInfo {
            symbol: index.symbol,
            rate: index.last_funding_rate,
            next_funding_time,
        })
    }

    async fn open_interest_history(&self, pair: &str) -> Result<Vec<SeriesPoint>, FetchError> {
        let url = format!("{}{}", self.config.futures_url, OPEN_INTEREST_PATH);
        let limit = self.config.history_limit.to_string();
        let entries: Vec<OpenInterestEntry> = self
            .get_json("open_interest_hist", url, &self.history_query(pair, &limit))
            .await?;

        entries
            .into_iter()
            .map(|entry| {
                to_point(
                    "open_interest_hist",
                    entry.timestamp,
                    entry.sum_open_interest_value,
                )
            })
            .collect()
    }

    async fn long_short_ratio_history(
        &self,
        pair: &str,
    ) -> Result<Vec<SeriesPoint>, FetchError> {
        let url = format!("{}{}", self.config.futures_url, LONG_SHORT_RATIO_PATH);
        let limit = self.config.history_limit.to_string();
        let entries: Vec<LongShortEntry> = self
            .get_json("long_short_ratio", url, &self.history_query(pair, &limit))
            .await?;

        entries
            .into_iter()
            .map(|entry| to_point("long_short_ratio", entry.timestamp, entry.long_short_ratio))
            .collect()
    }

    async fn perpetual_pairs(&self) -> Result<HashSet<String>, FetchError> {
        let url = format!("{}{}", self.config.futures_url, EXCHANGE_INFO_PATH);
        let info: ExchangeInfo = self.get_json("exchange_info", url, &[]).await?;

        Ok(info
            .symbols
            .into_iter()
            .filter(|s| s.status == "TRADING" && s.contract_type == "PERPETUAL")
            .map(|s| s.symbol)
            .collect())
    }
}

fn millis_to_utc(millis: i64) -> Option<DateTime<Utc>> {
    Utc.timestamp_millis_opt(millis).single()
}

fn to_point(
    endpoint: &'static str,
    millis: i64,
    value: Decimal,
) -> Result<SeriesPoint, FetchError> {
    let timestamp = millis_to_utc(millis).ok_or_else(|| FetchError::Malformed {
        endpoint,
        reason: format!("invalid timestamp {}", millis),
    })?;
    Ok(SeriesPoint::new(timestamp, value))
}

/// Parse one kline row
///
/// Layout: `[openTime, open, high, low, close, volume, closeTime,
/// quoteVolume, trades, takerBuyBaseVolume, takerBuyQuoteVolume, ignore]`
fn parse_kline(row: &[serde_json::Value]) -> Result<VolumeCandle, String> {
    if row.len() < 11 {
        return Err(format!("expected at least 11 kline fields, got {}", row.len()));
    }

    let open_time = row[0]
        .as_i64()
        .and_then(millis_to_utc)
        .ok_or_else(|| format!("invalid open time {}", row[0]))?;
    let close_time = row[6]
        .as_i64()
        .and_then(millis_to_utc)
        .ok_or_else(|| format!("invalid close time {}", row[6]))?;

    let quote_volume = decimal_field(&row[7])?;
    let buy_quote_volume = decimal_field(&row[10])?;

    Ok(VolumeCandle {
        open_time,
        close_time,
        buy_quote_volume,
        sell_quote_volume: quote_volume - buy_quote_volume,
    })
}

fn decimal_field(value: &serde_json::Value) -> Result<Decimal, String> {
    match value {
        serde_json::Value::String(s) => {
            Decimal::from_str(s).map_err(|e| format!("invalid decimal {}: {}", s, e))
        }
        serde_json::Value::Number(n) => Decimal::from_str(&n.to_string())
            .map_err(|e| format!("invalid decimal {}: {}", n, e)),
        other => Err(format!("expected decimal, got {}", other)),
    }
}
