//! Exchange data types

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors returned by exchange reads
#[derive(Debug, Error)]
pub enum FetchError {
    /// Upstream unreachable, timed out or dropped the connection
    #[error("{endpoint} request failed: {source}")]
    Transport {
        endpoint: &'static str,
        #[source]
        source: reqwest::Error,
    },
    /// Non-success HTTP status without a recognizable error body
    #[error("{endpoint} returned HTTP {status}: {body}")]
    Status {
        endpoint: &'static str,
        status: u16,
        body: String,
    },
    /// Exchange rejected the request with an error payload
    #[error("{endpoint} rejected request with HTTP {status} ({code}): {message}")]
    Api {
        endpoint: &'static str,
        status: u16,
        code: i64,
        message: String,
    },
    /// Payload could not be decoded
    #[error("malformed {endpoint} response: {reason}")]
    Malformed {
        endpoint: &'static str,
        reason: String,
    },
}

impl FetchError {
    /// Whether an immediate retry has a reasonable chance to succeed
    pub fn is_transient(&self) -> bool {
        match self {
            FetchError::Transport { .. } => true,
            FetchError::Status { status, .. } | FetchError::Api { status, .. } => {
                *status >= 500 || *status == 429
            }
            FetchError::Malformed { .. } => false,
        }
    }

    /// Name of the endpoint that failed
    pub fn endpoint(&self) -> &'static str {
        match self {
            FetchError::Transport { endpoint, .. }
            | FetchError::Status { endpoint, .. }
            | FetchError::Api { endpoint, .. }
            | FetchError::Malformed { endpoint, .. } => endpoint,
        }
    }
}

/// Margin borrow/repay statistics for one asset
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarginAsset {
    /// Asset symbol (e.g., "PEPE")
    pub asset: String,
    /// Amount borrowed over the last 24h, in asset units
    pub total_borrow: Decimal,
    /// Amount repaid over the last 24h, in asset units
    pub total_repay: Decimal,
    pub total_borrow_usdt: Decimal,
    pub total_repay_usdt: Decimal,
    /// Inventory still available to borrow
    pub available: Decimal,
}

/// 24h spot volume for a trading pair
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyVolume {
    pub symbol: String,
    /// Base asset volume
    pub volume: Decimal,
    /// Quote (USDT) volume
    pub quote_volume: Decimal,
}

/// Taker buy/sell quote volume of one 5-minute candle
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VolumeCandle {
    pub open_time: DateTime<Utc>,
    pub close_time: DateTime<Utc>,
    pub buy_quote_volume: Decimal,
    pub sell_quote_volume: Decimal,
}

impl VolumeCandle {
    /// A candle is closed once its close time has passed
    pub fn is_closed(&self, now: DateTime<Utc>) -> bool {
        self.close_time <= now
    }
}

/// Current funding rate and next payment time of a perpetual contract
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FundingInfo {
    pub symbol: String,
    pub rate: Decimal,
    pub next_funding_time: DateTime<Utc>,
}

/// A single timestamped value of a metric series
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeriesPoint {
    pub timestamp: DateTime<Utc>,
    pub value: Decimal,
}

impl SeriesPoint {
    pub fn new(timestamp: DateTime<Utc>, value: Decimal) -> Self {
        Self { timestamp, value }
    }
}
