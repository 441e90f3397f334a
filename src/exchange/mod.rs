//! Exchange data module
//!
//! Read-only access to Binance margin, spot and futures market data

mod binance;
#[cfg(test)]
pub(crate) mod mock;
mod types;

pub use binance::{
    BinanceClient, BinanceConfig, BINANCE_FUTURES_URL, BINANCE_MARGIN_URL, BINANCE_SPOT_URL,
};
pub use types::{
    DailyVolume, FetchError, FundingInfo, MarginAsset, SeriesPoint, VolumeCandle,
};

use async_trait::async_trait;
use std::collections::HashSet;

/// Market data reads needed to detect borrow changes and build reports
///
/// Spot and futures reads take a trading pair (e.g., "PEPEUSDT").
/// History reads return 5-minute granular points in any order.
#[async_trait]
pub trait ExchangeApi: Send + Sync {
    /// Margin borrow/repay statistics for every margin asset
    async fn margin_assets(&self) -> Result<Vec<MarginAsset>, FetchError>;

    /// 24h spot volume
    async fn daily_volume(&self, pair: &str) -> Result<DailyVolume, FetchError>;

    /// Recent 5-minute spot candles with taker buy/sell split
    async fn volume_candles(&self, pair: &str) -> Result<Vec<VolumeCandle>, FetchError>;

    /// Current funding rate and next payment time
    async fn funding_info(&self, pair: &str) -> Result<FundingInfo, FetchError>;

    /// Open interest value history
    async fn open_interest_history(&self, pair: &str) -> Result<Vec<SeriesPoint>, FetchError>;

    /// Global long/short account ratio history
    async fn long_short_ratio_history(&self, pair: &str)
        -> Result<Vec<SeriesPoint>, FetchError>;

    /// Perpetual contracts currently trading
    async fn perpetual_pairs(&self) -> Result<HashSet<String>, FetchError>;
}
