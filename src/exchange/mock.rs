//! Scripted exchange for unit tests

use super::{
    DailyVolume, ExchangeApi, FetchError, FundingInfo, MarginAsset, SeriesPoint, VolumeCandle,
};
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::collections::{HashSet, VecDeque};
use std::sync::Mutex;

/// Number of 5-minute points in the fixture history (4h plus the anchor)
const HISTORY_POINTS: i64 = 49;

/// In-memory exchange with 4h of history ending at `anchor`
///
/// Reads listed in `failing` return a 503. Margin responses are queued;
/// an empty queue yields a 503 as well.
pub(crate) struct MockExchange {
    anchor: DateTime<Utc>,
    margin: Mutex<VecDeque<Result<Vec<MarginAsset>, FetchError>>>,
    perpetuals: Mutex<Result<HashSet<String>, ()>>,
    failing: HashSet<&'static str>,
    calls: Mutex<Vec<String>>,
}

impl MockExchange {
    pub fn new(anchor: DateTime<Utc>) -> Self {
        Self {
            anchor,
            margin: Mutex::new(VecDeque::new()),
            perpetuals: Mutex::new(Ok(HashSet::new())),
            failing: HashSet::new(),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn perpetual(self, pair: &str) -> Self {
        if let Ok(pairs) = self.perpetuals.lock().unwrap().as_mut() {
            pairs.insert(pair.to_string());
        }
        self
    }

    pub fn failing(mut self, endpoint: &'static str) -> Self {
        self.failing.insert(endpoint);
        self
    }

    pub fn push_margin(&self, response: Result<Vec<MarginAsset>, FetchError>) {
        self.margin.lock().unwrap().push_back(response);
    }

    pub fn push_amounts(&self, amounts: &[(&str, Decimal)]) {
        self.push_margin(Ok(amounts
            .iter()
            .map(|(symbol, borrow)| margin_asset(symbol, *borrow))
            .collect()));
    }

    pub fn set_perpetuals(&self, pairs: Result<HashSet<String>, ()>) {
        *self.perpetuals.lock().unwrap() = pairs;
    }

    /// Calls made so far as "endpoint" or "endpoint:pair"
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self, endpoint: &str) -> usize {
        self.calls()
            .iter()
            .filter(|c| c.split(':').next() == Some(endpoint))
            .count()
    }

    fn record(&self, endpoint: &'static str, pair: Option<&str>) -> Result<(), FetchError> {
        let call = match pair {
            Some(pair) => format!("{endpoint}:{pair}"),
            None => endpoint.to_string(),
        };
        self.calls.lock().unwrap().push(call);

        if self.failing.contains(endpoint) {
            Err(unavailable(endpoint))
        } else {
            Ok(())
        }
    }

    fn history(&self, value: impl Fn(i64) -> Decimal) -> Vec<SeriesPoint> {
        (0..HISTORY_POINTS)
            .map(|i| SeriesPoint::new(self.anchor - Duration::minutes(5 * i), value(i)))
            .collect()
    }
}

pub(crate) fn unavailable(endpoint: &'static str) -> FetchError {
    FetchError::Status {
        endpoint,
        status: 503,
        body: "Service Unavailable".to_string(),
    }
}

pub(crate) fn margin_asset(symbol: &str, borrow: Decimal) -> MarginAsset {
    MarginAsset {
        asset: symbol.to_string(),
        total_borrow: borrow,
        total_repay: dec!(10),
        total_borrow_usdt: borrow * dec!(0.5),
        total_repay_usdt: dec!(5),
        available: dec!(1000),
    }
}

#[async_trait]
impl ExchangeApi for MockExchange {
    async fn margin_assets(&self) -> Result<Vec<MarginAsset>, FetchError> {
        self.record("borrow_repay", None)?;
        self.margin
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(unavailable("borrow_repay")))
    }

    async fn daily_volume(&self, pair: &str) -> Result<DailyVolume, FetchError> {
        self.record("ticker_24hr", Some(pair))?;
        Ok(DailyVolume {
            symbol: pair.to_string(),
            volume: dec!(1000000),
            quote_volume: dec!(25000000),
        })
    }

    async fn volume_candles(&self, pair: &str) -> Result<Vec<VolumeCandle>, FetchError> {
        self.record("klines", Some(pair))?;
        Ok((0..HISTORY_POINTS)
            .map(|i| {
                let open_time = self.anchor - Duration::minutes(5 * i);
                VolumeCandle {
                    open_time,
                    close_time: open_time + Duration::minutes(5) - Duration::milliseconds(1),
                    buy_quote_volume: Decimal::from(100 + i),
                    sell_quote_volume: Decimal::from(50 + i),
                }
            })
            .collect())
    }

    async fn funding_info(&self, pair: &str) -> Result<FundingInfo, FetchError> {
        self.record("premium_index", Some(pair))?;
        Ok(FundingInfo {
            symbol: pair.to_string(),
            rate: dec!(0.0001),
            next_funding_time: self.anchor + Duration::hours(2),
        })
    }

    async fn open_interest_history(&self, pair: &str) -> Result<Vec<SeriesPoint>, FetchError> {
        self.record("open_interest_hist", Some(pair))?;
        Ok(self.history(|i| Decimal::from(1000 + 10 * i)))
    }

    async fn long_short_ratio_history(
        &self,
        pair: &str,
    ) -> Result<Vec<SeriesPoint>, FetchError> {
        self.record("long_short_ratio", Some(pair))?;
        Ok(self.history(|i| dec!(2) + Decimal::new(i, 2)))
    }

    async fn perpetual_pairs(&self) -> Result<HashSet<String>, FetchError> {
        self.record("exchange_info", None)?;
        self.perpetuals
            .lock()
            .unwrap()
            .clone()
            .map_err(|_| unavailable("exchange_info"))
    }
}
