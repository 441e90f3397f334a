//! Token report assembly
//!
//! All metric reads of one report run concurrently. A failed read only
//! blanks its own section; the report is always produced.

use super::{
    LongShortSection, MarginSection, PerpetualListing, ReportError, Section, TokenReport,
    VolumeSection,
};
use crate::detector::BorrowChange;
use crate::exchange::{ExchangeApi, FetchError, SeriesPoint};
use crate::window::{common_anchor, volume_series, MetricKind, WindowAggregator, WindowDeltas};
use chrono::{DateTime, Utc};
use futures_util::{stream, StreamExt};
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use uuid::Uuid;

/// Builds one report per triggering asset
pub struct ReportBuilder<E: ExchangeApi> {
    exchange: Arc<E>,
    aggregator: WindowAggregator,
    quote_asset: String,
    concurrency: usize,
}

impl<E: ExchangeApi> ReportBuilder<E> {
    pub fn new(exchange: Arc<E>, quote_asset: impl Into<String>) -> Self {
        Self {
            exchange,
            aggregator: WindowAggregator::default(),
            quote_asset: quote_asset.into(),
            concurrency: 4,
        }
    }

    pub fn aggregator(mut self, aggregator: WindowAggregator) -> Self {
        self.aggregator = aggregator;
        self
    }

    /// Maximum number of reports built at the same time
    pub fn concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    /// Trading pair of an asset (e.g., "PEPE" -> "PEPEUSDT")
    pub fn pair_for(&self, symbol: &str) -> String {
        format!("{}{}", symbol, self.quote_asset)
    }

    /// Build the report of one asset
    pub async fn build(
        &self,
        change: &BorrowChange,
        listing: &PerpetualListing,
        now: DateTime<Utc>,
        last_signal: Option<DateTime<Utc>>,
    ) -> TokenReport {
        let id = Uuid::new_v4();
        let symbol = change.symbol().to_string();
        let pair = self.pair_for(&symbol);
        let listed = listing.lists(&pair);
        let has_futures = listed == Some(true);
        let exchange = &self.exchange;

        let (daily, candles, funding, open_interest, long_short) = tokio::join!(
            exchange.daily_volume(&pair),
            exchange.volume_candles(&pair),
            futures_read(has_futures, exchange.funding_info(&pair)),
            futures_read(has_futures, exchange.open_interest_history(&pair)),
            futures_read(has_futures, exchange.long_short_ratio_history(&pair)),
        );

        let volume = candles
            .map(|candles| volume_series(&candles, now))
            .map_err(|e| fetch_failed(MetricKind::Volume.label(), e));
        let open_interest =
            open_interest.map(|r| r.map_err(|e| fetch_failed(MetricKind::OpenInterest.label(), e)));
        let long_short = long_short
            .map(|r| r.map_err(|e| fetch_failed(MetricKind::LongShortRatio.label(), e)));

        let anchor = {
            let mut series: Vec<&[SeriesPoint]> = Vec::new();
            if let Ok((buy, sell)) = &volume {
                series.push(buy);
                series.push(sell);
            }
            for points in [&open_interest, &long_short].into_iter().flatten().flatten() {
                series.push(points);
            }
            common_anchor(series)
        };

        let report = TokenReport {
            id,
            pair,
            generated_at: now,
            anchor,
            margin: MarginSection::from(change),
            daily_volume: daily.map_err(|e| fetch_failed("daily_volume", e)).into(),
            volume: volume
                .and_then(|(buy, sell)| self.volume_section(&buy, &sell, anchor))
                .into(),
            funding: futures_section(
                "funding",
                listed,
                funding.map(|r| r.map_err(|e| fetch_failed("funding", e))),
            ),
            open_interest: futures_section(
                MetricKind::OpenInterest.label(),
                listed,
                open_interest.map(|r| {
                    r.and_then(|points| {
                        self.deltas(MetricKind::OpenInterest, &points, anchor)
                            .map(|(_, deltas)| deltas)
                    })
                }),
            ),
            long_short: futures_section(
                MetricKind::LongShortRatio.label(),
                listed,
                long_short.map(|r| {
                    r.and_then(|points| {
                        self.deltas(MetricKind::LongShortRatio, &points, anchor)
                            .map(|(current, deltas)| LongShortSection { current, deltas })
                    })
                }),
            ),
            since_last_signal: last_signal.map(|at| now - at),
            symbol,
        };

        for (section, reason) in report.unavailable_sections() {
            crate::telemetry::record_partial_data(section);
            tracing::warn!(
                report_id = %report.id,
                symbol = %report.symbol,
                section,
                reason,
                "Report section unavailable"
            );
        }

        tracing::debug!(
            report_id = %report.id,
            symbol = %report.symbol,
            listed = ?listed,
            anchor = ?report.anchor,
            "Built token report"
        );

        report
    }

    /// Build reports for several assets, keeping input order
    pub async fn build_many(
        &self,
        changes: &[BorrowChange],
        listing: &PerpetualListing,
        now: DateTime<Utc>,
        last_signals: &HashMap<String, DateTime<Utc>>,
    ) -> Vec<TokenReport> {
        stream::iter(changes)
            .map(|change| {
                let last_signal = last_signals.get(change.symbol()).copied();
                self.build(change, listing, now, last_signal)
            })
            .buffered(self.concurrency)
            .collect()
            .await
    }

    fn volume_section(
        &self,
        buy: &[SeriesPoint],
        sell: &[SeriesPoint],
        anchor: Option<DateTime<Utc>>,
    ) -> Result<VolumeSection, ReportError> {
        let (_, buy_deltas) = self.deltas(MetricKind::Volume, buy, anchor)?;
        let (_, sell_deltas) = self.deltas(MetricKind::Volume, sell, anchor)?;
        let buy_sell_ratios = anchor
            .map(|at| self.aggregator.ratio_over(buy, sell, at))
            .unwrap_or_default();

        Ok(VolumeSection {
            buy: buy_deltas,
            sell: sell_deltas,
            buy_sell_ratios,
        })
    }

    /// Value at the anchor and the per-window deltas of one series
    fn deltas(
        &self,
        kind: MetricKind,
        series: &[SeriesPoint],
        anchor: Option<DateTime<Utc>>,
    ) -> Result<(Decimal, WindowDeltas), ReportError> {
        let missing = |reason: &str| ReportError::PartialDataUnavailable {
            metric: kind.label(),
            reason: reason.to_string(),
        };

        let anchor = anchor.ok_or_else(|| missing("no common timestamp across series"))?;
        let current = self
            .aggregator
            .value_at(series, anchor)
            .ok_or_else(|| missing("no data point at the anchor"))?;

        Ok((current, self.aggregator.aggregate(kind, series, anchor)))
    }
}

/// Futures reads are skipped for assets without a perpetual contract
async fn futures_read<T>(
    listed: bool,
    read: impl Future<Output = Result<T, FetchError>>,
) -> Option<Result<T, FetchError>> {
    if listed {
        Some(read.await)
    } else {
        None
    }
}

/// Skipped reads are `NotListed` only when the listing is known
fn futures_section<T>(
    metric: &'static str,
    listed: Option<bool>,
    result: Option<Result<T, ReportError>>,
) -> Section<T> {
    match (result, listed) {
        (Some(result), _) => result.into(),
        (None, Some(_)) => Section::NotListed,
        (None, None) => ReportError::PartialDataUnavailable {
            metric,
            reason: "perpetual listing unavailable".to_string(),
        }
        .into(),
    }
}

fn fetch_failed(metric: &'static str, err: FetchError) -> ReportError {
    crate::telemetry::record_fetch_failure(err.endpoint());
    ReportError::PartialDataUnavailable {
        metric,
        reason: err.to_string(),
    }
}
