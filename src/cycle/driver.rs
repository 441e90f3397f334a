//! Poll cycle driver
//!
//! One cycle: fetch snapshot, compare with the previous one, build and
//! deliver reports for every asset whose borrow went up. Nothing inside a
//! cycle is fatal; failures are logged and the next cycle starts fresh.

use crate::config::{ExchangeConfig, PollConfig};
use crate::delivery::{render_new_listing, MessageSink};
use crate::detector::{detect_increases, new_listings, triggered_symbols};
use crate::exchange::ExchangeApi;
use crate::report::{PerpetualListing, ReportBuilder};
use crate::snapshot::{SnapshotFetcher, TokenBorrowSnapshot};
use crate::telemetry::{self, CycleMetric};
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// State carried from one cycle to the next
#[derive(Debug, Default)]
pub struct CycleState {
    /// Last successfully fetched snapshot
    pub previous: Option<TokenBorrowSnapshot>,
    pub listing: PerpetualListing,
    /// Time of the last report per asset
    pub last_signals: HashMap<String, DateTime<Utc>>,
}

/// Result of one cycle
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CycleOutcome {
    /// Snapshot unavailable; previous snapshot kept
    FetchFailed,
    /// First snapshot stored, nothing to compare
    Seeded { tracked: usize },
    /// No borrow increase
    NoChange { new_assets: usize },
    /// Reports built for the triggered assets
    Reported {
        triggered: Vec<String>,
        delivered: usize,
        failed: usize,
    },
}

impl CycleOutcome {
    fn metric(&self) -> CycleMetric {
        match self {
            CycleOutcome::FetchFailed => CycleMetric::FetchFailed,
            CycleOutcome::Seeded { .. } => CycleMetric::Seeded,
            CycleOutcome::NoChange { .. } => CycleMetric::NoChange,
            CycleOutcome::Reported { .. } => CycleMetric::Reported,
        }
    }
}

/// Runs poll cycles against an exchange and a message sink
pub struct CycleDriver<E: ExchangeApi, S: MessageSink> {
    exchange: Arc<E>,
    fetcher: SnapshotFetcher<E>,
    builder: ReportBuilder<E>,
    sink: Arc<S>,
    listing_max_age: chrono::Duration,
    announce_new_assets: bool,
}

impl<E: ExchangeApi, S: MessageSink> CycleDriver<E, S> {
    pub fn new(
        exchange: Arc<E>,
        sink: Arc<S>,
        exchange_config: &ExchangeConfig,
        poll: &PollConfig,
    ) -> Self {
        let fetcher = SnapshotFetcher::new(
            Arc::clone(&exchange),
            exchange_config.excluded_assets.iter().cloned(),
        )
        .retry_delay(Duration::from_millis(poll.retry_delay_ms));

        let builder = ReportBuilder::new(Arc::clone(&exchange), &exchange_config.quote_asset)
            .concurrency(poll.report_concurrency);

        Self {
            exchange,
            fetcher,
            builder,
            sink,
            listing_max_age: chrono::Duration::seconds(
                i64::try_from(poll.listing_refresh_secs).unwrap_or(i64::MAX / 1000),
            ),
            announce_new_assets: poll.announce_new_assets,
        }
    }

    /// Run one cycle at `now`
    pub async fn run_cycle(&self, state: &mut CycleState, now: DateTime<Utc>) -> CycleOutcome {
        let started = Instant::now();
        let outcome = self.cycle(state, now).await;
        let elapsed = started.elapsed();

        telemetry::record_cycle(outcome.metric(), elapsed);
        tracing::info!(?outcome, elapsed_ms = elapsed.as_millis() as u64, "Cycle finished");

        outcome
    }

    async fn cycle(&self, state: &mut CycleState, now: DateTime<Utc>) -> CycleOutcome {
        let current = match self.fetcher.fetch(now).await {
            Ok(snapshot) => snapshot,
            Err(e) => {
                telemetry::record_fetch_failure(e.endpoint());
                tracing::error!(error = %e, "Snapshot fetch failed, keeping previous snapshot");
                self.alert(&format!("Borrow snapshot fetch failed: {e}")).await;
                return CycleOutcome::FetchFailed;
            }
        };
        telemetry::set_tracked_assets(current.len());

        let Some(previous) = state.previous.as_ref() else {
            let tracked = current.len();
            tracing::info!(tracked, "Stored first borrow snapshot");
            state.previous = Some(current);
            return CycleOutcome::Seeded { tracked };
        };

        let changes = detect_increases(previous, &current);
        let new_assets = if self.announce_new_assets {
            new_listings(previous, &current)
        } else {
            Vec::new()
        };
        state.previous = Some(current);

        for symbol in &new_assets {
            tracing::info!(symbol = %symbol, "New margin asset");
            self.send(&render_new_listing(symbol)).await;
        }

        if changes.is_empty() {
            return CycleOutcome::NoChange {
                new_assets: new_assets.len(),
            };
        }

        let triggered: Vec<String> = triggered_symbols(&changes).into_iter().collect();
        tracing::info!(?triggered, "Borrow increased");

        state
            .listing
            .refresh_if_stale(self.exchange.as_ref(), now, self.listing_max_age)
            .await;

        let reports = self
            .builder
            .build_many(&changes, &state.listing, now, &state.last_signals)
            .await;

        let (mut delivered, mut failed) = (0, 0);
        for report in &reports {
            state.last_signals.insert(report.symbol.clone(), now);

            let result = self.sink.deliver(report).await;
            telemetry::record_delivery(result.is_ok());
            match result {
                Ok(()) => delivered += 1,
                Err(e) => {
                    failed += 1;
                    tracing::error!(
                        report_id = %report.id,
                        symbol = %report.symbol,
                        error = %e,
                        "Report delivery failed"
                    );
                }
            }
        }

        CycleOutcome::Reported {
            triggered,
            delivered,
            failed,
        }
    }

    async fn send(&self, text: &str) {
        let result = self.sink.send(text).await;
        telemetry::record_delivery(result.is_ok());
        if let Err(e) = result {
            tracing::error!(error = %e, "Message delivery failed");
        }
    }

    async fn alert(&self, text: &str) {
        if let Err(e) = self.sink.alert(text).await {
            tracing::warn!(error = %e, "Alert delivery failed");
        }
    }
}
