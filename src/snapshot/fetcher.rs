//! Borrow snapshot fetcher

use super::TokenBorrowSnapshot;
use crate::exchange::{ExchangeApi, FetchError, MarginAsset};
use chrono::{DateTime, Utc};
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

/// Reads the margin statistics of all tracked assets
pub struct SnapshotFetcher<E: ExchangeApi> {
    exchange: Arc<E>,
    excluded: HashSet<String>,
    retry_delay: Duration,
}

impl<E: ExchangeApi> SnapshotFetcher<E> {
    /// Create a fetcher that skips the given assets
    pub fn new(exchange: Arc<E>, excluded: impl IntoIterator<Item = String>) -> Self {
        Self {
            exchange,
            excluded: excluded.into_iter().collect(),
            retry_delay: Duration::from_secs(2),
        }
    }

    /// Set the pause before the single transient retry
    pub fn retry_delay(mut self, delay: Duration) -> Self {
        self.retry_delay = delay;
        self
    }

    pub fn is_tracked(&self, asset: &str) -> bool {
        !self.excluded.contains(asset)
    }

    /// Fetch the current snapshot
    ///
    /// Transient failures are retried once; anything else is returned
    /// to the caller, which tries again on the next cycle.
    pub async fn fetch(&self, now: DateTime<Utc>) -> Result<TokenBorrowSnapshot, FetchError> {
        let assets = match self.exchange.margin_assets().await {
            Ok(assets) => assets,
            Err(e) if e.is_transient() => {
                tracing::warn!(error = %e, "Transient snapshot failure, retrying once");
                tokio::time::sleep(self.retry_delay).await;
                self.exchange.margin_assets().await?
            }
            Err(e) => return Err(e),
        };

        Ok(self.build(now, assets))
    }

    fn build(&self, now: DateTime<Utc>, assets: Vec<MarginAsset>) -> TokenBorrowSnapshot {
        let total = assets.len();
        let snapshot = TokenBorrowSnapshot::new(
            now,
            assets.into_iter().filter(|a| self.is_tracked(&a.asset)),
        );

        tracing::debug!(
            total,
            tracked = snapshot.len(),
            "Fetched margin borrow snapshot"
        );

        snapshot
    }
}
