//! Perpetual contract listing cache

use crate::exchange::ExchangeApi;
use chrono::{DateTime, Duration, Utc};
use std::collections::HashSet;

/// Perpetual pairs trading on the futures exchange, refreshed lazily
#[derive(Debug, Clone, Default)]
pub struct PerpetualListing {
    pairs: HashSet<String>,
    refreshed_at: Option<DateTime<Utc>>,
}

impl PerpetualListing {
    pub fn new(pairs: impl IntoIterator<Item = String>, refreshed_at: DateTime<Utc>) -> Self {
        Self {
            pairs: pairs.into_iter().collect(),
            refreshed_at: Some(refreshed_at),
        }
    }

    pub fn contains(&self, pair: &str) -> bool {
        self.pairs.contains(pair)
    }

    /// Whether `pair` has a perpetual contract
    ///
    /// `None` until the listing has loaded once.
    pub fn lists(&self, pair: &str) -> Option<bool> {
        self.refreshed_at.map(|_| self.contains(pair))
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    pub fn refreshed_at(&self) -> Option<DateTime<Utc>> {
        self.refreshed_at
    }

    /// Never refreshed, or refreshed at least `max_age` ago
    pub fn is_stale(&self, now: DateTime<Utc>, max_age: Duration) -> bool {
        match self.refreshed_at {
            Some(at) => now - at >= max_age,
            None => true,
        }
    }

    /// Reload the listing when stale
    ///
    /// A failed reload keeps the current pairs and is retried next call.
    /// Before the first successful load the listing stays unknown.
    pub async fn refresh_if_stale<E: ExchangeApi + ?Sized>(
        &mut self,
        exchange: &E,
        now: DateTime<Utc>,
        max_age: Duration,
    ) {
        if !self.is_stale(now, max_age) {
            return;
        }

        match exchange.perpetual_pairs().await {
            Ok(pairs) => {
                tracing::debug!(pairs = pairs.len(), "Refreshed perpetual listing");
                self.pairs = pairs;
                self.refreshed_at = Some(now);
            }
            Err(e) => {
                crate::telemetry::record_fetch_failure(e.endpoint());
                tracing::warn!(
                    error = %e,
                    cached = self.pairs.len(),
                    "Perpetual listing refresh failed, keeping cached pairs"
                );
            }
        }
    }
}
