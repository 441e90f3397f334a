//! Borrow snapshot types

use crate::exchange::MarginAsset;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use std::collections::BTreeMap;

/// Borrow state of every tracked asset at one poll
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenBorrowSnapshot {
    taken_at: DateTime<Utc>,
    assets: BTreeMap<String, MarginAsset>,
}

impl TokenBorrowSnapshot {
    /// Create a snapshot from margin records; later duplicates win
    pub fn new(taken_at: DateTime<Utc>, assets: impl IntoIterator<Item = MarginAsset>) -> Self {
        Self {
            taken_at,
            assets: assets
                .into_iter()
                .map(|asset| (asset.asset.clone(), asset))
                .collect(),
        }
    }

    /// Create a snapshot holding only borrow amounts
    pub fn from_amounts<S: Into<String>>(
        taken_at: DateTime<Utc>,
        amounts: impl IntoIterator<Item = (S, Decimal)>,
    ) -> Self {
        Self::new(
            taken_at,
            amounts.into_iter().map(|(asset, total_borrow)| MarginAsset {
                asset: asset.into(),
                total_borrow,
                total_repay: Decimal::ZERO,
                total_borrow_usdt: Decimal::ZERO,
                total_repay_usdt: Decimal::ZERO,
                available: Decimal::ZERO,
            }),
        )
    }

    pub fn taken_at(&self) -> DateTime<Utc> {
        self.taken_at
    }

    /// Full margin record of an asset
    pub fn get(&self, asset: &str) -> Option<&MarginAsset> {
        self.assets.get(asset)
    }

    /// Borrow amount of an asset
    pub fn borrow_amount(&self, asset: &str) -> Option<Decimal> {
        self.assets.get(asset).map(|a| a.total_borrow)
    }

    pub fn contains(&self, asset: &str) -> bool {
        self.assets.contains_key(asset)
    }

    /// Records in symbol order
    pub fn iter(&self) -> impl Iterator<Item = &MarginAsset> {
        self.assets.values()
    }

    pub fn len(&self) -> usize {
        self.assets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.assets.is_empty()
    }
}
