//! Change detection types

use crate::exchange::MarginAsset;
use rust_decimal::Decimal;

/// An asset whose borrow amount grew between two snapshots
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BorrowChange {
    pub old: MarginAsset,
    pub new: MarginAsset,
}

impl BorrowChange {
    pub fn symbol(&self) -> &str {
        &self.new.asset
    }

    /// Borrow change in percent
    pub fn borrow_change_pct(&self) -> Decimal {
        percentage_change(self.new.total_borrow, self.old.total_borrow)
    }

    /// Repay change in percent
    pub fn repay_change_pct(&self) -> Decimal {
        percentage_change(self.new.total_repay, self.old.total_repay)
    }

    /// Borrow to repay ratio of the new record, `None` when nothing was repaid
    pub fn borrow_repay_ratio(&self) -> Option<Decimal> {
        self.new.total_borrow.checked_div(self.new.total_repay)
    }
}

/// Percentage change from `old` to `new`, truncated to two decimals
///
/// A zero base counts as a 100% change.
pub fn percentage_change(new: Decimal, old: Decimal) -> Decimal {
    (new - old)
        .checked_div(old)
        .map(|ratio| ratio * Decimal::ONE_HUNDRED)
        .unwrap_or(Decimal::ONE_HUNDRED)
        .trunc_with_scale(2)
        .normalize()
}
