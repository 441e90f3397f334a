//! Borrow increase detection

use super::BorrowChange;
use crate::snapshot::TokenBorrowSnapshot;
use std::collections::BTreeSet;

/// Assets whose borrow amount strictly increased from `previous` to `current`
///
/// Assets missing from `previous` are never reported, so the first sighting
/// of an asset cannot trigger a report. Results are sorted by symbol.
pub fn detect_increases(
    previous: &TokenBorrowSnapshot,
    current: &TokenBorrowSnapshot,
) -> Vec<BorrowChange> {
    current
        .iter()
        .filter_map(|new| {
            let old = previous.get(&new.asset)?;
            (new.total_borrow > old.total_borrow).then(|| BorrowChange {
                old: old.clone(),
                new: new.clone(),
            })
        })
        .collect()
}

/// Symbols of the assets that triggered
pub fn triggered_symbols(changes: &[BorrowChange]) -> BTreeSet<String> {
    changes.iter().map(|c| c.symbol().to_string()).collect()
}

/// Assets present in `current` but not in `previous`
pub fn new_listings(previous: &TokenBorrowSnapshot, current: &TokenBorrowSnapshot) -> Vec<String> {
    current
        .iter()
        .filter(|asset| !previous.contains(&asset.asset))
        .map(|asset| asset.asset.clone())
        .collect()
}
