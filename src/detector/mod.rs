//! Change detection module
//!
//! Compares consecutive borrow snapshots and flags assets whose borrow
//! amount went up. Comparison is pure; the caller owns the snapshots.

mod compare;
mod types;

pub use compare::{detect_increases, new_listings, triggered_symbols};
pub use types::{percentage_change, BorrowChange};
