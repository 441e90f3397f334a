//! Borrow snapshot module
//!
//! Polls margin borrow statistics for the tracked assets

mod fetcher;
mod types;

pub use fetcher::SnapshotFetcher;
pub use types::TokenBorrowSnapshot;
