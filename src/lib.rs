//! margin-signal: Binance margin borrow watcher
//!
//! This library provides the core components for:
//! - Polling margin borrow/repay statistics
//! - Detecting assets whose borrow increased between polls
//! - Multi-window volume, open interest and long/short deltas
//! - Report assembly with partial-data tolerance
//! - Telegram delivery
//! - Logging and Prometheus metrics

pub mod cli;
pub mod config;
pub mod cycle;
pub mod delivery;
pub mod detector;
pub mod exchange;
pub mod report;
pub mod snapshot;
pub mod telemetry;
pub mod window;
