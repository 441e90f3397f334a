//! Prometheus metrics

use std::time::Duration;

/// How a poll cycle ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleMetric {
    /// Snapshot could not be fetched
    FetchFailed,
    /// First snapshot, nothing to compare against
    Seeded,
    /// No borrow increase
    NoChange,
    /// At least one report was built
    Reported,
}

impl CycleMetric {
    fn label(&self) -> &'static str {
        match self {
            CycleMetric::FetchFailed => "fetch_failed",
            CycleMetric::Seeded => "seeded",
            CycleMetric::NoChange => "no_change",
            CycleMetric::Reported => "reported",
        }
    }
}

/// Record a finished cycle and its duration
pub fn record_cycle(outcome: CycleMetric, elapsed: Duration) {
    ::metrics::counter!("margin_signal_cycles_total", "outcome" => outcome.label()).increment(1);
    ::metrics::histogram!("margin_signal_cycle_duration_seconds").record(elapsed.as_secs_f64());
}

/// Record a failed exchange read
pub fn record_fetch_failure(endpoint: &'static str) {
    ::metrics::counter!("margin_signal_fetch_failures_total", "endpoint" => endpoint)
        .increment(1);
}

/// Record a report section left unavailable
pub fn record_partial_data(section: &'static str) {
    ::metrics::counter!("margin_signal_partial_reports_total", "section" => section)
        .increment(1);
}

/// Record a message delivery attempt
pub fn record_delivery(success: bool) {
    let result = if success { "ok" } else { "error" };
    ::metrics::counter!("margin_signal_deliveries_total", "result" => result).increment(1);
}

/// Set the number of tracked assets
pub fn set_tracked_assets(count: usize) {
    ::metrics::gauge!("margin_signal_tracked_assets").set(count as f64);
}
