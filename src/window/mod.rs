//! Window aggregation module
//!
//! Turns 5-minute metric history into 5m/15m/1h/4h deltas

mod aggregator;
mod types;

pub use aggregator::{
    common_anchor, latest_timestamp, volume_series, WindowAggregator, SERIES_STEP_MINUTES,
};
pub use types::{DeltaKind, MetricKind, Window, WindowDeltas};
