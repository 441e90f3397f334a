//! Window aggregation types

use chrono::Duration;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Look-back interval of a delta
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Window {
    #[serde(rename = "5m")]
    M5,
    #[serde(rename = "15m")]
    M15,
    #[serde(rename = "1h")]
    H1,
    #[serde(rename = "4h")]
    H4,
}

impl Window {
    /// Every window, shortest first
    pub const ALL: [Window; 4] = [Window::M5, Window::M15, Window::H1, Window::H4];

    pub fn duration(&self) -> Duration {
        match self {
            Window::M5 => Duration::minutes(5),
            Window::M15 => Duration::minutes(15),
            Window::H1 => Duration::hours(1),
            Window::H4 => Duration::hours(4),
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Window::M5 => "5m",
            Window::M15 => "15m",
            Window::H1 => "1h",
            Window::H4 => "4h",
        }
    }
}

impl fmt::Display for Window {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Value per window (a delta or a ratio); windows without source data are absent
pub type WindowDeltas = BTreeMap<Window, Decimal>;

/// Metric a series describes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MetricKind {
    /// Taker buy or sell quote volume per 5-minute candle
    Volume,
    /// Open interest value
    OpenInterest,
    /// Global long/short account ratio
    LongShortRatio,
}

/// How a delta is computed from two values
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeltaKind {
    /// `(now - then) / then * 100`
    Percent,
    /// `now - then`
    Absolute,
}

impl MetricKind {
    pub fn delta_kind(&self) -> DeltaKind {
        match self {
            MetricKind::Volume | MetricKind::OpenInterest => DeltaKind::Percent,
            MetricKind::LongShortRatio => DeltaKind::Absolute,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            MetricKind::Volume => "volume",
            MetricKind::OpenInterest => "open_interest",
            MetricKind::LongShortRatio => "long_short_ratio",
        }
    }
}

impl fmt::Display for MetricKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
