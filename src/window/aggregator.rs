//! Multi-window delta aggregation
//!
//! All history the exchange publishes for these metrics is bucketed on a
//! 5-minute grid, so the value "at" a timestamp is the newest point no
//! older than one bucket.

use super::{DeltaKind, MetricKind, Window, WindowDeltas};
use crate::detector::percentage_change;
use crate::exchange::{SeriesPoint, VolumeCandle};
use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;

/// Spacing of the source series
pub const SERIES_STEP_MINUTES: i64 = 5;

/// Computes per-window deltas of a metric series
#[derive(Debug, Clone)]
pub struct WindowAggregator {
    windows: Vec<Window>,
    step: Duration,
}

impl Default for WindowAggregator {
    fn default() -> Self {
        Self::new(Window::ALL.to_vec())
    }
}

impl WindowAggregator {
    pub fn new(windows: Vec<Window>) -> Self {
        Self {
            windows,
            step: Duration::minutes(SERIES_STEP_MINUTES),
        }
    }

    pub fn windows(&self) -> &[Window] {
        &self.windows
    }

    /// Value of the series at `at`
    pub fn value_at(&self, series: &[SeriesPoint], at: DateTime<Utc>) -> Option<Decimal> {
        series
            .iter()
            .filter(|p| p.timestamp <= at && at - p.timestamp < self.step)
            .max_by_key(|p| p.timestamp)
            .map(|p| p.value)
    }

    /// Deltas between the value at `anchor` and the value one window earlier
    ///
    /// A window is left out when the series has no value at its boundary.
    /// Nothing is returned when the series has no value at the anchor.
    pub fn aggregate(
        &self,
        kind: MetricKind,
        series: &[SeriesPoint],
        anchor: DateTime<Utc>,
    ) -> WindowDeltas {
        let Some(now) = self.value_at(series, anchor) else {
            return WindowDeltas::new();
        };

        self.windows
            .iter()
            .filter_map(|window| {
                let then = self.value_at(series, anchor - window.duration())?;
                Some((*window, delta(kind.delta_kind(), now, then)))
            })
            .collect()
    }

    /// Ratio of the totals of two series over each window ending at `anchor`
    ///
    /// A window is left out unless both series cover every bucket in it,
    /// or when the denominator total is zero.
    pub fn ratio_over(
        &self,
        numerator: &[SeriesPoint],
        denominator: &[SeriesPoint],
        anchor: DateTime<Utc>,
    ) -> WindowDeltas {
        self.windows
            .iter()
            .filter_map(|window| {
                let top = self.window_total(numerator, *window, anchor)?;
                let bottom = self.window_total(denominator, *window, anchor)?;
                let ratio = top.checked_div(bottom)?;
                Some((*window, ratio.trunc_with_scale(2).normalize()))
            })
            .collect()
    }

    fn window_total(
        &self,
        series: &[SeriesPoint],
        window: Window,
        anchor: DateTime<Utc>,
    ) -> Option<Decimal> {
        let span = window.duration();
        let buckets = span.num_minutes() / self.step.num_minutes();
        let points: Vec<Decimal> = series
            .iter()
            .filter(|p| p.timestamp <= anchor && anchor - p.timestamp < span)
            .map(|p| p.value)
            .collect();

        (points.len() as i64 >= buckets).then(|| points.into_iter().sum())
    }
}

fn delta(kind: DeltaKind, now: Decimal, then: Decimal) -> Decimal {
    match kind {
        DeltaKind::Percent => percentage_change(now, then),
        DeltaKind::Absolute => (now - then).trunc_with_scale(2).normalize(),
    }
}

/// Newest timestamp of a series
pub fn latest_timestamp(series: &[SeriesPoint]) -> Option<DateTime<Utc>> {
    series.iter().map(|p| p.timestamp).max()
}

/// Newest timestamp every non-empty series has reached
///
/// Anchoring all metrics here keeps one report at a single point in time.
pub fn common_anchor<'a>(
    series: impl IntoIterator<Item = &'a [SeriesPoint]>,
) -> Option<DateTime<Utc>> {
    series.into_iter().filter_map(latest_timestamp).min()
}

/// Split closed candles into taker buy and taker sell series keyed by open time
pub fn volume_series(
    candles: &[VolumeCandle],
    now: DateTime<Utc>,
) -> (Vec<SeriesPoint>, Vec<SeriesPoint>) {
    candles
        .iter()
        .filter(|c| c.is_closed(now))
        .map(|c| {
            (
                SeriesPoint::new(c.open_time, c.buy_quote_volume),
                SeriesPoint::new(c.open_time, c.sell_quote_volume),
            )
        })
        .unzip()
}
