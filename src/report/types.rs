//! Report types

use crate::detector::BorrowChange;
use crate::exchange::{DailyVolume, FundingInfo};
use crate::window::WindowDeltas;
use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;
use thiserror::Error;
use uuid::Uuid;

/// Report assembly errors
#[derive(Debug, Error)]
pub enum ReportError {
    /// One metric could not be read or derived; its section is dropped
    #[error("{metric} data unavailable: {reason}")]
    PartialDataUnavailable {
        metric: &'static str,
        reason: String,
    },
}

/// One metric section of a report
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Section<T> {
    Available(T),
    /// Fetch or derivation failed
    Unavailable(String),
    /// Asset has no perpetual futures contract
    NotListed,
}

impl<T> Section<T> {
    pub fn is_available(&self) -> bool {
        matches!(self, Section::Available(_))
    }

    pub fn is_unavailable(&self) -> bool {
        matches!(self, Section::Unavailable(_))
    }

    pub fn available(&self) -> Option<&T> {
        match self {
            Section::Available(value) => Some(value),
            _ => None,
        }
    }

    /// Why the section is missing, when it is unavailable
    pub fn reason(&self) -> Option<&str> {
        match self {
            Section::Unavailable(reason) => Some(reason.as_str()),
            _ => None,
        }
    }
}

impl<T> From<ReportError> for Section<T> {
    fn from(err: ReportError) -> Self {
        Section::Unavailable(err.to_string())
    }
}

impl<T> From<Result<T, ReportError>> for Section<T> {
    fn from(result: Result<T, ReportError>) -> Self {
        match result {
            Ok(value) => Section::Available(value),
            Err(err) => err.into(),
        }
    }
}

/// Margin borrow/repay state of the triggering asset
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarginSection {
    pub total_borrow: Decimal,
    pub total_borrow_usdt: Decimal,
    pub total_repay: Decimal,
    pub total_repay_usdt: Decimal,
    /// Percent change against the previous snapshot
    pub borrow_change_pct: Decimal,
    pub repay_change_pct: Decimal,
    pub borrow_repay_ratio: Option<Decimal>,
    pub available: Decimal,
}

impl From<&BorrowChange> for MarginSection {
    fn from(change: &BorrowChange) -> Self {
        Self {
            total_borrow: change.new.total_borrow,
            total_borrow_usdt: change.new.total_borrow_usdt,
            total_repay: change.new.total_repay,
            total_repay_usdt: change.new.total_repay_usdt,
            borrow_change_pct: change.borrow_change_pct(),
            repay_change_pct: change.repay_change_pct(),
            borrow_repay_ratio: change.borrow_repay_ratio(),
            available: change.new.available,
        }
    }
}

/// Taker volume deltas
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VolumeSection {
    pub buy: WindowDeltas,
    pub sell: WindowDeltas,
    /// Buy over sell quote volume, totalled over each window
    pub buy_sell_ratios: WindowDeltas,
}

/// Long/short account ratio and its deltas
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LongShortSection {
    pub current: Decimal,
    pub deltas: WindowDeltas,
}

/// Everything known about one triggering asset at one point in time
#[derive(Debug, Clone)]
pub struct TokenReport {
    /// Correlates log lines of one report
    pub id: Uuid,
    pub symbol: String,
    pub pair: String,
    pub generated_at: DateTime<Utc>,
    /// Timestamp every window delta is measured from
    pub anchor: Option<DateTime<Utc>>,
    pub margin: MarginSection,
    pub daily_volume: Section<DailyVolume>,
    pub volume: Section<VolumeSection>,
    pub funding: Section<FundingInfo>,
    pub open_interest: Section<WindowDeltas>,
    pub long_short: Section<LongShortSection>,
    /// Time since the previous report for this asset
    pub since_last_signal: Option<Duration>,
}

impl TokenReport {
    /// Time left until the next funding payment, from report generation
    pub fn time_to_funding(&self) -> Option<Duration> {
        self.funding
            .available()
            .map(|f| f.next_funding_time - self.generated_at)
    }

    /// Sections that could not be filled, with the reason
    pub fn unavailable_sections(&self) -> Vec<(&'static str, &str)> {
        let sections = [
            ("daily_volume", self.daily_volume.reason()),
            ("volume", self.volume.reason()),
            ("funding", self.funding.reason()),
            ("open_interest", self.open_interest.reason()),
            ("long_short_ratio", self.long_short.reason()),
        ];

        sections
            .into_iter()
            .filter_map(|(name, reason)| reason.map(|r| (name, r)))
            .collect()
    }
}
