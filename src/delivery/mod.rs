//! Delivery module
//!
//! Renders reports and hands them to a messaging channel

mod format;
mod telegram;

pub use format::{
    format_change, format_dollars, format_duration, format_number, format_scaled,
    render_new_listing, render_report,
};
pub use telegram::{escape_markdown_v2, TelegramSink};

use crate::report::TokenReport;
use async_trait::async_trait;
use thiserror::Error;

/// Delivery failures
#[derive(Debug, Error)]
pub enum DeliveryError {
    /// Channel unreachable or the request timed out
    #[error("message delivery failed: {0}")]
    Transport(#[from] reqwest::Error),
    /// Channel answered with a non-success status
    #[error("channel rejected message with HTTP {status}: {body}")]
    Rejected { status: u16, body: String },
}

/// Outbound messaging channel
#[async_trait]
pub trait MessageSink: Send + Sync {
    /// Send a rendered message
    async fn send(&self, text: &str) -> Result<(), DeliveryError>;

    /// Send an operational alert; channels without an alert target drop it
    async fn alert(&self, _text: &str) -> Result<(), DeliveryError> {
        Ok(())
    }

    /// Render and send a report
    async fn deliver(&self, report: &TokenReport) -> Result<(), DeliveryError> {
        self.send(&render_report(report)).await
    }
}
