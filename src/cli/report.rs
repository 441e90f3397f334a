//! Report command implementation

use crate::config::Config;
use crate::delivery::{render_report, MessageSink, TelegramSink};
use crate::detector::BorrowChange;
use crate::exchange::{BinanceClient, BinanceConfig};
use crate::report::{PerpetualListing, ReportBuilder};
use crate::snapshot::SnapshotFetcher;
use anyhow::Context;
use chrono::Utc;
use clap::Args;
use std::sync::Arc;

#[derive(Args, Debug)]
pub struct ReportArgs {
    /// Asset symbol (e.g., PEPE)
    pub asset: String,

    /// Also deliver the report to Telegram
    #[arg(long)]
    pub send: bool,
}

impl ReportArgs {
    pub async fn execute(&self, config: &Config) -> anyhow::Result<()> {
        let symbol = self.asset.to_uppercase();
        let now = Utc::now();
        let exchange = Arc::new(BinanceClient::with_config(BinanceConfig::from(
            &config.exchange,
        ))?);

        let snapshot = SnapshotFetcher::new(Arc::clone(&exchange), Vec::new())
            .fetch(now)
            .await?;
        let record = snapshot
            .get(&symbol)
            .cloned()
            .with_context(|| format!("{symbol} is not a margin asset"))?;

        // Without a previous poll the record is compared with itself
        let change = BorrowChange {
            old: record.clone(),
            new: record,
        };

        let mut listing = PerpetualListing::default();
        listing
            .refresh_if_stale(exchange.as_ref(), now, chrono::Duration::zero())
            .await;

        let report = ReportBuilder::new(exchange, &config.exchange.quote_asset)
            .build(&change, &listing, now, None)
            .await;
        println!("{}", render_report(&report));

        if self.send {
            TelegramSink::new(&config.telegram)?.deliver(&report).await?;
            tracing::info!(report_id = %report.id, symbol = %symbol, "Report delivered");
        }

        Ok(())
    }
}
