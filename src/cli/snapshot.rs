//! Snapshot command implementation

use crate::config::Config;
use crate::delivery::{format_number, format_scaled};
use crate::exchange::{BinanceClient, BinanceConfig};
use crate::snapshot::SnapshotFetcher;
use chrono::Utc;
use clap::Args;
use std::sync::Arc;

#[derive(Args, Debug)]
pub struct SnapshotArgs {
    /// Print records as JSON
    #[arg(long)]
    pub json: bool,
}

impl SnapshotArgs {
    pub async fn execute(&self, config: &Config) -> anyhow::Result<()> {
        let exchange = Arc::new(BinanceClient::with_config(BinanceConfig::from(
            &config.exchange,
        ))?);
        let fetcher = SnapshotFetcher::new(exchange, config.exchange.excluded_assets.clone());
        let snapshot = fetcher.fetch(Utc::now()).await?;

        if self.json {
            let records: Vec<_> = snapshot.iter().collect();
            println!("{}", serde_json::to_string_pretty(&records)?);
            return Ok(());
        }

        println!(
            "{:<12} {:>16} {:>14} {:>16} {:>14}",
            "ASSET", "BORROWED", "BORROWED $", "REPAID", "AVAILABLE"
        );
        for asset in snapshot.iter() {
            println!(
                "{:<12} {:>16} {:>14} {:>16} {:>14}",
                asset.asset,
                format_scaled(asset.total_borrow),
                format_number(asset.total_borrow_usdt),
                format_scaled(asset.total_repay),
                format_scaled(asset.available),
            );
        }
        println!("{} assets at {}", snapshot.len(), snapshot.taken_at());

        Ok(())
    }
}
