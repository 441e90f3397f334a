//! Run command implementation

use crate::config::Config;
use crate::cycle::{delay_until_next_slot, next_time_slot, CycleDriver, CycleState};
use crate::delivery::TelegramSink;
use crate::exchange::{BinanceClient, BinanceConfig};
use chrono::Utc;
use clap::Args;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::MissedTickBehavior;

#[derive(Args, Debug)]
pub struct RunArgs {
    /// Start the first cycle immediately instead of waiting for the next slot
    #[arg(long)]
    pub no_align: bool,
}

impl RunArgs {
    pub async fn execute(&self, config: &Config) -> anyhow::Result<()> {
        let exchange = Arc::new(BinanceClient::with_config(BinanceConfig::from(
            &config.exchange,
        ))?);
        let sink = Arc::new(TelegramSink::new(&config.telegram)?);
        let driver = CycleDriver::new(exchange, sink, &config.exchange, &config.poll);

        if config.poll.align_to_slot && !self.no_align {
            let now = Utc::now();
            let delay = delay_until_next_slot(now);
            tracing::info!(
                start = %next_time_slot(now),
                delay_secs = delay.as_secs(),
                "Waiting for next poll slot"
            );

            tokio::select! {
                _ = tokio::time::sleep(delay) => {}
                _ = tokio::signal::ctrl_c() => {
                    tracing::info!("Received shutdown signal");
                    return Ok(());
                }
            }
        }

        let mut interval = tokio::time::interval(Duration::from_secs(
            config.poll.interval_secs.max(1),
        ));
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
        let mut state = CycleState::default();

        tracing::info!(
            interval_secs = config.poll.interval_secs,
            excluded = config.exchange.excluded_assets.len(),
            "Polling margin borrow statistics"
        );

        loop {
            tokio::select! {
                _ = interval.tick() => {
                    driver.run_cycle(&mut state, Utc::now()).await;
                }
                _ = tokio::signal::ctrl_c() => {
                    tracing::info!("Received shutdown signal");
                    break;
                }
            }
        }

        Ok(())
    }
}
