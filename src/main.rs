use anyhow::Context;
use clap::Parser;
use margin_signal::cli::{Cli, Commands};
use margin_signal::config::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Load configuration
    let config = match Config::load(&cli.config) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Warning: Could not load config from {}: {}", cli.config, e);
            eprintln!("Using default configuration");
            toml::from_str(include_str!("../config.toml.example"))
                .context("Invalid default config")?
        }
    };

    // Initialize telemetry
    margin_signal::telemetry::init_telemetry(&config.telemetry)?;

    match cli.command {
        Commands::Run(args) => {
            tracing::info!("Starting margin borrow watcher");
            args.execute(&config).await?;
        }
        Commands::Snapshot(args) => {
            args.execute(&config).await?;
        }
        Commands::Report(args) => {
            args.execute(&config).await?;
        }
        Commands::Config => {
            println!("Current configuration:");
            println!("  Margin API: {}", config.exchange.margin_url);
            println!("  Spot API: {}", config.exchange.spot_url);
            println!("  Futures API: {}", config.exchange.futures_url);
            println!(
                "  Excluded assets: {}",
                config.exchange.excluded_assets.join(", ")
            );
            println!(
                "  Poll: every {}s, aligned={}, listing refresh {}s",
                config.poll.interval_secs,
                config.poll.align_to_slot,
                config.poll.listing_refresh_secs
            );
            println!(
                "  Telegram: chat {} (alerts: {})",
                config.telegram.chat_id,
                config.telegram.error_chat_id.as_deref().unwrap_or("off")
            );
            println!(
                "  Telemetry: level={}, json={}, metrics port={}",
                config.telemetry.log_level,
                config.telemetry.json_logs,
                config
                    .telemetry
                    .metrics_port
                    .map_or_else(|| "off".to_string(), |p| p.to_string())
            );
        }
    }

    Ok(())
}
