//! CLI interface for margin-signal
//!
//! Provides subcommands for:
//! - `run`: Poll borrow statistics and post reports
//! - `snapshot`: Print the current borrow snapshot
//! - `report`: Build a single asset report on demand
//! - `config`: Show the effective configuration

mod report;
mod run;
mod snapshot;

pub use report::ReportArgs;
pub use run::RunArgs;
pub use snapshot::SnapshotArgs;

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "margin-signal")]
#[command(about = "Watches Binance margin borrowing and posts market reports to Telegram")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Path to configuration file
    #[arg(short, long, default_value = "config.toml")]
    pub config: String,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Poll borrow statistics and post reports
    Run(RunArgs),
    /// Print the current borrow snapshot
    Snapshot(SnapshotArgs),
    /// Build a report for one asset
    Report(ReportArgs),
    /// Show configuration
    Config,
}
