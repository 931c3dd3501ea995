//! SpendLens CLI - Transaction export and AI spending insights
//!
//! Usage:
//!   spendlens export [OWNER]      Export transactions to CSV
//!   spendlens insights [OWNER]    Run the insight crew over a fresh export

mod cli;
mod commands;


use std::process::ExitCode;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use cli::*;

#[tokio::main]
async fn main() -> Result<ExitCode> {
    dotenv::dotenv().ok();

    let cli = Cli::parse();

    // Set up logging
    // Priority: RUST_LOG env var > --verbose flag > default (info)
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).compact())
        .init();

    match cli.command {
        Commands::Export { owner, output } => commands::cmd_export(owner.as_deref(), &output).await,
        Commands::Insights { owner } => commands::cmd_insights(owner.as_deref()).await,
    }
}
