//! CLI argument definitions using clap
//!
//! This module contains all the clap structs and enums for parsing CLI arguments.
//! The actual command implementations are in the `commands` module.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use spendlens_core::DEFAULT_EXPORT_PATH;

/// SpendLens - Transaction export and AI spending insights
#[derive(Parser)]
#[command(name = "spendlens")]
#[command(about = "Export transactions and generate AI spending insights", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Export transactions from the store to CSV
    Export {
        /// Owner id (24-char hex). Exports all transactions when omitted
        /// or malformed.
        owner: Option<String>,

        /// Output file path
        #[arg(short, long, default_value = DEFAULT_EXPORT_PATH)]
        output: PathBuf,
    },

    /// Run the AI insight crew over a fresh export
    Insights {
        /// Owner id (24-char hex). Analyzes all transactions when omitted.
        owner: Option<String>,
    },
}
