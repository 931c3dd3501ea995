//! Transaction export command implementation

use std::path::Path;
use std::process::ExitCode;

use anyhow::{Context, Result};
use spendlens_core::config::StoreConfig;
use spendlens_core::export::{export_transactions, EXIT_NO_DATA};
use spendlens_core::store::{parse_owner_id, TransactionStore};
use tracing::info;

/// Export transactions to CSV
///
/// Exits with code 2 when no transactions match so callers can tell
/// "nothing to export" apart from a failure.
pub async fn cmd_export(owner: Option<&str>, output: &Path) -> Result<ExitCode> {
    let config = StoreConfig::from_env();
    let owner_id = owner.and_then(parse_owner_id);

    if let Some(id) = &owner_id {
        info!("Filtering transactions for owner {}", id.to_hex());
    }

    let store = TransactionStore::connect(&config)
        .await
        .with_context(|| format!("Failed to connect to database {}", config.database))?;

    let transactions = store.fetch_transactions(owner_id.as_ref()).await?;
    let summary = export_transactions(&transactions, output)?;
    store.shutdown().await;

    match summary {
        Some(summary) => {
            println!(
                "✅ Exported {} transactions to {}",
                summary.rows,
                summary.path.display()
            );
            Ok(ExitCode::SUCCESS)
        }
        None => {
            println!("❌ No transactions found");
            Ok(ExitCode::from(EXIT_NO_DATA))
        }
    }
}
