//! CSV export for transaction documents
//!
//! Flattens BSON documents into text cells: attachments collapse to a
//! "name (date)" label, arrays join on commas, timestamps render as
//! RFC 3339 text and identifiers as their hex form. Column order puts
//! the well-known transaction fields first and appends anything else in
//! the order it was first seen.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use mongodb::bson::{Bson, Document};
use tracing::info;

use crate::error::Result;

/// Default output location for the exporter
pub const DEFAULT_EXPORT_PATH: &str = "transactions_export.csv";

/// Process exit code signalling that no transactions matched
pub const EXIT_NO_DATA: u8 = 2;

/// Well-known transaction fields, emitted first when present
pub const PREFERRED_COLUMNS: [&str; 13] = [
    "_id",
    "userId",
    "type",
    "amount",
    "currency",
    "category",
    "description",
    "recipient",
    "paymentMethod",
    "status",
    "date",
    "walletAddress",
    "tags",
];

/// Outcome of a completed export
#[derive(Debug, Clone)]
pub struct ExportSummary {
    pub path: PathBuf,
    pub rows: usize,
    pub columns: Vec<String>,
}

/// Write transaction documents to a CSV file
///
/// Returns `Ok(None)` without touching the filesystem when `docs` is
/// empty, so callers can distinguish "nothing matched" from a written
/// (possibly stale) file.
pub fn export_transactions(docs: &[Document], path: &Path) -> Result<Option<ExportSummary>> {
    if docs.is_empty() {
        return Ok(None);
    }

    let columns = collect_columns(docs);

    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record(&columns)?;
    for doc in docs {
        let row: Vec<String> = columns
            .iter()
            .map(|col| doc.get(col).map(render_value).unwrap_or_default())
            .collect();
        writer.write_record(&row)?;
    }
    writer.flush()?;

    info!(
        "Exported {} transactions ({} columns) to {}",
        docs.len(),
        columns.len(),
        path.display()
    );

    Ok(Some(ExportSummary {
        path: path.to_path_buf(),
        rows: docs.len(),
        columns,
    }))
}

/// Collect the output columns across all documents
///
/// Preferred transaction fields come first in a fixed order, followed by
/// any remaining keys in the order they first appear.
fn collect_columns(docs: &[Document]) -> Vec<String> {
    let mut first_seen: Vec<&str> = Vec::new();
    let mut known: HashSet<&str> = HashSet::new();
    for doc in docs {
        for key in doc.keys() {
            if known.insert(key.as_str()) {
                first_seen.push(key.as_str());
            }
        }
    }

    let mut columns: Vec<String> = Vec::new();
    for col in PREFERRED_COLUMNS {
        if known.contains(col) {
            columns.push(col.to_string());
        }
    }
    for key in first_seen {
        if !PREFERRED_COLUMNS.contains(&key) {
            columns.push(key.to_string());
        }
    }
    columns
}

/// Render a single BSON value as CSV cell text
fn render_value(value: &Bson) -> String {
    match value {
        Bson::Null => String::new(),
        Bson::String(text) => text.clone(),
        Bson::ObjectId(id) => id.to_hex(),
        Bson::DateTime(when) => when
            .try_to_rfc3339_string()
            .unwrap_or_else(|_| when.timestamp_millis().to_string()),
        Bson::Array(items) => items
            .iter()
            .map(render_value)
            .collect::<Vec<_>>()
            .join(","),
        Bson::Document(doc) => render_document(doc),
        other => other.to_string(),
    }
}

/// Collapse an embedded document to a cell label
///
/// Attachment documents carry a `fileName` and an `uploadDate` and render
/// as "name (date)". Anything else falls back to its JSON form.
fn render_document(doc: &Document) -> String {
    if doc.contains_key("fileName") {
        let name = doc.get("fileName").map(render_value).unwrap_or_default();
        let when = doc.get("uploadDate").map(render_value).unwrap_or_default();
        format!("{} ({})", name, when)
    } else {
        Bson::Document(doc.clone()).to_string()
    }
}
