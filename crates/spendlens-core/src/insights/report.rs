//! Typed view over the insight report contract
//!
//! The final crew task asks the model for a fixed JSON shape. These types
//! give callers a structured view when the model honors the contract;
//! `InsightReport::from_value` degrades to `None` otherwise, leaving the
//! raw envelope data available.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Alert severity, constrained to three levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    High,
    Medium,
    Low,
}

/// One headline finding about the transaction data
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeyInsight {
    pub title: String,
    pub description: String,
}

/// Overspending or anomaly alert
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alert {
    #[serde(rename = "type")]
    pub alert_type: String,
    pub severity: Severity,
    pub description: String,
    pub recommendation: String,
}

/// Budget optimization suggestion for a spending category
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Suggestion {
    pub category: String,
    pub suggestion: String,
}

/// The report shape the final crew task is asked to produce
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InsightReport {
    #[serde(rename = "keyInsights", default)]
    pub key_insights: Vec<KeyInsight>,
    #[serde(default)]
    pub alerts: Vec<Alert>,
    #[serde(default)]
    pub suggestions: Vec<Suggestion>,
}

impl InsightReport {
    /// Try to view envelope data as a typed report
    ///
    /// Requires at least one contract key, so the raw-text fallback object
    /// does not masquerade as an empty report.
    pub fn from_value(value: &Value) -> Option<Self> {
        let object = value.as_object()?;
        let has_contract_key = ["keyInsights", "alerts", "suggestions"]
            .iter()
            .any(|key| object.contains_key(*key));
        if !has_contract_key {
            return None;
        }
        serde_json::from_value(value.clone()).ok()
    }
}
