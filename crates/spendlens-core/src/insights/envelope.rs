//! Uniform result envelope returned to callers

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::Result;

/// Caller-facing analysis result
///
/// Exactly one of `data` and `error` is present, gated by `success`.
/// Every pipeline failure folds into this shape; nothing escapes to the
/// caller as a raw error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InsightEnvelope {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl InsightEnvelope {
    /// Wrap a parsed (or fallback) result
    pub fn success(data: Value) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    /// Wrap a failure message
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message.into()),
        }
    }

    /// Serialize with two-space indentation
    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
