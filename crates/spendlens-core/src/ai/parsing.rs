//! JSON coercion for model responses
//!
//! Model output frequently wraps JSON in prose. Parsing is layered:
//! strict decoding first, then the outermost brace-delimited substring,
//! and finally a lossless fallback that carries the original text under
//! a `raw_response` key.

use serde_json::{json, Value};

/// Coerce model response text into a JSON value
///
/// Never fails: text that resists both decoding attempts comes back as
/// `{"raw_response": <original text>}` so nothing is discarded.
pub fn coerce_response(text: &str) -> Value {
    let trimmed = text.trim();

    if let Ok(value) = serde_json::from_str::<Value>(trimmed) {
        return value;
    }

    let start = trimmed.find('{');
    let end = trimmed.rfind('}');
    if let (Some(s), Some(e)) = (start, end) {
        if s < e {
            if let Ok(value) = serde_json::from_str::<Value>(&trimmed[s..=e]) {
                return value;
            }
        }
    }

    json!({ "raw_response": text })
}
