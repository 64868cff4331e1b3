//! Subspace phrases and breakdown value coercion

use crate::models::{InsightEntry, CORRELATED_PREFIX};
use crate::table::Value;

/// `"<col> is <value>"` for every constrained feature, in feature order
pub fn describe_subspace(features: &[String], cells: &[Value]) -> Vec<String> {
    features
        .iter()
        .zip(cells)
        .filter(|(_, v)| !v.is_wildcard())
        .map(|(f, v)| format!("{} is {}", f, v))
        .collect()
}

/// Phrases for the counterpart subspace, named by their override columns
/// (`"Correlated Brand is Ford"`)
pub fn describe_correlated(features: &[String], entry: &InsightEntry) -> Vec<String> {
    features
        .iter()
        .filter_map(|f| {
            entry
                .correlated_value(f)
                .filter(|v| !v.is_wildcard())
                .map(|v| format!("{}{} is {}", CORRELATED_PREFIX, f, v))
        })
        .collect()
}

/// Digit-only text becomes an integer, anything else stays text
///
/// Leading zeros are dropped (`"02134"` becomes `2134`).
pub fn coerce_breakdown_value(raw: &str) -> Value {
    let trimmed = raw.trim();
    if !trimmed.is_empty() && trimmed.bytes().all(|b| b.is_ascii_digit()) {
        if let Ok(i) = trimmed.parse::<i64>() {
            return Value::Int(i);
        }
    }
    Value::Str(raw.to_string())
}
