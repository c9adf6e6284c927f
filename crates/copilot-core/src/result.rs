//! The structured result of an integration request.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Generated integration code plus supporting material.
///
/// Field names follow the JSON contract the backend is asked to produce.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StructuredResult {
    /// Runnable Python script (requests).
    pub python_code: String,
    /// Runnable Node.js script (axios).
    pub node_code: String,
    /// Example response payload of the target platform.
    #[serde(default)]
    pub sample_data: Value,
    /// Markdown setup instructions.
    #[serde(default)]
    pub next_steps: String,
}

impl StructuredResult {
    /// Pretty-printed sample data; strings are returned as-is.
    pub fn sample_data_pretty(&self) -> String {
        match &self.sample_data {
            Value::String(raw) => raw.clone(),
            other => serde_json::to_string_pretty(other).unwrap_or_else(|_| other.to_string()),
        }
    }
}
