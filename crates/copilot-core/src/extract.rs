//! Recovers a [`StructuredResult`] from free-form backend text.

use crate::error::{DEFAULT_EXCERPT_CHARS, PipelineError, Result, bounded_excerpt};
use crate::result::StructuredResult;
use serde_json::{Map, Value};

/// Extracts with the default excerpt bound.
pub fn extract(raw_text: &str) -> Result<StructuredResult> {
    ResultExtractor::default().extract(raw_text)
}

/// Bracket-bounded JSON extraction with field validation.
#[derive(Debug, Clone, Copy)]
pub struct ResultExtractor {
    excerpt_chars: usize,
}

impl Default for ResultExtractor {
    fn default() -> Self {
        Self {
            excerpt_chars: DEFAULT_EXCERPT_CHARS,
        }
    }
}

impl ResultExtractor {
    pub fn new(excerpt_chars: usize) -> Self {
        Self { excerpt_chars }
    }

    pub fn extract(&self, raw_text: &str) -> Result<StructuredResult> {
        let candidate = json_slice(raw_text);

        let parsed: Value = serde_json::from_str(candidate).map_err(|_| {
            PipelineError::malformed(format!(
                "Failed to parse model JSON. Raw output: {}",
                bounded_excerpt(candidate, self.excerpt_chars)
            ))
        })?;

        let Value::Object(mut object) = parsed else {
            return Err(PipelineError::malformed(
                "Model JSON missing required code fields.",
            ));
        };

        let (Some(python_code), Some(node_code)) = (
            take_code_field(&mut object, "pythonCode"),
            take_code_field(&mut object, "nodeCode"),
        ) else {
            return Err(PipelineError::malformed(
                "Model JSON missing required code fields.",
            ));
        };

        let sample_data = object
            .remove("sampleData")
            .map(decode_sample_data)
            .unwrap_or(Value::Null);

        let next_steps = match object.remove("nextSteps") {
            Some(Value::String(text)) => text,
            Some(Value::Null) | None => String::new(),
            Some(other) => other.to_string(),
        };

        Ok(StructuredResult {
            python_code,
            node_code,
            sample_data,
            next_steps,
        })
    }
}

/// Narrows `raw` to the span between the first `{` and the last `}`.
///
/// Falls back to the whole text when no such span exists.
fn json_slice(raw: &str) -> &str {
    match (raw.find('{'), raw.rfind('}')) {
        (Some(first), Some(last)) if first < last => &raw[first..=last],
        _ => raw,
    }
}

fn take_code_field(object: &mut Map<String, Value>, key: &str) -> Option<String> {
    match object.remove(key) {
        Some(Value::String(code)) if !code.is_empty() => Some(code),
        _ => None,
    }
}

/// Decodes string-encoded sample data; anything unparseable is kept as-is.
fn decode_sample_data(value: Value) -> Value {
    match value {
        Value::String(raw) => serde_json::from_str(&raw).unwrap_or(Value::String(raw)),
        other => other,
    }
}
