//! Boundary to the generative service.

use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque name of a backend model version, e.g. `gemini-2.5-flash`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ModelId(String);

impl ModelId {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ModelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ModelId {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl From<String> for ModelId {
    fn from(name: String) -> Self {
        Self(name)
    }
}

/// Non-error outcomes of a model probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProbeOutcome {
    Available,
    /// The service does not know the model; try the next candidate.
    NotFound,
}

/// Raw answer of a metadata fetch, kept for diagnostics.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RawProbeResponse {
    pub ok: bool,
    /// HTTP status, or -1 when the request never got an answer.
    pub status: i32,
    /// Parsed JSON when possible, otherwise the body text.
    pub body: serde_json::Value,
}

/// Operations the pipeline needs from the generative service.
///
/// Implementations report a missing model as [`ProbeOutcome::NotFound`] and
/// every other failure as an error, so a rejected key is never mistaken for
/// an exhausted fallback list.
#[async_trait::async_trait]
pub trait GenerativeBackend: Send + Sync {
    /// Lightweight existence check (metadata fetch, not a generation call).
    async fn probe(&self, model: &ModelId, api_key: &str) -> Result<ProbeOutcome>;

    /// Sends `prompt` as a single text block and returns the generated text.
    async fn generate(&self, model: &ModelId, api_key: &str, prompt: &str) -> Result<String>;

    /// Unfiltered metadata fetch used by key diagnostics.
    async fn describe(&self, model: &ModelId, api_key: &str) -> RawProbeResponse;
}
