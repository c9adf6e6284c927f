//! Platform credentials and AI-service key sourcing.

use crate::platform::Platform;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Fixed identifier of the persisted credential map.
pub const INTEGRATION_STORAGE_KEY: &str = "integration_config_v1";

/// Platform credential values keyed by `"<platform>:<fieldId>"`.
///
/// Serializes as a flat JSON object, which is the persisted format.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlatformCredentialSet {
    entries: BTreeMap<String, String>,
}

impl PlatformCredentialSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn namespaced_key(platform: Platform, field_id: &str) -> String {
        format!("{platform}:{field_id}")
    }

    pub fn set(&mut self, platform: Platform, field_id: &str, value: impl Into<String>) {
        self.entries
            .insert(Self::namespaced_key(platform, field_id), value.into());
    }

    pub fn get(&self, platform: Platform, field_id: &str) -> Option<&str> {
        self.entries
            .get(&Self::namespaced_key(platform, field_id))
            .map(String::as_str)
    }

    pub fn remove(&mut self, platform: Platform, field_id: &str) -> Option<String> {
        self.entries.remove(&Self::namespaced_key(platform, field_id))
    }

    /// Non-empty values of `platform`, keyed by bare field id.
    pub fn for_platform(&self, platform: Platform) -> BTreeMap<String, String> {
        let prefix = platform.credential_prefix();
        self.entries
            .iter()
            .filter(|(_, value)| !value.is_empty())
            .filter_map(|(key, value)| {
                key.strip_prefix(&prefix)
                    .map(|field| (field.to_string(), value.clone()))
            })
            .collect()
    }

    /// Required fields of `platform` that have no value yet.
    pub fn missing_required(&self, platform: Platform) -> Vec<&'static str> {
        platform
            .fields()
            .iter()
            .filter(|spec| spec.required)
            .filter(|spec| self.get(platform, spec.id).is_none_or(str::is_empty))
            .map(|spec| spec.id)
            .collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FromIterator<(String, String)> for PlatformCredentialSet {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

/// Trims a key and strips one layer of wrapping quotes.
///
/// Returns `None` when nothing usable is left.
pub fn sanitize_key(raw: &str) -> Option<String> {
    let mut key = raw.trim();
    for quote in ['"', '\''] {
        key = key.strip_prefix(quote).unwrap_or(key);
        key = key.strip_suffix(quote).unwrap_or(key);
    }
    let key = key.trim();
    if key.is_empty() {
        None
    } else {
        Some(key.to_string())
    }
}

/// Picks the AI-service key: the first candidate that survives sanitizing.
///
/// Callers pass candidates in precedence order (explicit user key first).
pub fn resolve_api_key<'a, I>(candidates: I) -> Option<String>
where
    I: IntoIterator<Item = Option<&'a str>>,
{
    candidates.into_iter().flatten().find_map(sanitize_key)
}

/// Masked rendering for logs, e.g. `AIzaSy...wxyz`.
pub fn mask_key(key: &str) -> String {
    let chars: Vec<char> = key.chars().collect();
    if chars.len() <= 10 {
        return "*".repeat(chars.len());
    }
    let head: String = chars[..6].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{head}...{tail}")
}

/// Whether the key looks unlike a Gemini key. Only used for a warning.
pub fn looks_malformed(key: &str) -> bool {
    !key.starts_with("AIza") && key.chars().count() < 30
}
