//! Application configuration (`config.toml`) and secrets (`secret.json`).

use crate::backend::ModelId;
use crate::error::DEFAULT_EXCERPT_CHARS;
use crate::intent::{DEFAULT_INTENT_KEYWORDS, IntentClassifier};
use crate::platform::Platform;
use serde::{Deserialize, Serialize};

pub const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta/models";

/// Fallback list in priority order; the first reachable model wins.
pub const DEFAULT_MODEL_FALLBACKS: &[&str] = &["gemini-2.5-flash", "gemini-2.5-pro"];

/// Root of `config.toml`. Every section and field has a default.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CopilotConfig {
    pub default_platform: Platform,
    pub gemini: GeminiSettings,
    pub intent: IntentSettings,
    pub extractor: ExtractorSettings,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeminiSettings {
    pub base_url: String,
    /// Candidate models in fallback priority.
    pub models: Vec<String>,
    /// Probed before the fallback list when set.
    pub preferred_model: Option<String>,
    pub request_timeout_secs: u64,
}

impl Default for GeminiSettings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_GEMINI_BASE_URL.to_string(),
            models: DEFAULT_MODEL_FALLBACKS.iter().map(|m| m.to_string()).collect(),
            preferred_model: None,
            request_timeout_secs: 60,
        }
    }
}

impl GeminiSettings {
    pub fn model_candidates(&self) -> Vec<ModelId> {
        self.models
            .iter()
            .map(|m| m.trim())
            .filter(|m| !m.is_empty())
            .map(ModelId::from)
            .collect()
    }

    pub fn preferred(&self) -> Option<ModelId> {
        self.preferred_model
            .as_deref()
            .map(str::trim)
            .filter(|m| !m.is_empty())
            .map(ModelId::from)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IntentSettings {
    pub keywords: Vec<String>,
}

impl Default for IntentSettings {
    fn default() -> Self {
        Self {
            keywords: DEFAULT_INTENT_KEYWORDS.iter().map(|k| k.to_string()).collect(),
        }
    }
}

impl IntentSettings {
    pub fn classifier(&self) -> IntentClassifier {
        IntentClassifier::new(&self.keywords)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractorSettings {
    /// Characters of offending backend text kept in parse diagnostics.
    pub excerpt_chars: usize,
}

impl Default for ExtractorSettings {
    fn default() -> Self {
        Self {
            excerpt_chars: DEFAULT_EXCERPT_CHARS,
        }
    }
}

impl CopilotConfig {
    pub fn from_toml_str(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    pub fn to_toml_string(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }
}

/// Root structure of `secret.json`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecretConfig {
    #[serde(default)]
    pub gemini: Option<GeminiSecret>,
}

/// Gemini API credentials.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeminiSecret {
    pub api_key: String,
    #[serde(default)]
    pub model_name: Option<String>,
}
