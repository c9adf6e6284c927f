//! Keyword heuristic that routes a message to the structured or plain path.
//!
//! A local check instead of a classification round-trip to the backend. It
//! errs toward the structured path: a keyword anywhere in the message (or in
//! the transcript, see `prompt`) is enough.

use once_cell::sync::Lazy;
use regex::{Regex, RegexBuilder};

/// Default vocabulary. Entries are matched as case-insensitive substrings,
/// so `integrat` covers "integrate", "integration", "integrating".
pub const DEFAULT_INTENT_KEYWORDS: &[&str] = &[
    "integrat", "code", "snippet", "example", "api", "oauth", "token", "webhook",
];

static DEFAULT_CLASSIFIER: Lazy<IntentClassifier> =
    Lazy::new(|| IntentClassifier::new(DEFAULT_INTENT_KEYWORDS.iter().copied()));

/// Case-insensitive substring matcher over a fixed keyword set.
#[derive(Debug, Clone)]
pub struct IntentClassifier {
    keywords: Vec<String>,
    pattern: Option<Regex>,
}

impl IntentClassifier {
    /// Builds a classifier. Blank keywords are ignored; an empty set never matches.
    pub fn new<I, S>(keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let keywords: Vec<String> = keywords
            .into_iter()
            .map(|k| k.as_ref().trim().to_string())
            .filter(|k| !k.is_empty())
            .collect();

        let pattern = if keywords.is_empty() {
            None
        } else {
            let alternation = keywords
                .iter()
                .map(|k| regex::escape(k))
                .collect::<Vec<_>>()
                .join("|");
            // Escaped literals always form a valid pattern.
            RegexBuilder::new(&alternation)
                .case_insensitive(true)
                .build()
                .ok()
        };

        Self { keywords, pattern }
    }

    pub fn keywords(&self) -> &[String] {
        &self.keywords
    }

    pub fn is_integration_intent(&self, text: &str) -> bool {
        self.pattern
            .as_ref()
            .is_some_and(|pattern| pattern.is_match(text))
    }
}

impl Default for IntentClassifier {
    fn default() -> Self {
        DEFAULT_CLASSIFIER.clone()
    }
}

/// Classifies with the default vocabulary.
pub fn is_integration_intent(text: &str) -> bool {
    DEFAULT_CLASSIFIER.is_integration_intent(text)
}
