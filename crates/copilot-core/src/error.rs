//! Error types for the generation pipeline.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Upper bound, in characters, for backend text embedded in a diagnostic.
pub const DEFAULT_EXCERPT_CHARS: usize = 400;

/// Discriminant of a [`PipelineError`], for callers that branch on the failure class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PipelineErrorKind {
    NoCredential,
    NoReachableModel,
    GenerationFailure,
    MalformedStructuredResponse,
    UnknownFailure,
}

/// A failure of one pipeline invocation.
///
/// Every variant carries a human-readable diagnostic. Any backend text folded
/// into a diagnostic is truncated with [`bounded_excerpt`] first, so messages
/// stay small enough to show in a chat log.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PipelineError {
    /// No usable AI-service key, or the service rejected the key.
    #[error("No usable API key: {message}")]
    NoCredential { message: String },

    /// The fallback list was exhausted without a reachable model.
    #[error("No reachable model: {message}")]
    NoReachableModel { message: String },

    /// The backend answered with an error status or the transport failed.
    #[error("Generation failed: {message}")]
    GenerationFailure {
        status: Option<u16>,
        message: String,
    },

    /// The backend text could not be turned into a structured result.
    #[error("Malformed structured response: {message}")]
    MalformedStructuredResponse { message: String },

    /// Anything else.
    #[error("Unknown failure: {message}")]
    UnknownFailure { message: String },
}

impl PipelineError {
    // ============================================================================
    // Constructor helpers
    // ============================================================================

    pub fn no_credential(message: impl Into<String>) -> Self {
        Self::NoCredential {
            message: message.into(),
        }
    }

    pub fn no_reachable_model(message: impl Into<String>) -> Self {
        Self::NoReachableModel {
            message: message.into(),
        }
    }

    /// Creates a GenerationFailure, bounding the backend message.
    pub fn generation(status: Option<u16>, message: impl AsRef<str>) -> Self {
        Self::GenerationFailure {
            status,
            message: bounded_excerpt(message.as_ref(), DEFAULT_EXCERPT_CHARS),
        }
    }

    pub fn malformed(message: impl Into<String>) -> Self {
        Self::MalformedStructuredResponse {
            message: message.into(),
        }
    }

    pub fn unknown(message: impl Into<String>) -> Self {
        Self::UnknownFailure {
            message: message.into(),
        }
    }

    // ============================================================================
    // Inspection
    // ============================================================================

    pub fn kind(&self) -> PipelineErrorKind {
        match self {
            Self::NoCredential { .. } => PipelineErrorKind::NoCredential,
            Self::NoReachableModel { .. } => PipelineErrorKind::NoReachableModel,
            Self::GenerationFailure { .. } => PipelineErrorKind::GenerationFailure,
            Self::MalformedStructuredResponse { .. } => {
                PipelineErrorKind::MalformedStructuredResponse
            }
            Self::UnknownFailure { .. } => PipelineErrorKind::UnknownFailure,
        }
    }

    /// The diagnostic without the kind prefix.
    pub fn diagnostic(&self) -> &str {
        match self {
            Self::NoCredential { message }
            | Self::NoReachableModel { message }
            | Self::GenerationFailure { message, .. }
            | Self::MalformedStructuredResponse { message }
            | Self::UnknownFailure { message } => message,
        }
    }

    /// HTTP status reported by the backend, when there was one.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::GenerationFailure { status, .. } => *status,
            _ => None,
        }
    }

    /// Replaces every occurrence of `secret` in the diagnostic.
    pub fn redact(mut self, secret: &str, replacement: &str) -> Self {
        if secret.is_empty() {
            return self;
        }
        let message = match &mut self {
            Self::NoCredential { message }
            | Self::NoReachableModel { message }
            | Self::GenerationFailure { message, .. }
            | Self::MalformedStructuredResponse { message }
            | Self::UnknownFailure { message } => message,
        };
        if message.contains(secret) {
            *message = message.replace(secret, replacement);
        }
        self
    }

    /// Whether resubmitting the same turn may succeed.
    ///
    /// Credential and model-access problems need user action first.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::GenerationFailure { .. } | Self::MalformedStructuredResponse { .. }
        )
    }
}

impl From<anyhow::Error> for PipelineError {
    fn from(err: anyhow::Error) -> Self {
        Self::unknown(bounded_excerpt(&err.to_string(), DEFAULT_EXCERPT_CHARS))
    }
}

/// Returns at most `max_chars` characters of `text`, cut on a char boundary.
pub fn bounded_excerpt(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => text[..idx].to_string(),
        None => text.to_string(),
    }
}

/// A type alias for `Result<T, PipelineError>`.
pub type Result<T> = std::result::Result<T, PipelineError>;
